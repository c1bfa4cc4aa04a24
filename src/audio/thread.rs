use std::sync::mpsc::{Receiver, RecvTimeoutError, Sender};
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

use rodio::{OutputStream, OutputStreamBuilder, Sink};

use crate::playback::{EngineEvent, LoadId, MediaError};

use super::fetch::spawn_fetch;
use super::playhead::{Pending, Playhead, Tick};
use super::sink::{create_sink_at, probe_duration};
use super::types::AudioCmd;

/// The decoded resource currently attached to the output.
struct Loaded {
    load: LoadId,
    bytes: Vec<u8>,
    sink: Sink,
    playhead: Playhead,
}

struct AudioThread {
    stream: Option<OutputStream>,
    events: Sender<EngineEvent>,
    fetch_tx: Sender<AudioCmd>,
    pending: Option<Pending>,
    current: Option<Loaded>,
    paused: bool,
    volume: f32,
    rate: f32,
}

pub(super) fn spawn_audio_thread(
    rx: Receiver<AudioCmd>,
    fetch_tx: Sender<AudioCmd>,
    events: Sender<EngineEvent>,
    tick: Duration,
) -> JoinHandle<()> {
    thread::spawn(move || {
        let stream = match OutputStreamBuilder::open_default_stream() {
            Ok(mut s) => {
                // rodio logs to stderr when OutputStream is dropped, which
                // garbles the TUI.
                s.log_on_drop(false);
                Some(s)
            }
            Err(e) => {
                log::error!("no audio output device: {e}");
                None
            }
        };

        let mut audio = AudioThread {
            stream,
            events,
            fetch_tx,
            pending: None,
            current: None,
            paused: true,
            volume: 1.0,
            rate: 1.0,
        };

        let mut next_tick = Instant::now() + tick;
        loop {
            let wait = next_tick.saturating_duration_since(Instant::now());
            match rx.recv_timeout(wait) {
                Ok(AudioCmd::Quit) => {
                    audio.stop();
                    break;
                }
                Ok(cmd) => audio.handle(cmd),
                Err(RecvTimeoutError::Timeout) => {
                    audio.tick();
                    next_tick = Instant::now() + tick;
                }
                Err(RecvTimeoutError::Disconnected) => break,
            }
        }
    })
}

impl AudioThread {
    fn emit(&self, event: EngineEvent) {
        // The runtime may have stopped listening during shutdown.
        let _ = self.events.send(event);
    }

    fn handle(&mut self, cmd: AudioCmd) {
        match cmd {
            AudioCmd::Load {
                load,
                locator,
                start_at,
                autoplay,
            } => {
                self.stop();
                self.paused = !autoplay;
                let pending = Pending::new(load, start_at, autoplay);
                spawn_fetch(
                    load,
                    locator,
                    pending.cancel_flag(),
                    self.fetch_tx.clone(),
                );
                self.pending = Some(pending);
            }
            AudioCmd::Buffering { load, received } => {
                if self.pending.as_ref().is_some_and(|p| p.load == load) {
                    self.emit(EngineEvent::Buffering { load, received });
                }
            }
            AudioCmd::Fetched { load, result } => self.attach(load, result),
            AudioCmd::Play => {
                self.paused = false;
                if let Some(p) = self.pending.as_mut() {
                    p.autoplay = true;
                }
                if let Some(cur) = self.current.as_ref() {
                    cur.sink.play();
                }
            }
            AudioCmd::Pause => {
                self.paused = true;
                if let Some(p) = self.pending.as_mut() {
                    p.autoplay = false;
                }
                if let Some(cur) = self.current.as_ref() {
                    cur.sink.pause();
                }
            }
            AudioCmd::Seek(seconds) => self.seek(seconds.max(0.0)),
            AudioCmd::SetVolume(v) => {
                self.volume = v;
                if let Some(cur) = self.current.as_ref() {
                    cur.sink.set_volume(v);
                }
            }
            AudioCmd::SetRate(r) => {
                self.rate = r;
                if let Some(cur) = self.current.as_ref() {
                    cur.sink.set_speed(r);
                }
            }
            AudioCmd::Stop => self.stop(),
            AudioCmd::Quit => self.stop(),
        }
    }

    fn stop(&mut self) {
        // Dropping a pending load cancels its fetch.
        self.pending = None;
        if let Some(cur) = self.current.take() {
            cur.sink.stop();
        }
    }

    fn attach(&mut self, load: LoadId, result: Result<Vec<u8>, MediaError>) {
        let Some(pending) = self.pending.take_if(|p| p.load == load) else {
            log::trace!("dropping fetched bytes for superseded {load:?}");
            return;
        };

        let bytes = match result {
            Ok(b) => b,
            Err(error) => {
                self.emit(EngineEvent::Failed { load, error });
                return;
            }
        };

        let Some(stream) = self.stream.as_ref() else {
            self.emit(EngineEvent::Failed {
                load,
                error: MediaError::ResourceUnavailable("no audio output device".to_string()),
            });
            return;
        };

        let duration = probe_duration(&bytes);
        let sink = match create_sink_at(stream.mixer(), bytes.clone(), pending.start_at) {
            Ok(s) => s,
            Err(error) => {
                self.emit(EngineEvent::Failed { load, error });
                return;
            }
        };
        sink.set_volume(self.volume);
        sink.set_speed(self.rate);
        if pending.autoplay {
            sink.play();
        }

        log::debug!("{load:?} ready, {duration:.1}s");
        self.emit(EngineEvent::MetadataReady { load, duration });
        self.emit(EngineEvent::PositionAdvanced {
            load,
            position: pending.start_at,
        });

        self.current = Some(Loaded {
            load,
            bytes,
            sink,
            playhead: Playhead::new(pending.start_at, duration),
        });
    }

    fn seek(&mut self, seconds: f64) {
        if let Some(p) = self.pending.as_mut() {
            p.seek(seconds);
            return;
        }
        let Some(cur) = self.current.as_mut() else {
            return;
        };

        let target = Duration::from_secs_f64(seconds);
        if !cur.sink.empty() && cur.sink.try_seek(target).is_ok() {
            cur.playhead.seeked_in_place();
            return;
        }

        // Not seekable in place: rebuild the sink and skip into the data.
        let Some(stream) = self.stream.as_ref() else {
            return;
        };
        match create_sink_at(stream.mixer(), cur.bytes.clone(), seconds) {
            Ok(sink) => {
                sink.set_volume(self.volume);
                sink.set_speed(self.rate);
                if !self.paused {
                    sink.play();
                }
                cur.sink.stop();
                cur.sink = sink;
                cur.playhead.rebuilt_at(seconds);
            }
            Err(e) => log::warn!("seek to {seconds:.1}s failed: {e}"),
        }
    }

    fn tick(&mut self) {
        let Some(cur) = self.current.as_mut() else {
            return;
        };
        let load = cur.load;
        let tick = cur
            .playhead
            .tick(!self.paused, cur.sink.empty(), cur.sink.get_pos());
        match tick {
            Tick::Quiet => {}
            Tick::Position(position) => self.emit(EngineEvent::PositionAdvanced { load, position }),
            Tick::Finished { last } => {
                if let Some(position) = last {
                    self.emit(EngineEvent::PositionAdvanced { load, position });
                }
                self.emit(EngineEvent::Finished { load });
            }
        }
    }
}
