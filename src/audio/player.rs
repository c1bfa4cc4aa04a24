use std::sync::mpsc::{self, Receiver, Sender};
use std::thread::JoinHandle;
use std::time::Duration;

use crate::playback::{EngineEvent, LoadId, MediaBackend};

use super::thread::spawn_audio_thread;
use super::types::AudioCmd;

/// Handle to the audio thread. Implements `MediaBackend` by posting commands;
/// events come back through `drain_events`.
pub struct AudioPlayer {
    tx: Sender<AudioCmd>,
    events: Receiver<EngineEvent>,
    join: Option<JoinHandle<()>>,
}

impl AudioPlayer {
    /// Spawn the audio thread. `tick` is how often positions are reported.
    pub fn new(tick: Duration) -> Self {
        let (tx, rx) = mpsc::channel::<AudioCmd>();
        let (events_tx, events) = mpsc::channel::<EngineEvent>();

        let join = spawn_audio_thread(rx, tx.clone(), events_tx, tick);

        Self {
            tx,
            events,
            join: Some(join),
        }
    }

    fn send(&self, cmd: AudioCmd) {
        if let Err(e) = self.tx.send(cmd) {
            log::debug!("audio thread is gone, dropped {:?}", e.0);
        }
    }

    /// Everything the audio thread reported since the last call.
    pub fn drain_events(&self) -> Vec<EngineEvent> {
        self.events.try_iter().collect()
    }

    /// Stop playback and wait for the audio thread to exit.
    pub fn quit(&mut self) {
        self.send(AudioCmd::Quit);
        if let Some(h) = self.join.take() {
            let _ = h.join();
        }
    }
}

impl Drop for AudioPlayer {
    fn drop(&mut self) {
        self.quit();
    }
}

impl MediaBackend for AudioPlayer {
    fn load(&mut self, load: LoadId, locator: &str, start_at: f64, autoplay: bool) {
        self.send(AudioCmd::Load {
            load,
            locator: locator.to_string(),
            start_at,
            autoplay,
        });
    }

    fn play(&mut self) {
        self.send(AudioCmd::Play);
    }

    fn pause(&mut self) {
        self.send(AudioCmd::Pause);
    }

    fn seek(&mut self, seconds: f64) {
        self.send(AudioCmd::Seek(seconds));
    }

    fn set_volume(&mut self, volume: f32) {
        self.send(AudioCmd::SetVolume(volume));
    }

    fn set_rate(&mut self, rate: f32) {
        self.send(AudioCmd::SetRate(rate));
    }

    fn stop(&mut self) {
        self.send(AudioCmd::Stop);
    }
}
