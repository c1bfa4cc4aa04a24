//! Bookkeeping for the audio thread that does not need an output device.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use crate::playback::LoadId;

/// A load whose bytes are still being fetched.
#[derive(Debug)]
pub(super) struct Pending {
    pub load: LoadId,
    pub start_at: f64,
    pub autoplay: bool,
    cancel: Arc<AtomicBool>,
}

impl Pending {
    pub fn new(load: LoadId, start_at: f64, autoplay: bool) -> Self {
        Self {
            load,
            start_at: start_at.max(0.0),
            autoplay,
            cancel: Arc::new(AtomicBool::new(false)),
        }
    }

    /// Flag shared with the fetch worker.
    pub fn cancel_flag(&self) -> Arc<AtomicBool> {
        Arc::clone(&self.cancel)
    }

    /// Tell the fetch worker to give up.
    pub fn cancel(&self) {
        self.cancel.store(true, Ordering::Relaxed);
    }

    /// A seek before the bytes are in moves the start point.
    pub fn seek(&mut self, seconds: f64) {
        self.start_at = seconds.max(0.0);
    }
}

impl Drop for Pending {
    fn drop(&mut self) {
        self.cancel();
    }
}

/// What one tick of the audio thread should report.
#[derive(Debug, Clone, PartialEq)]
pub(super) enum Tick {
    Quiet,
    Position(f64),
    /// The sink ran dry. `last` is the final position to report, if known.
    Finished { last: Option<f64> },
}

/// Maps the sink's clock to a position in the track and makes sure the end
/// of a load is reported only once.
#[derive(Debug, Clone, PartialEq)]
pub(super) struct Playhead {
    /// `Sink::get_pos` counts from where the source was cut with
    /// `skip_duration`; this is that cut.
    offset: f64,
    duration: f64,
    finished: bool,
}

impl Playhead {
    pub fn new(start_at: f64, duration: f64) -> Self {
        Self {
            offset: start_at.max(0.0),
            duration,
            finished: false,
        }
    }

    pub fn position(&self, sink_pos: Duration) -> f64 {
        self.offset + sink_pos.as_secs_f64()
    }

    /// After a successful `Sink::try_seek` the sink clock is absolute.
    pub fn seeked_in_place(&mut self) {
        self.offset = 0.0;
        self.finished = false;
    }

    /// After replacing the sink with one that skips the first `at` seconds.
    pub fn rebuilt_at(&mut self, at: f64) {
        self.offset = at.max(0.0);
        self.finished = false;
    }

    /// `drained` is `Sink::empty()`, `sink_pos` is `Sink::get_pos()`.
    pub fn tick(&mut self, playing: bool, drained: bool, sink_pos: Duration) -> Tick {
        if self.finished || !playing {
            return Tick::Quiet;
        }
        if drained {
            self.finished = true;
            let last = (self.duration > 0.0).then_some(self.duration);
            return Tick::Finished { last };
        }
        Tick::Position(self.position(sink_pos))
    }
}
