//! Playback core: the controller state machine and the pieces it drives.
//!
//! `Controller` owns the single active resource (through a `MediaBackend`),
//! the per-track progress high-watermarks and the listening statistics. It
//! reacts to `EngineEvent`s and writes derived state through to a
//! `KeyValueStore` according to its `WritePolicy`.

mod controller;
mod engine;
mod error;
mod phase;
mod progress;
mod sequencer;
mod session;
mod stats;

pub use controller::{Controller, PlaybackPolicy, PlaybackState, WritePolicy};
pub use engine::{EngineEvent, LoadId, MediaBackend};
pub use error::{MediaError, PlaybackError};
pub use phase::{Phase, Trigger};
pub use progress::{ProgressMap, ProgressTracker, percent};
pub use sequencer::{next_position, next_track, prev_position, prev_track};
pub use session::{MediaSession, NowPlaying, SessionStatus, SessionSync};
pub use stats::{Statistics, StatsAccumulator};

#[cfg(test)]
mod tests;
