//! rodio-backed implementation of `MediaBackend`.
//!
//! Commands travel over an mpsc channel to a dedicated audio thread which
//! owns the output stream and the current `Sink`. Resources are fetched on
//! short-lived worker threads and handed back to the audio thread through the
//! same channel. Lifecycle events flow back to the runtime on a second
//! channel, tagged with the `LoadId` they belong to.

mod fetch;
mod player;
mod playhead;
mod sink;
mod thread;
mod types;

pub use player::AudioPlayer;
