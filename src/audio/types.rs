//! Commands understood by the audio thread.

use crate::playback::{LoadId, MediaError};

#[derive(Debug)]
pub enum AudioCmd {
    /// Replace the current resource. Playback starts once the bytes are
    /// fetched and decoded, unless `autoplay` is false.
    Load {
        load: LoadId,
        locator: String,
        start_at: f64,
        autoplay: bool,
    },
    /// Sent by a fetch worker while bytes for `load` are still arriving.
    Buffering { load: LoadId, received: u64 },
    /// Sent by a fetch worker when the bytes for `load` are in.
    Fetched {
        load: LoadId,
        result: Result<Vec<u8>, MediaError>,
    },
    Play,
    Pause,
    /// Absolute seek in seconds.
    Seek(f64),
    SetVolume(f32),
    SetRate(f32),
    /// Drop the current resource.
    Stop,
    /// Stop and end the audio thread.
    Quit,
}
