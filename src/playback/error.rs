use std::time::Duration;

use thiserror::Error;

/// Rejected controller commands.
#[derive(Debug, Error, PartialEq)]
pub enum PlaybackError {
    #[error("no track is active")]
    NoActiveTrack,

    #[error("no source is selected")]
    NoSource,

    #[error("track {0} is not in the catalog")]
    UnknownTrack(u32),

    #[error("unknown source `{0}`")]
    UnknownSource(String),

    #[error("invalid playback rate {0}")]
    InvalidRate(f32),
}

/// Why a media resource failed to play.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum MediaError {
    #[error("resource unavailable: {0}")]
    ResourceUnavailable(String),

    #[error("cannot decode resource: {0}")]
    DecodeError(String),

    #[error("no data after {}s", after.as_secs())]
    NetworkStall { after: Duration },
}
