//! Utilities for turning fetched bytes into `rodio` sinks.

use std::io::Cursor;
use std::time::Duration;

use lofty::file::AudioFile;
use lofty::probe::Probe;
use rodio::mixer::Mixer;
use rodio::{Decoder, Sink, Source};

use crate::playback::MediaError;

fn decoder(bytes: Vec<u8>) -> Result<Decoder<Cursor<Vec<u8>>>, MediaError> {
    let len = bytes.len() as u64;
    Decoder::builder()
        .with_data(Cursor::new(bytes))
        .with_byte_len(len)
        .with_seekable(true)
        .build()
        .map_err(|e| MediaError::DecodeError(e.to_string()))
}

/// Duration in seconds: tag/stream properties first, the decoder's own
/// estimate second, zero when neither knows.
pub(super) fn probe_duration(bytes: &[u8]) -> f64 {
    let from_tags = Probe::new(Cursor::new(bytes))
        .guess_file_type()
        .ok()
        .and_then(|p| p.read().ok())
        .map(|tagged| tagged.properties().duration())
        .filter(|d| !d.is_zero());

    from_tags
        .or_else(|| {
            decoder(bytes.to_vec())
                .ok()
                .and_then(|d| d.total_duration())
        })
        .map_or(0.0, |d| d.as_secs_f64())
}

/// Create a paused `Sink` that starts playback at `start_at` seconds.
pub(super) fn create_sink_at(
    mixer: &Mixer,
    bytes: Vec<u8>,
    start_at: f64,
) -> Result<Sink, MediaError> {
    let source = decoder(bytes)?.skip_duration(Duration::from_secs_f64(start_at.max(0.0)));

    let sink = Sink::connect_new(mixer);
    sink.append(source);
    sink.pause();
    Ok(sink)
}
