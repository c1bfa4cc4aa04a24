//! Resolve a locator to its bytes.
//!
//! `http(s)://` locators are downloaded with ureq in chunks, reporting
//! progress so the controller can tell a slow download from a dead one.
//! `file://` URLs and bare paths are read from disk.

use std::io::{self, Read};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc::Sender;
use std::thread;
use std::time::{Duration, Instant};

use crate::playback::{LoadId, MediaError};

use super::types::AudioCmd;

const CHUNK_BYTES: usize = 64 * 1024;
const PROGRESS_EVERY: Duration = Duration::from_millis(500);

fn agent() -> ureq::Agent {
    ureq::AgentBuilder::new()
        .timeout_connect(Duration::from_secs(5))
        .timeout_read(Duration::from_secs(15))
        .build()
}

/// Fetch `locator` on a worker thread and post the result back as
/// `AudioCmd::Fetched`. The worker stops early once `cancel` is set and then
/// posts nothing.
pub(super) fn spawn_fetch(
    load: LoadId,
    locator: String,
    cancel: Arc<AtomicBool>,
    tx: Sender<AudioCmd>,
) {
    thread::spawn(move || {
        let mut last_report = Instant::now();
        let progress_tx = tx.clone();
        let result = fetch(&locator, &cancel, |received| {
            if last_report.elapsed() >= PROGRESS_EVERY {
                last_report = Instant::now();
                let _ = progress_tx.send(AudioCmd::Buffering { load, received });
            }
        });

        let result = match result {
            Ok(Some(bytes)) => Ok(bytes),
            Ok(None) => {
                log::debug!("fetch {load:?} cancelled");
                return;
            }
            Err(e) => {
                log::debug!("fetch {load:?} failed: {e}");
                Err(e)
            }
        };
        // The audio thread may already be gone on shutdown.
        let _ = tx.send(AudioCmd::Fetched { load, result });
    });
}

/// Read the whole resource. `Ok(None)` means the fetch was cancelled.
pub(super) fn fetch(
    locator: &str,
    cancel: &AtomicBool,
    progress: impl FnMut(u64),
) -> Result<Option<Vec<u8>>, MediaError> {
    if locator.starts_with("http://") || locator.starts_with("https://") {
        let unavailable = |e: &dyn std::fmt::Display| {
            MediaError::ResourceUnavailable(format!("{locator}: {e}"))
        };
        let response = agent().get(locator).call().map_err(|e| unavailable(&e))?;
        return read_body(response.into_reader(), cancel, progress).map_err(|e| unavailable(&e));
    }

    let path = locator.strip_prefix("file://").unwrap_or(locator);
    std::fs::read(path)
        .map(Some)
        .map_err(|e| MediaError::ResourceUnavailable(format!("{path}: {e}")))
}

/// Read `reader` to the end, calling `progress` with the running total after
/// every chunk. Returns `None` as soon as `cancel` is set.
pub(super) fn read_body<R: Read>(
    mut reader: R,
    cancel: &AtomicBool,
    mut progress: impl FnMut(u64),
) -> io::Result<Option<Vec<u8>>> {
    let mut bytes = Vec::new();
    let mut chunk = vec![0u8; CHUNK_BYTES];
    loop {
        if cancel.load(Ordering::Relaxed) {
            return Ok(None);
        }
        let n = match reader.read(&mut chunk) {
            Ok(0) => return Ok(Some(bytes)),
            Ok(n) => n,
            Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
            Err(e) => return Err(e),
        };
        bytes.extend_from_slice(&chunk[..n]);
        progress(bytes.len() as u64);
    }
}
