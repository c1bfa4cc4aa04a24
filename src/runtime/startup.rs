use std::time::Duration;

use crate::catalog::{self, Catalog, CatalogError, DEFAULT_CATALOG_URL, Source};
use crate::config;
use crate::playback::{PlaybackPolicy, WritePolicy};
use crate::store::{JsonFileStore, KeyValueStore, MemoryStore};

pub fn playback_policy(settings: &config::Settings) -> PlaybackPolicy {
    PlaybackPolicy {
        auto_advance: settings.playback.auto_advance,
        started_threshold_percent: settings.playback.started_threshold_percent,
        max_listen_delta_seconds: settings.playback.max_listen_delta_seconds,
        stall_timeout: Duration::from_secs(settings.playback.stall_timeout_seconds),
        default_volume: settings.audio.default_volume,
        write: WritePolicy {
            progress_step_percent: settings.persistence.progress_step_percent,
            stats_interval_seconds: settings.persistence.stats_interval_seconds,
        },
    }
}

/// Open the state file. Falls back to an in-memory store (nothing survives
/// the session) when no path can be resolved or the file cannot be opened.
pub fn open_store(settings: &config::Settings) -> Box<dyn KeyValueStore> {
    let Some(path) = settings.store_path() else {
        log::warn!("no state path (HOME unset?); progress will not be saved");
        return Box::new(MemoryStore::new());
    };
    match JsonFileStore::open(&path) {
        Ok(store) => {
            log::info!("state file: {}", path.display());
            Box::new(store)
        }
        Err(e) => {
            log::warn!("cannot open {}: {e}; progress will not be saved", path.display());
            Box::new(MemoryStore::new())
        }
    }
}

pub fn load_catalog(settings: &config::Settings) -> Result<Catalog, CatalogError> {
    let location = settings
        .catalog
        .tracks
        .as_deref()
        .unwrap_or(DEFAULT_CATALOG_URL);
    catalog::load_catalog(location)
}

/// Reciter list with the configured default first, so it is picked when no
/// selection has been saved yet.
pub fn load_sources(settings: &config::Settings) -> Vec<Source> {
    let sources = match catalog::load_sources(settings.catalog.sources.as_deref()) {
        Ok(s) => s,
        Err(e) => {
            log::warn!("cannot load sources, using the default reciter: {e}");
            vec![Source::default_source()]
        }
    };
    prefer_source(sources, settings.catalog.default_source.as_deref())
}

pub fn prefer_source(mut sources: Vec<Source>, preferred: Option<&str>) -> Vec<Source> {
    let Some(id) = preferred else {
        return sources;
    };
    match sources.iter().position(|s| s.id == id) {
        Some(i) => {
            let s = sources.remove(i);
            sources.insert(0, s);
        }
        None => log::warn!("catalog.default_source `{id}` is not a known source"),
    }
    sources
}
