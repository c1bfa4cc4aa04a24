use std::collections::BTreeSet;

use serde::Serialize;
use serde::de::DeserializeOwned;

use crate::catalog::Source;
use crate::playback::{ProgressMap, Statistics};

use super::KeyValueStore;

/// Logical keys understood by the typed persistence layer.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum StoreKey {
    LastTrack,
    LastPosition,
    Volume,
    Progress,
    Statistics,
    Source,
    Bookmarks,
}

impl StoreKey {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::LastTrack => "last_track",
            Self::LastPosition => "last_position",
            Self::Volume => "volume",
            Self::Progress => "progress",
            Self::Statistics => "statistics",
            Self::Source => "source",
            Self::Bookmarks => "bookmarks",
        }
    }
}

/// Typed, fail-soft view over a `KeyValueStore`.
///
/// Reads return `None` (callers substitute their default) for missing or
/// undecodable values. Writes log and swallow errors.
pub struct Persistence<S> {
    store: S,
}

impl<S: KeyValueStore> Persistence<S> {
    pub fn new(store: S) -> Self {
        Self { store }
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    fn load<T: DeserializeOwned>(&self, key: StoreKey) -> Option<T> {
        let value = self.store.get(key.as_str())?;
        match serde_json::from_value(value) {
            Ok(v) => Some(v),
            Err(e) => {
                log::warn!("discarding corrupt `{}` value: {e}", key.as_str());
                None
            }
        }
    }

    fn save<T: Serialize>(&mut self, key: StoreKey, value: &T) {
        let encoded = match serde_json::to_value(value) {
            Ok(v) => v,
            Err(e) => {
                log::warn!("failed to encode `{}`: {e}", key.as_str());
                return;
            }
        };
        if let Err(e) = self.store.set(key.as_str(), encoded) {
            log::warn!("failed to persist `{}`: {e}", key.as_str());
        }
    }

    pub fn last_track(&self) -> Option<u32> {
        self.load::<u32>(StoreKey::LastTrack).filter(|&p| p >= 1)
    }

    pub fn save_last_track(&mut self, position: u32) {
        self.save(StoreKey::LastTrack, &position);
    }

    pub fn last_position(&self) -> f64 {
        self.load::<f64>(StoreKey::LastPosition)
            .filter(|p| p.is_finite() && *p >= 0.0)
            .unwrap_or(0.0)
    }

    pub fn save_last_position(&mut self, seconds: f64) {
        self.save(StoreKey::LastPosition, &seconds);
    }

    pub fn volume(&self, default: f32) -> f32 {
        self.load::<f32>(StoreKey::Volume)
            .filter(|v| v.is_finite() && (0.0..=1.0).contains(v))
            .unwrap_or(default)
    }

    pub fn save_volume(&mut self, volume: f32) {
        self.save(StoreKey::Volume, &volume);
    }

    pub fn progress(&self) -> ProgressMap {
        self.load(StoreKey::Progress).unwrap_or_default()
    }

    pub fn save_progress(&mut self, progress: &ProgressMap) {
        self.save(StoreKey::Progress, progress);
    }

    pub fn statistics(&self) -> Statistics {
        self.load::<Statistics>(StoreKey::Statistics)
            .unwrap_or_default()
            .sanitized()
    }

    pub fn save_statistics(&mut self, stats: &Statistics) {
        self.save(StoreKey::Statistics, stats);
    }

    pub fn source(&self) -> Option<Source> {
        self.load(StoreKey::Source)
    }

    pub fn save_source(&mut self, source: &Source) {
        self.save(StoreKey::Source, source);
    }

    pub fn bookmarks(&self) -> BTreeSet<u32> {
        self.load(StoreKey::Bookmarks).unwrap_or_default()
    }

    pub fn save_bookmarks(&mut self, bookmarks: &BTreeSet<u32>) {
        self.save(StoreKey::Bookmarks, bookmarks);
    }
}
