use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// Integer percentage of `position` through `duration`, floored and capped
/// at 100. `None` while the duration is unknown.
pub fn percent(position: f64, duration: f64) -> Option<u8> {
    if !(duration.is_finite() && duration > 0.0) || !position.is_finite() {
        return None;
    }
    let pct = (position / duration * 100.0).clamp(0.0, 100.0).floor();
    Some(pct as u8)
}

/// Furthest percentage ever reached, per track position.
///
/// Entries only grow. Values read back from storage are capped at 100.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "BTreeMap<u32, u8>", into = "BTreeMap<u32, u8>")]
pub struct ProgressMap {
    entries: BTreeMap<u32, u8>,
}

impl From<BTreeMap<u32, u8>> for ProgressMap {
    fn from(mut entries: BTreeMap<u32, u8>) -> Self {
        for pct in entries.values_mut() {
            *pct = (*pct).min(100);
        }
        Self { entries }
    }
}

impl From<ProgressMap> for BTreeMap<u32, u8> {
    fn from(map: ProgressMap) -> Self {
        map.entries
    }
}

impl ProgressMap {
    pub fn get(&self, position: u32) -> u8 {
        self.entries.get(&position).copied().unwrap_or(0)
    }

    /// Raise the entry to `pct` if that is higher. Returns the stored value.
    pub fn raise(&mut self, position: u32, pct: u8) -> u8 {
        let entry = self.entries.entry(position).or_insert(0);
        *entry = (*entry).max(pct.min(100));
        *entry
    }

    pub fn complete(&mut self, position: u32) {
        self.entries.insert(position, 100);
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Applies observations to a `ProgressMap` and decides when the map is
/// worth writing out.
#[derive(Debug)]
pub struct ProgressTracker {
    map: ProgressMap,
    step_percent: u8,
    last_written: Option<(u32, u8)>,
}

impl ProgressTracker {
    pub fn new(map: ProgressMap, step_percent: u8) -> Self {
        Self {
            map,
            step_percent: step_percent.max(1),
            last_written: None,
        }
    }

    pub fn map(&self) -> &ProgressMap {
        &self.map
    }

    /// Record that `position` reached `pct`. Returns true when the map
    /// should be persisted: `pct` sits on a step boundary and this
    /// (track, pct) pair has not been written yet.
    pub fn observe(&mut self, position: u32, pct: u8) -> bool {
        self.map.raise(position, pct);
        if pct % self.step_percent != 0 || self.last_written == Some((position, pct)) {
            return false;
        }
        self.last_written = Some((position, pct));
        true
    }

    /// Natural end-of-media: force the entry to 100. Always persisted.
    pub fn finish(&mut self, position: u32) {
        self.map.complete(position);
        self.last_written = Some((position, 100));
    }
}
