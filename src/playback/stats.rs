use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

/// Cumulative listening statistics.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Statistics {
    pub total_listen_seconds: f64,
    pub started_tracks: BTreeSet<u32>,
    pub completed_tracks: BTreeSet<u32>,
}

impl Statistics {
    /// Replace a non-finite or negative total with zero.
    pub fn sanitized(mut self) -> Self {
        if !(self.total_listen_seconds.is_finite() && self.total_listen_seconds >= 0.0) {
            self.total_listen_seconds = 0.0;
        }
        self
    }

    /// Completed tracks as a rounded percentage of `catalog_len`.
    pub fn completion_rate(&self, catalog_len: usize) -> u8 {
        if catalog_len == 0 {
            return 0;
        }
        let rate = self.completed_tracks.len() as f64 / catalog_len as f64 * 100.0;
        rate.round().min(100.0) as u8
    }
}

/// What an observation changed, so the caller knows what to persist.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct StatsUpdate {
    /// Periodic write of the running total.
    pub checkpoint: bool,
    /// The track just entered `started_tracks`.
    pub started: bool,
}

impl StatsUpdate {
    pub fn should_persist(self) -> bool {
        self.checkpoint || self.started
    }
}

#[derive(Debug)]
pub struct StatsAccumulator {
    stats: Statistics,
    last_observed: f64,
    max_delta: f64,
    started_threshold: u8,
    interval_seconds: u64,
    last_checkpoint: u64,
}

impl StatsAccumulator {
    pub fn new(
        stats: Statistics,
        max_delta: f64,
        started_threshold: u8,
        interval_seconds: u64,
    ) -> Self {
        let last_checkpoint = stats.total_listen_seconds.floor() as u64;
        Self {
            stats,
            last_observed: 0.0,
            max_delta,
            started_threshold,
            interval_seconds: interval_seconds.max(1),
            last_checkpoint,
        }
    }

    pub fn stats(&self) -> &Statistics {
        &self.stats
    }

    /// Forget the previous observation. Called on every track change so the
    /// jump to the new track's position is not counted as listening.
    pub fn reset_session(&mut self) {
        self.last_observed = 0.0;
    }

    /// Apply a position update for `track` at `position` seconds.
    ///
    /// Only small forward steps (`0 < delta < max_delta`) count; seeks and
    /// track jumps produce large or negative deltas and are dropped.
    pub fn observe(&mut self, track: u32, position: f64, pct: Option<u8>) -> StatsUpdate {
        let mut update = StatsUpdate::default();

        if self.last_observed > 0.0 {
            let delta = position - self.last_observed;
            if delta > 0.0 && delta < self.max_delta {
                self.stats.total_listen_seconds += delta;
                let whole = self.stats.total_listen_seconds.floor() as u64;
                if whole % self.interval_seconds == 0 && whole != self.last_checkpoint {
                    self.last_checkpoint = whole;
                    update.checkpoint = true;
                }
            }
        }
        self.last_observed = position;

        if pct.is_some_and(|p| p > self.started_threshold) && self.stats.started_tracks.insert(track)
        {
            update.started = true;
        }

        update
    }

    /// Natural end-of-media. Returns true if `track` was newly completed.
    pub fn finish(&mut self, track: u32) -> bool {
        self.last_observed = 0.0;
        self.stats.completed_tracks.insert(track)
    }
}
