use std::collections::BTreeSet;
use std::time::{Duration, Instant};

use crate::catalog::{Catalog, Source, Track};
use crate::store::{KeyValueStore, Persistence};

use super::engine::{EngineEvent, LoadId, MediaBackend};
use super::error::{MediaError, PlaybackError};
use super::phase::{Phase, Trigger};
use super::progress::{ProgressMap, ProgressTracker, percent};
use super::sequencer;
use super::stats::{Statistics, StatsAccumulator};

/// How often derived state is written out. Larger values mean fewer writes
/// and a wider window of progress lost on a crash.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct WritePolicy {
    /// Persist the progress map when a track crosses a multiple of this.
    pub progress_step_percent: u8,
    /// Persist statistics when whole listening seconds cross a multiple of this.
    pub stats_interval_seconds: u64,
}

impl Default for WritePolicy {
    fn default() -> Self {
        Self {
            progress_step_percent: 5,
            stats_interval_seconds: 10,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct PlaybackPolicy {
    pub auto_advance: bool,
    pub started_threshold_percent: u8,
    pub max_listen_delta_seconds: f64,
    pub stall_timeout: Duration,
    pub default_volume: f32,
    pub write: WritePolicy,
}

impl Default for PlaybackPolicy {
    fn default() -> Self {
        Self {
            auto_advance: true,
            started_threshold_percent: 1,
            max_listen_delta_seconds: 2.0,
            stall_timeout: Duration::from_secs(20),
            default_volume: 0.7,
            write: WritePolicy::default(),
        }
    }
}

/// Everything a front-end needs to render the player.
#[derive(Debug, Clone, PartialEq)]
pub struct PlaybackState {
    pub is_playing: bool,
    pub active_track: Option<Track>,
    pub active_source: Option<Source>,
    pub position_seconds: f64,
    pub duration_seconds: f64,
    pub volume: f32,
    pub rate: f32,
    pub phase: Phase,
    pub last_error: Option<MediaError>,
}

/// Owns the playback state, progress and statistics for the process.
///
/// All mutation happens through `&mut self` on the runtime thread; backend
/// events are fed in with `handle_event`.
pub struct Controller<B, S> {
    catalog: Catalog,
    sources: Vec<Source>,
    backend: B,
    persistence: Persistence<S>,
    policy: PlaybackPolicy,
    state: PlaybackState,
    progress: ProgressTracker,
    stats: StatsAccumulator,
    bookmarks: BTreeSet<u32>,
    load: LoadId,
    loaded_locator: Option<String>,
    load_started: Option<Instant>,
    /// Bytes reported by the backend for the current load, and how many of
    /// them the stall check has already seen.
    buffered: u64,
    buffered_seen: u64,
}

impl<B: MediaBackend, S: KeyValueStore> Controller<B, S> {
    /// Build a controller, restoring volume, progress, statistics, bookmarks
    /// and the selected source from `store`.
    pub fn new(
        catalog: Catalog,
        sources: Vec<Source>,
        mut backend: B,
        store: S,
        policy: PlaybackPolicy,
    ) -> Self {
        let persistence = Persistence::new(store);

        let volume = persistence.volume(policy.default_volume);
        backend.set_volume(volume);

        let source = persistence
            .source()
            .or_else(|| sources.first().cloned())
            .unwrap_or_else(Source::default_source);

        let progress = ProgressTracker::new(
            persistence.progress(),
            policy.write.progress_step_percent,
        );
        let stats = StatsAccumulator::new(
            persistence.statistics(),
            policy.max_listen_delta_seconds,
            policy.started_threshold_percent,
            policy.write.stats_interval_seconds,
        );
        let bookmarks = persistence.bookmarks();

        Self {
            catalog,
            sources,
            backend,
            persistence,
            state: PlaybackState {
                is_playing: false,
                active_track: None,
                active_source: Some(source),
                position_seconds: 0.0,
                duration_seconds: 0.0,
                volume,
                rate: 1.0,
                phase: Phase::Idle,
                last_error: None,
            },
            policy,
            progress,
            stats,
            bookmarks,
            load: LoadId::default(),
            loaded_locator: None,
            load_started: None,
            buffered: 0,
            buffered_seen: 0,
        }
    }

    pub fn state(&self) -> &PlaybackState {
        &self.state
    }

    pub fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    pub fn progress(&self) -> &ProgressMap {
        self.progress.map()
    }

    pub fn statistics(&self) -> &Statistics {
        self.stats.stats()
    }

    pub fn bookmarks(&self) -> &BTreeSet<u32> {
        &self.bookmarks
    }

    pub fn backend(&self) -> &B {
        &self.backend
    }

    pub fn persistence(&self) -> &Persistence<S> {
        &self.persistence
    }

    /// Install a catalog fetched after startup. Ignored once a catalog with
    /// tracks is in place.
    pub fn set_catalog(&mut self, catalog: Catalog) {
        if self.catalog.is_empty() {
            self.catalog = catalog;
        }
    }

    /// Cue the last played track, paused at the saved position.
    pub fn restore(&mut self) {
        let Some(position) = self.persistence.last_track() else {
            return;
        };
        let at = self.persistence.last_position();
        if let Err(e) = self.cue(position, at) {
            log::info!("not restoring last track: {e}");
        }
    }

    /// Play `position` from the active source. Re-issuing the call for the
    /// resource that is already loaded toggles play/pause instead.
    pub fn load_and_play(&mut self, position: u32) -> Result<(), PlaybackError> {
        let track = self
            .catalog
            .find(position)
            .cloned()
            .ok_or(PlaybackError::UnknownTrack(position))?;
        let source = self
            .state
            .active_source
            .clone()
            .ok_or(PlaybackError::NoSource)?;
        let locator = source.locator(&track);

        if self.state.phase.is_live() && self.loaded_locator.as_deref() == Some(locator.as_str()) {
            self.toggle_play();
            return Ok(());
        }

        self.start_load(track, source, locator, 0.0, true);
        Ok(())
    }

    /// Load `position` paused at `at` seconds.
    pub fn cue(&mut self, position: u32, at: f64) -> Result<(), PlaybackError> {
        let track = self
            .catalog
            .find(position)
            .cloned()
            .ok_or(PlaybackError::UnknownTrack(position))?;
        let source = self
            .state
            .active_source
            .clone()
            .ok_or(PlaybackError::NoSource)?;
        let locator = source.locator(&track);
        self.start_load(track, source, locator, at.max(0.0), false);
        Ok(())
    }

    fn start_load(
        &mut self,
        track: Track,
        source: Source,
        locator: String,
        start_at: f64,
        autoplay: bool,
    ) {
        self.stats.reset_session();
        self.load = LoadId(self.load.0 + 1);
        log::debug!("load {:?}: {locator} at {start_at:.1}s", self.load);
        self.backend.load(self.load, &locator, start_at, autoplay);

        self.apply(Trigger::Load);
        self.persistence.save_last_track(track.position);
        self.persistence.save_last_position(start_at);

        self.state.active_track = Some(track);
        self.state.active_source = Some(source);
        self.state.position_seconds = start_at;
        self.state.duration_seconds = 0.0;
        self.state.is_playing = autoplay;
        self.state.last_error = None;
        self.loaded_locator = Some(locator);
        self.load_started = Some(Instant::now());
        self.buffered = 0;
        self.buffered_seen = 0;
    }

    /// Drop the resource and make any of its in-flight events stale.
    fn detach(&mut self) {
        self.load = LoadId(self.load.0 + 1);
        self.loaded_locator = None;
        self.load_started = None;
        self.state.is_playing = false;
    }

    fn apply(&mut self, trigger: Trigger) -> bool {
        match self.state.phase.on(trigger) {
            Some(next) => {
                self.state.phase = next;
                true
            }
            None => {
                log::debug!("ignoring {trigger:?} in {:?}", self.state.phase);
                false
            }
        }
    }

    /// Flip between playing and paused. Without a loaded resource this does
    /// nothing; after a natural end it restarts the finished track.
    pub fn toggle_play(&mut self) {
        match self.state.phase {
            Phase::Idle => {}
            Phase::Finished => {
                if let (Some(track), Some(source)) =
                    (self.state.active_track.clone(), self.state.active_source.clone())
                {
                    let locator = source.locator(&track);
                    self.start_load(track, source, locator, 0.0, true);
                }
            }
            Phase::Loading | Phase::Playing | Phase::Paused => {
                if self.state.is_playing {
                    self.backend.pause();
                    self.apply(Trigger::Pause);
                    self.state.is_playing = false;
                    self.persistence
                        .save_last_position(self.state.position_seconds);
                } else {
                    self.backend.play();
                    self.apply(Trigger::Resume);
                    self.state.is_playing = true;
                }
            }
        }
    }

    pub fn play(&mut self) {
        if !self.state.is_playing {
            self.toggle_play();
        }
    }

    pub fn pause(&mut self) {
        if self.state.is_playing {
            self.toggle_play();
        }
    }

    /// Unload the resource but keep the active track for display.
    pub fn stop(&mut self) {
        if self.state.phase == Phase::Idle {
            return;
        }
        self.backend.stop();
        self.detach();
        self.apply(Trigger::Stop);
        self.persistence
            .save_last_position(self.state.position_seconds);
    }

    /// Jump to `seconds`. Range checks are the caller's job.
    pub fn seek(&mut self, seconds: f64) {
        self.state.position_seconds = seconds;
        self.backend.seek(seconds);
        self.persistence.save_last_position(seconds);
    }

    /// Relative seek clamped to the known duration.
    pub fn seek_by(&mut self, delta: f64) {
        let mut target = (self.state.position_seconds + delta).max(0.0);
        if self.state.duration_seconds > 0.0 {
            target = target.min(self.state.duration_seconds);
        }
        self.seek(target);
    }

    pub fn set_volume(&mut self, volume: f32) {
        let volume = if volume.is_finite() {
            volume.clamp(0.0, 1.0)
        } else {
            self.state.volume
        };
        self.state.volume = volume;
        self.backend.set_volume(volume);
        self.persistence.save_volume(volume);
    }

    /// Session-only: the rate is not persisted and starts at 1.0 next run.
    pub fn set_rate(&mut self, rate: f32) -> Result<(), PlaybackError> {
        if !(rate.is_finite() && rate > 0.0) {
            return Err(PlaybackError::InvalidRate(rate));
        }
        self.state.rate = rate;
        self.backend.set_rate(rate);
        Ok(())
    }

    /// Switch reciter. A loaded track reloads from the new source at the same
    /// time and with the same play/pause intent. Progress and statistics are
    /// untouched.
    pub fn select_source(&mut self, source: Source) {
        self.persistence.save_source(&source);

        if self.state.phase.is_live() {
            if let Some(track) = self.state.active_track.clone() {
                let locator = source.locator(&track);
                let at = self.state.position_seconds;
                let playing = self.state.is_playing;
                self.start_load(track, source, locator, at, playing);
                return;
            }
        }
        self.state.active_source = Some(source);
    }

    pub fn select_source_by_id(&mut self, id: &str) -> Result<(), PlaybackError> {
        let source = self
            .sources
            .iter()
            .find(|s| s.id == id)
            .cloned()
            .ok_or_else(|| PlaybackError::UnknownSource(id.to_string()))?;
        self.select_source(source);
        Ok(())
    }

    /// Select the source after the active one, wrapping around.
    pub fn cycle_source(&mut self) {
        if self.sources.is_empty() {
            return;
        }
        let current = self
            .state
            .active_source
            .as_ref()
            .and_then(|a| self.sources.iter().position(|s| s.id == a.id));
        let next = current.map_or(0, |i| (i + 1) % self.sources.len());
        let source = self.sources[next].clone();
        self.select_source(source);
    }

    pub fn next(&mut self) -> Result<(), PlaybackError> {
        let current = self.active_position()?;
        let target = sequencer::next_track(&self.catalog, current)
            .map(|t| t.position)
            .ok_or(PlaybackError::UnknownTrack(current))?;
        self.load_and_play(target)
    }

    pub fn prev(&mut self) -> Result<(), PlaybackError> {
        let current = self.active_position()?;
        let target = sequencer::prev_track(&self.catalog, current)
            .map(|t| t.position)
            .ok_or(PlaybackError::UnknownTrack(current))?;
        self.load_and_play(target)
    }

    fn active_position(&self) -> Result<u32, PlaybackError> {
        self.state
            .active_track
            .as_ref()
            .map(|t| t.position)
            .ok_or(PlaybackError::NoActiveTrack)
    }

    pub fn toggle_bookmark(&mut self, position: u32) -> bool {
        let marked = if self.bookmarks.remove(&position) {
            false
        } else {
            self.bookmarks.insert(position);
            true
        };
        self.persistence.save_bookmarks(&self.bookmarks);
        marked
    }

    pub fn is_bookmarked(&self, position: u32) -> bool {
        self.bookmarks.contains(&position)
    }

    /// Feed a backend event. Events from superseded loads are dropped.
    pub fn handle_event(&mut self, event: EngineEvent) {
        if event.load() != self.load {
            log::trace!("dropping stale event {event:?}");
            return;
        }

        match event {
            EngineEvent::Buffering { received, .. } => {
                if self.state.phase == Phase::Loading {
                    self.buffered = self.buffered.max(received);
                }
            }
            EngineEvent::MetadataReady { duration, .. } => {
                let playing = self.state.is_playing;
                if self.apply(Trigger::Ready { playing }) {
                    self.state.duration_seconds = if duration.is_finite() {
                        duration.max(0.0)
                    } else {
                        0.0
                    };
                    self.load_started = None;
                }
            }
            EngineEvent::PositionAdvanced { position, .. } => self.on_position(position),
            EngineEvent::Finished { .. } => self.on_finished(),
            EngineEvent::Failed { error, .. } => {
                log::warn!("playback failed: {error}");
                self.fail(error);
            }
        }
    }

    fn on_position(&mut self, position: f64) {
        if !matches!(self.state.phase, Phase::Playing | Phase::Paused) {
            return;
        }
        let Some(track) = self.state.active_track.as_ref().map(|t| t.position) else {
            return;
        };

        self.state.position_seconds = position;
        let pct = percent(position, self.state.duration_seconds);

        if let Some(pct) = pct {
            if self.progress.observe(track, pct) {
                self.persistence.save_progress(self.progress.map());
                self.persistence.save_last_position(position);
            }
        }

        if self.stats.observe(track, position, pct).should_persist() {
            self.persistence.save_statistics(self.stats.stats());
        }
    }

    fn on_finished(&mut self) {
        if !self.apply(Trigger::Finish) {
            return;
        }
        let Some(track) = self.state.active_track.as_ref().map(|t| t.position) else {
            return;
        };

        self.progress.finish(track);
        self.persistence.save_progress(self.progress.map());
        if self.stats.finish(track) {
            self.persistence.save_statistics(self.stats.stats());
        }
        self.state.position_seconds = self.state.duration_seconds;
        self.state.is_playing = false;
        self.loaded_locator = None;
        self.backend.stop();

        if !self.policy.auto_advance {
            return;
        }
        match sequencer::next_track(&self.catalog, track).map(|t| t.position) {
            Some(next) => {
                if let Err(e) = self.load_and_play(next) {
                    log::warn!("auto-advance failed: {e}");
                }
            }
            None => log::info!("nothing to advance to after track {track}"),
        }
    }

    fn fail(&mut self, error: MediaError) {
        self.backend.stop();
        self.detach();
        self.apply(Trigger::Fail);
        self.state.last_error = Some(error);
    }

    /// Periodic housekeeping. Surfaces `NetworkStall` for a load that has
    /// received no new data for the stall timeout. Returns true on a stall.
    pub fn tick(&mut self, now: Instant) -> bool {
        let Some(started) = self.load_started else {
            return false;
        };
        if self.state.phase != Phase::Loading {
            return false;
        }
        if self.buffered > self.buffered_seen {
            self.buffered_seen = self.buffered;
            self.load_started = Some(now);
            return false;
        }
        let waited = now.saturating_duration_since(started);
        if waited < self.policy.stall_timeout {
            return false;
        }
        log::warn!("load stalled after {}s", waited.as_secs());
        self.fail(MediaError::NetworkStall {
            after: self.policy.stall_timeout,
        });
        true
    }

    /// Best-effort flush before exit.
    pub fn shutdown(&mut self) {
        self.persistence
            .save_last_position(self.state.position_seconds);
        self.persistence.save_progress(self.progress.map());
        self.persistence.save_statistics(self.stats.stats());
        self.backend.stop();
    }
}
