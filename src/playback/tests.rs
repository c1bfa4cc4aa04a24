use super::*;
use crate::catalog::{Catalog, OriginType, Source, Track};
use crate::store::{KeyValueStore, MemoryStore};
use serde_json::json;
use std::cell::RefCell;
use std::time::{Duration, Instant};

#[derive(Debug, Clone, PartialEq)]
enum Call {
    Load {
        load: LoadId,
        locator: String,
        start_at: f64,
        autoplay: bool,
    },
    Play,
    Pause,
    Seek(f64),
    Volume(f32),
    Rate(f32),
    Stop,
}

#[derive(Default)]
struct FakeBackend {
    calls: Vec<Call>,
}

impl FakeBackend {
    fn last_load(&self) -> Option<(LoadId, &str, f64, bool)> {
        self.calls.iter().rev().find_map(|c| match c {
            Call::Load {
                load,
                locator,
                start_at,
                autoplay,
            } => Some((*load, locator.as_str(), *start_at, *autoplay)),
            _ => None,
        })
    }

    fn loads(&self) -> usize {
        self.calls
            .iter()
            .filter(|c| matches!(c, Call::Load { .. }))
            .count()
    }
}

impl MediaBackend for FakeBackend {
    fn load(&mut self, load: LoadId, locator: &str, start_at: f64, autoplay: bool) {
        self.calls.push(Call::Load {
            load,
            locator: locator.to_string(),
            start_at,
            autoplay,
        });
    }
    fn play(&mut self) {
        self.calls.push(Call::Play);
    }
    fn pause(&mut self) {
        self.calls.push(Call::Pause);
    }
    fn seek(&mut self, seconds: f64) {
        self.calls.push(Call::Seek(seconds));
    }
    fn set_volume(&mut self, volume: f32) {
        self.calls.push(Call::Volume(volume));
    }
    fn set_rate(&mut self, rate: f32) {
        self.calls.push(Call::Rate(rate));
    }
    fn stop(&mut self) {
        self.calls.push(Call::Stop);
    }
}

fn track(position: u32) -> Track {
    Track {
        position,
        display_name: format!("Track {position}"),
        alternate_name: String::new(),
        ayah_count: 10,
        origin: OriginType::Meccan,
    }
}

fn catalog(n: u32) -> Catalog {
    Catalog::new((1..=n).map(track).collect()).unwrap()
}

fn other_source() -> Source {
    Source {
        id: "husary".to_string(),
        display_name: "Al-Husary".to_string(),
        alternate_name: String::new(),
        base_url: "https://example.test/husr/".to_string(),
    }
}

fn controller_with(n: u32, store: MemoryStore) -> Controller<FakeBackend, MemoryStore> {
    Controller::new(
        catalog(n),
        vec![Source::default_source(), other_source()],
        FakeBackend::default(),
        store,
        PlaybackPolicy::default(),
    )
}

fn controller(n: u32) -> Controller<FakeBackend, MemoryStore> {
    controller_with(n, MemoryStore::new())
}

fn current_load(c: &Controller<FakeBackend, MemoryStore>) -> LoadId {
    c.backend().last_load().map(|(l, ..)| l).unwrap()
}

fn ready(c: &mut Controller<FakeBackend, MemoryStore>, duration: f64) {
    let load = current_load(c);
    c.handle_event(EngineEvent::MetadataReady { load, duration });
}

fn advance(c: &mut Controller<FakeBackend, MemoryStore>, position: f64) {
    let load = current_load(c);
    c.handle_event(EngineEvent::PositionAdvanced { load, position });
}

fn finish(c: &mut Controller<FakeBackend, MemoryStore>) {
    let load = current_load(c);
    c.handle_event(EngineEvent::Finished { load });
}

fn close(a: f64, b: f64) -> bool {
    (a - b).abs() < 1e-9
}

// --- pure helpers -----------------------------------------------------------

#[test]
fn percent_floors_and_caps() {
    assert_eq!(percent(0.0, 100.0), Some(0));
    assert_eq!(percent(4.99, 100.0), Some(4));
    assert_eq!(percent(50.0, 200.0), Some(25));
    assert_eq!(percent(250.0, 200.0), Some(100));
    assert_eq!(percent(10.0, 0.0), None);
    assert_eq!(percent(10.0, f64::NAN), None);
}

#[test]
fn phase_table_rejects_out_of_order_triggers() {
    assert_eq!(Phase::Idle.on(Trigger::Load), Some(Phase::Loading));
    assert_eq!(
        Phase::Loading.on(Trigger::Ready { playing: true }),
        Some(Phase::Playing)
    );
    assert_eq!(
        Phase::Loading.on(Trigger::Ready { playing: false }),
        Some(Phase::Paused)
    );
    assert_eq!(Phase::Playing.on(Trigger::Finish), Some(Phase::Finished));
    assert_eq!(Phase::Idle.on(Trigger::Finish), None);
    assert_eq!(Phase::Loading.on(Trigger::Finish), None);
    assert_eq!(Phase::Finished.on(Trigger::Finish), None);
    assert_eq!(Phase::Playing.on(Trigger::Ready { playing: true }), None);
    assert!(Phase::Paused.is_live());
    assert!(!Phase::Finished.is_live());
}

#[test]
fn sequencer_wraps_both_ways() {
    assert_eq!(next_position(114, 114), Some(1));
    assert_eq!(prev_position(1, 114), Some(114));
    assert_eq!(next_position(5, 114), Some(6));
    assert_eq!(prev_position(5, 114), Some(4));
    assert_eq!(next_position(1, 0), None);
    assert_eq!(prev_position(1, 0), None);

    let c = catalog(114);
    assert_eq!(next_track(&c, 114).map(|t| t.position), Some(1));
    assert_eq!(prev_track(&c, 1).map(|t| t.position), Some(114));
}

#[test]
fn sequencer_treats_out_of_range_positions_alike() {
    for current in [0, 115, 300] {
        assert_eq!(next_position(current, 114), None);
        assert_eq!(prev_position(current, 114), None);
    }
    assert_eq!(next_position(1, 1), Some(1));
    assert_eq!(prev_position(1, 1), Some(1));
}

#[test]
fn progress_never_decreases() {
    let mut tracker = ProgressTracker::new(ProgressMap::default(), 5);
    tracker.observe(1, 40);
    tracker.observe(1, 12);
    assert_eq!(tracker.map().get(1), 40);
    tracker.observe(1, 41);
    assert_eq!(tracker.map().get(1), 41);
}

#[test]
fn progress_writes_once_per_step_boundary() {
    let mut tracker = ProgressTracker::new(ProgressMap::default(), 5);
    assert!(!tracker.observe(1, 3));
    assert!(tracker.observe(1, 5));
    assert!(!tracker.observe(1, 5));
    assert!(!tracker.observe(1, 6));
    assert!(tracker.observe(1, 10));
    assert!(tracker.observe(2, 10));
    tracker.finish(1);
    assert_eq!(tracker.map().get(1), 100);
}

#[test]
fn stats_count_only_small_forward_steps() {
    let mut acc = StatsAccumulator::new(Statistics::default(), 2.0, 1, 10);
    acc.observe(1, 1.0, None);
    acc.observe(1, 1.5, None);
    acc.observe(1, 2.0, None);
    // seek forward, then backward
    acc.observe(1, 50.0, None);
    acc.observe(1, 49.0, None);
    acc.observe(1, 49.0, None);
    acc.observe(1, 49.25, None);
    assert!(close(acc.stats().total_listen_seconds, 1.25));
}

#[test]
fn backward_seek_never_adds_time() {
    let mut acc = StatsAccumulator::new(Statistics::default(), 2.0, 1, 10);
    acc.observe(1, 30.0, None);
    let before = acc.stats().total_listen_seconds;
    for t in [29.5, 20.0, 5.0, 1.0] {
        acc.observe(1, t, None);
        assert!(acc.stats().total_listen_seconds <= before);
    }
}

#[test]
fn stats_checkpoint_once_per_interval() {
    let mut acc = StatsAccumulator::new(Statistics::default(), 2.0, 1, 10);
    let mut checkpoints = 0;
    let mut t = 0.5;
    while t <= 12.0 {
        if acc.observe(1, t, None).checkpoint {
            checkpoints += 1;
        }
        t += 0.5;
    }
    assert_eq!(checkpoints, 1);
    assert!(close(acc.stats().total_listen_seconds, 11.5));
}

#[test]
fn stats_started_after_threshold_and_completed_on_finish() {
    let mut acc = StatsAccumulator::new(Statistics::default(), 2.0, 1, 10);
    assert!(!acc.observe(7, 1.0, Some(1)).started);
    assert!(acc.observe(7, 1.5, Some(2)).started);
    assert!(!acc.observe(7, 2.0, Some(3)).started);
    assert!(acc.finish(7));
    assert!(!acc.finish(7));
    assert!(acc.stats().started_tracks.contains(&7));
    assert!(acc.stats().completed_tracks.contains(&7));
}

#[test]
fn completion_rate_rounds() {
    let mut stats = Statistics::default();
    stats.completed_tracks.extend([1, 2, 3]);
    assert_eq!(stats.completion_rate(114), 3);
    assert_eq!(stats.completion_rate(3), 100);
    assert_eq!(stats.completion_rate(0), 0);
}

// --- controller -------------------------------------------------------------

#[test]
fn load_and_play_builds_locator_and_starts() {
    let mut c = controller(3);
    c.load_and_play(2).unwrap();

    let (_, locator, start_at, autoplay) = c.backend().last_load().unwrap();
    assert_eq!(locator, "https://server8.mp3quran.net/afs/002.mp3");
    assert_eq!(start_at, 0.0);
    assert!(autoplay);

    let s = c.state();
    assert!(s.is_playing);
    assert_eq!(s.phase, Phase::Loading);
    assert_eq!(s.active_track.as_ref().map(|t| t.position), Some(2));
    assert_eq!(c.persistence().last_track(), Some(2));

    ready(&mut c, 120.0);
    assert_eq!(c.state().phase, Phase::Playing);
    assert_eq!(c.state().duration_seconds, 120.0);
}

#[test]
fn load_and_play_unknown_track_is_rejected() {
    let mut c = controller(3);
    assert_eq!(c.load_and_play(9), Err(PlaybackError::UnknownTrack(9)));
    assert_eq!(c.backend().loads(), 0);
}

#[test]
fn load_and_play_twice_toggles_without_reset() {
    let mut c = controller(3);
    c.load_and_play(1).unwrap();
    ready(&mut c, 100.0);
    advance(&mut c, 30.0);

    c.load_and_play(1).unwrap();
    assert!(!c.state().is_playing);
    assert_eq!(c.state().phase, Phase::Paused);
    assert_eq!(c.state().position_seconds, 30.0);
    assert_eq!(c.backend().loads(), 1);
    assert_eq!(c.backend().calls.last(), Some(&Call::Pause));

    c.load_and_play(1).unwrap();
    assert!(c.state().is_playing);
    assert_eq!(c.backend().calls.last(), Some(&Call::Play));
}

#[test]
fn toggle_play_without_resource_is_noop() {
    let mut c = controller(3);
    let calls_before = c.backend().calls.len();
    c.toggle_play();
    assert!(!c.state().is_playing);
    assert_eq!(c.backend().calls.len(), calls_before);
}

#[test]
fn position_updates_raise_progress_monotonically() {
    let mut c = controller(3);
    c.load_and_play(1).unwrap();
    ready(&mut c, 200.0);

    advance(&mut c, 100.0);
    assert_eq!(c.progress().get(1), 50);
    c.seek(20.0);
    advance(&mut c, 20.0);
    assert_eq!(c.progress().get(1), 50);
    assert_eq!(c.state().position_seconds, 20.0);
}

#[test]
fn events_before_metadata_are_ignored() {
    let mut c = controller(3);
    c.load_and_play(1).unwrap();
    advance(&mut c, 10.0);
    assert_eq!(c.progress().get(1), 0);
    assert_eq!(c.state().position_seconds, 0.0);
}

#[test]
fn stale_events_do_not_touch_state() {
    let mut c = controller(3);
    c.load_and_play(1).unwrap();
    let old = current_load(&c);
    c.load_and_play(2).unwrap();

    c.handle_event(EngineEvent::MetadataReady {
        load: old,
        duration: 100.0,
    });
    c.handle_event(EngineEvent::PositionAdvanced {
        load: old,
        position: 90.0,
    });
    c.handle_event(EngineEvent::Finished { load: old });

    assert_eq!(c.state().phase, Phase::Loading);
    assert_eq!(c.state().duration_seconds, 0.0);
    assert_eq!(c.progress().get(1), 0);
    assert_eq!(c.progress().get(2), 0);
    assert!(c.statistics().completed_tracks.is_empty());
    assert_eq!(c.backend().loads(), 2);
}

#[test]
fn natural_end_completes_and_wraps_to_first_track() {
    let mut c = controller(3);
    c.load_and_play(3).unwrap();
    ready(&mut c, 100.0);
    advance(&mut c, 50.0);
    advance(&mut c, 91.0);
    assert_eq!(c.progress().get(3), 91);

    finish(&mut c);

    assert_eq!(c.progress().get(3), 100);
    assert!(c.statistics().completed_tracks.contains(&3));
    let (_, locator, start_at, autoplay) = c.backend().last_load().unwrap();
    assert_eq!(locator, "https://server8.mp3quran.net/afs/001.mp3");
    assert_eq!(start_at, 0.0);
    assert!(autoplay);
    assert_eq!(c.state().active_track.as_ref().map(|t| t.position), Some(1));
    assert!(c.state().is_playing);

    let stored = c.persistence().progress();
    assert_eq!(stored.get(3), 100);
    let stored = c.persistence().statistics();
    assert!(stored.completed_tracks.contains(&3));
}

#[test]
fn natural_end_without_auto_advance_stops() {
    let policy = PlaybackPolicy {
        auto_advance: false,
        ..PlaybackPolicy::default()
    };
    let mut c = Controller::new(
        catalog(3),
        vec![Source::default_source()],
        FakeBackend::default(),
        MemoryStore::new(),
        policy,
    );
    c.load_and_play(2).unwrap();
    ready(&mut c, 60.0);
    finish(&mut c);

    assert_eq!(c.state().phase, Phase::Finished);
    assert!(!c.state().is_playing);
    assert_eq!(c.backend().loads(), 1);

    // toggling after the end restarts the same track
    c.toggle_play();
    assert_eq!(c.backend().loads(), 2);
    assert_eq!(c.state().active_track.as_ref().map(|t| t.position), Some(2));
}

#[test]
fn manual_skip_does_not_complete() {
    let mut c = controller(3);
    c.load_and_play(1).unwrap();
    ready(&mut c, 100.0);
    advance(&mut c, 99.0);
    c.next().unwrap();

    assert!(c.statistics().completed_tracks.is_empty());
    assert_eq!(c.state().active_track.as_ref().map(|t| t.position), Some(2));
}

#[test]
fn next_and_prev_wrap_and_require_active_track() {
    let mut c = controller(114);
    assert_eq!(c.next(), Err(PlaybackError::NoActiveTrack));
    assert_eq!(c.prev(), Err(PlaybackError::NoActiveTrack));

    c.load_and_play(114).unwrap();
    c.next().unwrap();
    assert_eq!(c.state().active_track.as_ref().map(|t| t.position), Some(1));
    c.prev().unwrap();
    assert_eq!(c.state().active_track.as_ref().map(|t| t.position), Some(114));
}

#[test]
fn changing_source_keeps_time_progress_and_stats() {
    let mut c = controller(3);
    c.load_and_play(2).unwrap();
    ready(&mut c, 200.0);
    let mut t = 10.0;
    while t <= 20.0 {
        advance(&mut c, t);
        t += 0.5;
    }
    let progress_before = c.progress().clone();
    let stats_before = c.statistics().clone();
    let position = c.state().position_seconds;

    c.select_source(other_source());

    let (_, locator, start_at, autoplay) = c.backend().last_load().unwrap();
    assert_eq!(locator, "https://example.test/husr/002.mp3");
    assert_eq!(start_at, position);
    assert!(autoplay);
    assert!(c.state().is_playing);
    assert_eq!(c.state().position_seconds, position);
    assert_eq!(c.progress(), &progress_before);
    assert_eq!(c.statistics(), &stats_before);
    assert_eq!(c.persistence().source(), Some(other_source()));
}

#[test]
fn changing_source_while_idle_only_selects_it() {
    let mut c = controller(3);
    c.select_source_by_id("husary").unwrap();
    assert_eq!(c.backend().loads(), 0);
    c.load_and_play(1).unwrap();
    let (_, locator, ..) = c.backend().last_load().unwrap();
    assert_eq!(locator, "https://example.test/husr/001.mp3");

    assert_eq!(
        c.select_source_by_id("nobody"),
        Err(PlaybackError::UnknownSource("nobody".to_string()))
    );
}

#[test]
fn cycle_source_wraps() {
    let mut c = controller(3);
    assert_eq!(c.state().active_source.as_ref().unwrap().id, "mp3quran-123");
    c.cycle_source();
    assert_eq!(c.state().active_source.as_ref().unwrap().id, "husary");
    c.cycle_source();
    assert_eq!(c.state().active_source.as_ref().unwrap().id, "mp3quran-123");
}

#[test]
fn volume_is_clamped_and_persisted_rate_is_not() {
    let mut c = controller(3);
    c.set_volume(1.5);
    assert_eq!(c.state().volume, 1.0);
    assert_eq!(c.persistence().volume(0.7), 1.0);
    c.set_volume(0.25);
    assert_eq!(c.persistence().volume(0.7), 0.25);

    c.set_rate(1.5).unwrap();
    assert_eq!(c.state().rate, 1.5);
    assert_eq!(c.backend().calls.last(), Some(&Call::Rate(1.5)));
    assert_eq!(c.set_rate(0.0), Err(PlaybackError::InvalidRate(0.0)));
    assert!(c.set_rate(f32::NAN).is_err());
    assert_eq!(c.state().rate, 1.5);
    assert!(c.persistence().store().get("rate").is_none());
}

#[test]
fn seek_persists_position_immediately() {
    let mut c = controller(3);
    c.load_and_play(1).unwrap();
    ready(&mut c, 300.0);
    c.seek(123.0);
    assert_eq!(c.backend().calls.last(), Some(&Call::Seek(123.0)));
    assert_eq!(c.persistence().last_position(), 123.0);

    c.seek_by(1000.0);
    assert_eq!(c.state().position_seconds, 300.0);
    c.seek_by(-1000.0);
    assert_eq!(c.state().position_seconds, 0.0);
}

#[test]
fn stalled_load_surfaces_network_stall() {
    let mut c = controller(3);
    c.load_and_play(1).unwrap();
    let load = current_load(&c);

    assert!(!c.tick(Instant::now()));
    assert!(c.tick(Instant::now() + Duration::from_secs(21)));

    let s = c.state();
    assert_eq!(s.phase, Phase::Idle);
    assert!(!s.is_playing);
    assert!(matches!(s.last_error, Some(MediaError::NetworkStall { .. })));
    assert_eq!(c.backend().calls.last(), Some(&Call::Stop));

    c.handle_event(EngineEvent::MetadataReady {
        load,
        duration: 10.0,
    });
    assert_eq!(c.state().phase, Phase::Idle);
}

#[test]
fn slow_download_that_keeps_arriving_is_not_a_stall() {
    let mut c = controller(3);
    c.load_and_play(2).unwrap();
    let load = current_load(&c);
    let t0 = Instant::now();

    c.handle_event(EngineEvent::Buffering {
        load,
        received: 64 * 1024,
    });
    assert!(!c.tick(t0 + Duration::from_secs(15)));
    c.handle_event(EngineEvent::Buffering {
        load,
        received: 10 * 1024 * 1024,
    });
    assert!(!c.tick(t0 + Duration::from_secs(30)));
    assert!(!c.tick(t0 + Duration::from_secs(45)));
    assert_eq!(c.state().phase, Phase::Loading);
    assert!(c.state().is_playing);
    assert_eq!(c.state().last_error, None);

    // Once the bytes stop, the timeout runs from the last progress seen.
    assert!(c.tick(t0 + Duration::from_secs(51)));
    assert!(matches!(
        c.state().last_error,
        Some(MediaError::NetworkStall { .. })
    ));
}

#[test]
fn buffering_from_a_replaced_load_does_not_hold_off_the_stall() {
    let mut c = controller(3);
    c.load_and_play(1).unwrap();
    let old = current_load(&c);
    c.load_and_play(2).unwrap();

    c.handle_event(EngineEvent::Buffering {
        load: old,
        received: 1024,
    });
    assert!(c.tick(Instant::now() + Duration::from_secs(21)));
}

#[test]
fn failed_event_is_reported() {
    let mut c = controller(3);
    c.load_and_play(1).unwrap();
    let load = current_load(&c);
    c.handle_event(EngineEvent::Failed {
        load,
        error: MediaError::ResourceUnavailable("404".to_string()),
    });
    assert_eq!(c.state().phase, Phase::Idle);
    assert_eq!(
        c.state().last_error,
        Some(MediaError::ResourceUnavailable("404".to_string()))
    );
    // a fresh load clears the error
    c.load_and_play(1).unwrap();
    assert_eq!(c.state().last_error, None);
}

#[test]
fn restore_cues_last_track_paused() {
    let mut store = MemoryStore::new();
    store.set("last_track", json!(2)).unwrap();
    store.set("last_position", json!(42.5)).unwrap();
    store.set("volume", json!(0.4)).unwrap();

    let mut c = controller_with(3, store);
    assert_eq!(c.state().volume, 0.4);
    c.restore();

    let (_, locator, start_at, autoplay) = c.backend().last_load().unwrap();
    assert_eq!(locator, "https://server8.mp3quran.net/afs/002.mp3");
    assert_eq!(start_at, 42.5);
    assert!(!autoplay);
    assert!(!c.state().is_playing);

    ready(&mut c, 100.0);
    assert_eq!(c.state().phase, Phase::Paused);
    c.toggle_play();
    assert!(c.state().is_playing);
    assert_eq!(c.backend().calls.last(), Some(&Call::Play));
}

#[test]
fn corrupt_store_values_fall_back_to_defaults() {
    let mut store = MemoryStore::new();
    store.set("last_track", json!(-3)).unwrap();
    store.set("last_position", json!("soon")).unwrap();
    store.set("volume", json!("loud")).unwrap();
    store.set("progress", json!("x")).unwrap();
    store.set("statistics", json!(5)).unwrap();
    store.set("source", json!([])).unwrap();
    store.set("bookmarks", json!({"a": 1})).unwrap();

    let mut c = controller_with(3, store);
    c.restore();

    assert_eq!(c.state().volume, 0.7);
    assert!(c.progress().is_empty());
    assert_eq!(c.statistics(), &Statistics::default());
    assert_eq!(
        c.state().active_source.as_ref().map(|s| s.id.as_str()),
        Some("mp3quran-123")
    );
    assert!(c.bookmarks().is_empty());
    assert_eq!(c.backend().loads(), 0);
}

#[test]
fn bookmarks_toggle_and_persist() {
    let mut c = controller(3);
    assert!(c.toggle_bookmark(2));
    assert!(c.is_bookmarked(2));
    assert!(c.persistence().bookmarks().contains(&2));
    assert!(!c.toggle_bookmark(2));
    assert!(c.persistence().bookmarks().is_empty());
}

#[test]
fn stop_detaches_resource() {
    let mut c = controller(3);
    c.load_and_play(1).unwrap();
    ready(&mut c, 100.0);
    let load = current_load(&c);
    c.stop();
    assert_eq!(c.state().phase, Phase::Idle);
    assert!(!c.state().is_playing);

    c.handle_event(EngineEvent::PositionAdvanced {
        load,
        position: 80.0,
    });
    assert_eq!(c.progress().get(1), 0);
}

#[test]
fn listening_time_and_started_flow_through_controller() {
    let mut c = controller(3);
    c.load_and_play(1).unwrap();
    ready(&mut c, 100.0);
    for t in [0.5, 1.0, 1.5, 2.0, 2.5] {
        advance(&mut c, t);
    }
    assert!(close(c.statistics().total_listen_seconds, 2.0));
    assert!(c.statistics().started_tracks.contains(&1));
    assert!(c.persistence().statistics().started_tracks.contains(&1));
}

// --- session bridge -------------------------------------------------------

#[derive(Default)]
struct RecordingSession {
    metadata: RefCell<Vec<Option<NowPlaying>>>,
    statuses: RefCell<Vec<SessionStatus>>,
    positions: RefCell<Vec<(f64, f64, f32)>>,
}

impl MediaSession for RecordingSession {
    fn set_now_playing(&self, now: Option<&NowPlaying>) {
        self.metadata.borrow_mut().push(now.cloned());
    }
    fn set_status(&self, status: SessionStatus) {
        self.statuses.borrow_mut().push(status);
    }
    fn set_position(&self, position: f64, duration: f64, rate: f32) {
        self.positions.borrow_mut().push((position, duration, rate));
    }
}

#[test]
fn session_sync_sends_changes_only() {
    let mut c = controller(3);
    let session = RecordingSession::default();
    let mut sync = SessionSync::new("Holy Quran", None);

    sync.sync(&session, c.state());
    sync.sync(&session, c.state());
    assert_eq!(session.metadata.borrow().len(), 0);
    assert_eq!(*session.statuses.borrow(), vec![SessionStatus::Stopped]);

    c.load_and_play(2).unwrap();
    ready(&mut c, 90.0);
    sync.sync(&session, c.state());
    sync.sync(&session, c.state());

    let metadata = session.metadata.borrow();
    assert_eq!(metadata.len(), 1);
    let now = metadata[0].as_ref().unwrap();
    assert_eq!(now.title, "Track 2");
    assert_eq!(now.artist, "Mishary Alafasi");
    assert_eq!(now.album, "Holy Quran");
    assert_eq!(
        *session.statuses.borrow(),
        vec![SessionStatus::Stopped, SessionStatus::Playing]
    );
    assert_eq!(session.positions.borrow().len(), 2);
}
