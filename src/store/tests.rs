use super::*;
use crate::catalog::Source;
use crate::playback::{ProgressMap, Statistics};
use serde_json::json;
use std::collections::BTreeSet;
use std::fs;
use tempfile::tempdir;

fn sample_progress() -> ProgressMap {
    let mut map = ProgressMap::default();
    map.raise(1, 100);
    map.raise(2, 35);
    map.raise(114, 5);
    map
}

fn sample_stats() -> Statistics {
    Statistics {
        total_listen_seconds: 1234.75,
        started_tracks: BTreeSet::from([1, 2, 114]),
        completed_tracks: BTreeSet::from([1]),
    }
}

#[test]
fn progress_and_statistics_survive_a_restart() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("state.json");

    {
        let mut p = Persistence::new(JsonFileStore::open(&path).unwrap());
        p.save_progress(&sample_progress());
        p.save_statistics(&sample_stats());
        p.save_last_track(2);
        p.save_last_position(61.5);
        p.save_volume(0.3);
        p.save_source(&Source::default_source());
        p.save_bookmarks(&BTreeSet::from([18, 36]));
    }

    let p = Persistence::new(JsonFileStore::open(&path).unwrap());
    assert_eq!(p.progress(), sample_progress());
    assert_eq!(p.statistics(), sample_stats());
    assert_eq!(p.last_track(), Some(2));
    assert_eq!(p.last_position(), 61.5);
    assert_eq!(p.volume(0.7), 0.3);
    assert_eq!(p.source(), Some(Source::default_source()));
    assert_eq!(p.bookmarks(), BTreeSet::from([18, 36]));
}

#[test]
fn progress_map_is_stored_as_an_object_keyed_by_position() {
    let value = serde_json::to_value(sample_progress()).unwrap();
    assert_eq!(value, json!({"1": 100, "2": 35, "114": 5}));
}

#[test]
fn stored_progress_above_100_is_capped() {
    let map: ProgressMap = serde_json::from_value(json!({"3": 250, "4": 40})).unwrap();
    assert_eq!(map.get(3), 100);
    assert_eq!(map.get(4), 40);
}

#[test]
fn missing_file_opens_empty_and_creates_parent_dirs() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("nested").join("deeper").join("state.json");
    let mut store = JsonFileStore::open(&path).unwrap();
    assert!(store.get("volume").is_none());

    store.set("volume", json!(0.5)).unwrap();
    let written: serde_json::Value =
        serde_json::from_str(&fs::read_to_string(&path).unwrap()).unwrap();
    assert_eq!(written, json!({"volume": 0.5}));
}

#[test]
fn corrupt_file_is_moved_aside() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("state.json");
    fs::write(&path, "{ not json").unwrap();

    let store = JsonFileStore::open(&path).unwrap();
    assert!(store.get("progress").is_none());
    assert!(dir.path().join("state.json.corrupt").exists());
}

#[test]
fn corrupt_file_that_cannot_be_moved_is_left_alone() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("state.json");
    fs::write(&path, "{ not json").unwrap();
    // A directory in the way makes the rename fail.
    let aside = dir.path().join("state.json.corrupt");
    fs::create_dir(&aside).unwrap();
    fs::write(aside.join("keep"), "x").unwrap();

    assert!(matches!(JsonFileStore::open(&path), Err(StoreError::Io(_))));
    assert_eq!(fs::read_to_string(&path).unwrap(), "{ not json");
}

#[test]
fn non_object_file_is_treated_as_corrupt() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("state.json");
    fs::write(&path, "[1, 2, 3]").unwrap();

    let store = JsonFileStore::open(&path).unwrap();
    assert!(store.get("0").is_none());
}

#[test]
fn corrupt_values_fall_back_per_key() {
    let mut store = MemoryStore::new();
    store.set("volume", json!(3.0)).unwrap();
    store.set("last_position", json!(-12.0)).unwrap();
    store.set("last_track", json!(0)).unwrap();
    store.set("statistics", json!({"total_listen_seconds": -5.0})).unwrap();
    store.set("progress", json!({"1": 40})).unwrap();

    let p = Persistence::new(store);
    assert_eq!(p.volume(0.7), 0.7);
    assert_eq!(p.last_position(), 0.0);
    assert_eq!(p.last_track(), None);
    assert_eq!(p.statistics().total_listen_seconds, 0.0);
    assert_eq!(p.progress().get(1), 40);
}

#[test]
fn partial_statistics_fill_missing_fields() {
    let mut store = MemoryStore::new();
    store
        .set("statistics", json!({"completed_tracks": [4]}))
        .unwrap();
    let stats = Persistence::new(store).statistics();
    assert_eq!(stats.total_listen_seconds, 0.0);
    assert!(stats.started_tracks.is_empty());
    assert_eq!(stats.completed_tracks, BTreeSet::from([4]));
}

#[test]
fn memory_store_counts_writes() {
    let mut p = Persistence::new(MemoryStore::new());
    p.save_volume(0.2);
    p.save_volume(0.3);
    assert_eq!(p.store().writes(), 2);
}

#[test]
fn store_keys_are_stable() {
    let keys: Vec<&str> = [
        StoreKey::LastTrack,
        StoreKey::LastPosition,
        StoreKey::Volume,
        StoreKey::Progress,
        StoreKey::Statistics,
        StoreKey::Source,
        StoreKey::Bookmarks,
    ]
    .iter()
    .map(|k| k.as_str())
    .collect();
    assert_eq!(
        keys,
        vec![
            "last_track",
            "last_position",
            "volume",
            "progress",
            "statistics",
            "source",
            "bookmarks"
        ]
    );
}

#[test]
fn boxed_stores_are_interchangeable() {
    let stores: Vec<Box<dyn KeyValueStore>> = vec![Box::new(MemoryStore::new())];
    for store in stores {
        let mut p = Persistence::new(store);
        p.save_last_track(9);
        assert_eq!(p.last_track(), Some(9));
    }
}
