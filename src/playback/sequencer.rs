//! Track-to-track ordering. The catalog is cyclic: there is no last track.

use crate::catalog::{Catalog, Track};

/// Catalog size, when `current` is one of its positions.
fn bound(current: u32, len: usize) -> Option<u32> {
    u32::try_from(len)
        .ok()
        .filter(|n| (1..=*n).contains(&current))
}

/// Position after `current` in a catalog of `len` tracks. `None` when
/// `current` is not in `1..=len`.
pub fn next_position(current: u32, len: usize) -> Option<u32> {
    let n = bound(current, len)?;
    Some(current % n + 1)
}

/// Position before `current` in a catalog of `len` tracks. `None` when
/// `current` is not in `1..=len`.
pub fn prev_position(current: u32, len: usize) -> Option<u32> {
    let n = bound(current, len)?;
    Some(if current == 1 { n } else { current - 1 })
}

pub fn next_track(catalog: &Catalog, current: u32) -> Option<&Track> {
    next_position(current, catalog.len()).and_then(|p| catalog.find(p))
}

pub fn prev_track(catalog: &Catalog, current: u32) -> Option<&Track> {
    prev_position(current, catalog.len()).and_then(|p| catalog.find(p))
}
