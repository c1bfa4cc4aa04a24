//! Application model: cursor and front-end flags.
//!
//! Playback state lives in the controller; `App` only tracks what the user is
//! looking at.

use crate::catalog::Catalog;

/// The front-end model.
#[derive(Debug, Default)]
pub struct App {
    /// Index into `Catalog::tracks()`.
    pub selected: usize,
    /// The cursor jumps to the active track whenever it changes.
    pub follow_playback: bool,
    /// First `g` of a `gg` chord was pressed.
    pub pending_gg: bool,
    pub details_window: bool,
    /// Why the catalog could not be loaded, shown until a retry succeeds.
    pub catalog_error: Option<String>,
    /// One-line feedback for the last rejected command.
    pub message: Option<String>,
}

impl App {
    pub fn new() -> Self {
        Self {
            follow_playback: true,
            ..Self::default()
        }
    }

    pub fn toggle_details_window(&mut self) {
        self.details_window = !self.details_window;
    }

    /// Move selection to the next track, wrapping to the first.
    pub fn next(&mut self, len: usize) {
        if len == 0 {
            self.selected = 0;
            return;
        }
        self.selected = (self.selected + 1) % len;
    }

    /// Move selection to the previous track, wrapping to the last.
    pub fn prev(&mut self, len: usize) {
        if len == 0 {
            self.selected = 0;
            return;
        }
        self.selected = if self.selected == 0 || self.selected >= len {
            len - 1
        } else {
            self.selected - 1
        };
    }

    pub fn first(&mut self) {
        self.selected = 0;
    }

    pub fn last(&mut self, len: usize) {
        self.selected = len.saturating_sub(1);
    }

    /// Feed a `g` key. Returns true when it completes a `gg` chord.
    pub fn press_g(&mut self) -> bool {
        if self.pending_gg {
            self.pending_gg = false;
            true
        } else {
            self.pending_gg = true;
            false
        }
    }

    /// Position of the selected track, if the catalog has one there.
    pub fn selected_position(&self, catalog: &Catalog) -> Option<u32> {
        catalog.tracks().get(self.selected).map(|t| t.position)
    }

    /// Put the cursor on `active` when following playback.
    pub fn follow(&mut self, catalog: &Catalog, active: Option<u32>) {
        if !self.follow_playback {
            return;
        }
        if let Some(i) = active.and_then(|p| catalog.index_of(p)) {
            self.selected = i;
        }
    }

    pub fn set_message(&mut self, message: impl Into<String>) {
        self.message = Some(message.into());
    }

    pub fn clear_message(&mut self) {
        self.message = None;
    }
}
