//! UI rendering helpers for the terminal user interface.
//!
//! This module contains functions to render the TUI using `ratatui`.

use std::collections::{BTreeMap, BTreeSet};
use std::sync::LazyLock;

use ratatui::{
    Frame,
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Modifier, Style, Stylize},
    widgets::{Block, Borders, Clear, List, ListItem, Padding, Paragraph, Wrap},
};

use crate::app::App;
use crate::catalog::{Catalog, Track};
use crate::config::{ControlsSettings, UiSettings};
use crate::playback::{Phase, PlaybackState, ProgressMap, Statistics};

static CONTROLS_MAP: LazyLock<BTreeMap<String, String>> = LazyLock::new(|| {
    let mut map: BTreeMap<String, String> = BTreeMap::new();
    map.insert("j/k".to_string(), "up/down".to_string());
    map.insert("gg/G".to_string(), "top/bottom".to_string());
    map.insert("enter".to_string(), "play selected".to_string());
    map.insert("space/p".to_string(), "play/pause".to_string());
    map.insert("h/l".to_string(), "prev/next".to_string());
    // H/L is filled dynamically from config.
    map.insert("+/-".to_string(), "volume".to_string());
    map.insert("</>".to_string(), "rate".to_string());
    map.insert("s".to_string(), "reciter".to_string());
    map.insert("b".to_string(), "bookmark".to_string());
    map.insert("K".to_string(), "details".to_string());
    map.insert("R".to_string(), "reload catalog".to_string());
    map.insert("q".to_string(), "quit".to_string());
    map
});

/// Render the controls help text, incorporating scrub seconds.
fn controls_text(scrub_seconds: u64) -> String {
    let order = [
        "j/k", "h/l", "H/L", "enter", "space/p", "gg/G", "+/-", "</>", "s", "b", "K", "R", "q",
    ];
    order
        .iter()
        .filter_map(|k| {
            if *k == "H/L" {
                Some(format!("[H/L] scrub -/+{}s", scrub_seconds))
            } else {
                CONTROLS_MAP.get(*k).map(|v| format!("[{}] {}", k, v))
            }
        })
        .collect::<Vec<String>>()
        .join(" | ")
}

/// Format seconds as `m:ss`, or `h:mm:ss` from one hour up.
pub fn format_clock(seconds: f64) -> String {
    if !seconds.is_finite() || seconds <= 0.0 {
        return "0:00".to_string();
    }
    let total = seconds as u64;
    let (h, m, s) = (total / 3600, (total % 3600) / 60, total % 60);
    if h > 0 {
        format!("{h}:{m:02}:{s:02}")
    } else {
        format!("{m}:{s:02}")
    }
}

/// Format accumulated listening time as `1h 2m 3s`, dropping leading zero units.
pub fn format_listen_time(seconds: f64) -> String {
    let total = if seconds.is_finite() && seconds > 0.0 {
        seconds as u64
    } else {
        0
    };
    let (h, m, s) = (total / 3600, (total % 3600) / 60, total % 60);
    let mut parts = Vec::new();
    if h > 0 {
        parts.push(format!("{h}h"));
    }
    if m > 0 || h > 0 {
        parts.push(format!("{m}m"));
    }
    parts.push(format!("{s}s"));
    parts.join(" ")
}

/// Everything `draw` reads. Built fresh by the runtime for each frame.
pub struct View<'a> {
    pub app: &'a App,
    pub state: &'a PlaybackState,
    pub catalog: &'a Catalog,
    pub progress: &'a ProgressMap,
    pub statistics: &'a Statistics,
    pub bookmarks: &'a BTreeSet<u32>,
}

/// One row of the track list: marker, position, name and progress.
fn track_line(view: &View<'_>, track: &Track, show_alternate: bool) -> String {
    let active = view
        .state
        .active_track
        .as_ref()
        .is_some_and(|t| t.position == track.position);
    let marker = if active {
        if view.state.is_playing { "▶" } else { "‖" }
    } else {
        " "
    };
    let bookmark = if view.bookmarks.contains(&track.position) {
        "★"
    } else {
        " "
    };

    let pct = view.progress.get(track.position);
    let progress = if view.statistics.completed_tracks.contains(&track.position) {
        "✓".to_string()
    } else if pct > 0 {
        format!("{pct}%")
    } else {
        String::new()
    };

    let mut name = track.display_name.clone();
    if show_alternate && !track.alternate_name.is_empty() {
        name.push_str(" · ");
        name.push_str(&track.alternate_name);
    }
    format!(
        "{marker}{bookmark} {:>3}. {name}  {progress}",
        track.position
    )
}

fn now_playing_text(state: &PlaybackState) -> String {
    let mut parts: Vec<String> = Vec::new();

    match &state.active_track {
        Some(track) => {
            let status = match state.phase {
                Phase::Loading => "Loading",
                Phase::Finished => "Finished",
                Phase::Idle => "Stopped",
                _ if state.is_playing => "Playing",
                _ => "Paused",
            };
            parts.push(status.to_string());
            parts.push(format!(
                "{}. {} [{} / {}]",
                track.position,
                track.display_name,
                format_clock(state.position_seconds),
                format_clock(state.duration_seconds)
            ));
        }
        None => parts.push("Stopped".to_string()),
    }

    if let Some(source) = &state.active_source {
        parts.push(format!("Reciter: {}", source.display_name));
    }
    parts.push(format!("Vol: {:.0}%", state.volume * 100.0));
    parts.push(format!("Rate: {:.2}x", state.rate));
    parts.join(" • ")
}

fn statistics_text(stats: &Statistics, catalog_len: usize) -> String {
    format!(
        "Listened: {} • Started: {} • Completed: {} ({}%)",
        format_listen_time(stats.total_listen_seconds),
        stats.started_tracks.len(),
        stats.completed_tracks.len(),
        stats.completion_rate(catalog_len)
    )
}

/// Compute a centered rectangle with given size constrained to `r`.
fn centered_rect_sized(mut width: u16, mut height: u16, r: Rect) -> Rect {
    width = width.min(r.width.saturating_sub(2)).max(10);
    height = height.min(r.height.saturating_sub(2)).max(5);

    let x = r.x + (r.width.saturating_sub(width) / 2);
    let y = r.y + (r.height.saturating_sub(height) / 2);
    Rect {
        x,
        y,
        width,
        height,
    }
}

fn details_text(view: &View<'_>, track: &Track) -> String {
    let bookmarked = if view.bookmarks.contains(&track.position) {
        "yes"
    } else {
        "no"
    };
    format!(
        "Name: {}\nAlternate: {}\nVerses: {}\nOrigin: {}\nProgress: {}%\nBookmarked: {}",
        track.display_name,
        if track.alternate_name.is_empty() {
            "-"
        } else {
            track.alternate_name.as_str()
        },
        track.ayah_count,
        track.origin.label(),
        view.progress.get(track.position),
        bookmarked
    )
}

fn padded(title: &str) -> Block<'_> {
    Block::default()
        .borders(Borders::ALL)
        .title(title)
        .padding(Padding {
            left: 1,
            right: 0,
            top: 0,
            bottom: 0,
        })
}

/// Render the entire UI into the provided `frame`.
pub fn draw(
    frame: &mut Frame,
    view: &View<'_>,
    ui_settings: &UiSettings,
    controls_settings: &ControlsSettings,
) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3),
            Constraint::Length(5),
            Constraint::Min(1),
            Constraint::Length(4),
        ])
        .split(frame.area());

    // Header
    let header = Paragraph::new(ui_settings.header_text.as_str())
        .alignment(Alignment::Center)
        .block(
            Block::default()
                .borders(Borders::ALL)
                .title(" tartil ")
                .title_alignment(Alignment::Center),
        );
    frame.render_widget(header, chunks[0]);

    // Status box: now playing, statistics, then the latest problem if any.
    let mut status_lines = vec![
        now_playing_text(view.state),
        statistics_text(view.statistics, view.catalog.len()),
    ];
    if let Some(err) = &view.state.last_error {
        status_lines.push(format!("Error: {err}"));
    } else if let Some(msg) = &view.app.message {
        status_lines.push(msg.clone());
    }
    let status_par = Paragraph::new(status_lines.join("\n"))
        .block(padded(" status "))
        .wrap(Wrap { trim: true });
    frame.render_widget(status_par, chunks[1]);

    // Main list
    if let Some(err) = &view.app.catalog_error {
        let msg = Paragraph::new(format!("Could not load the track list: {err}\n\nPress R to retry."))
            .red()
            .block(padded(" tracks "))
            .wrap(Wrap { trim: true });
        frame.render_widget(msg, chunks[2]);
    } else {
        // Center the selected item when possible by creating a visible window.
        let tracks = view.catalog.tracks();
        let total = tracks.len();
        let list_height = chunks[2].height.saturating_sub(2) as usize;
        let sel_pos = view.app.selected.min(total.saturating_sub(1));
        let (start, end, selected_pos_in_visible) = if total <= list_height || list_height == 0 {
            (0, total, sel_pos)
        } else {
            let half = list_height / 2;
            let mut start = sel_pos.saturating_sub(half);
            if start + list_height > total {
                start = total - list_height;
            }
            (start, start + list_height, sel_pos - start)
        };

        let visible_items: Vec<ListItem> = tracks[start..end]
            .iter()
            .map(|t| ListItem::new(track_line(view, t, ui_settings.show_alternate_names)))
            .collect();

        let list = List::new(visible_items)
            .block(Block::default().borders(Borders::ALL).title(" tracks "))
            .highlight_style(Style::default().add_modifier(Modifier::REVERSED))
            .highlight_symbol("> ");
        let mut state = ratatui::widgets::ListState::default();
        if total > 0 {
            state.select(Some(selected_pos_in_visible));
        }
        frame.render_stateful_widget(list, chunks[2], &mut state);
    }

    // Overlay details popup (keeps list visible under it)
    if view.app.details_window {
        let popup_area = centered_rect_sized(60, 9, chunks[2]);
        frame.render_widget(Clear, popup_area);

        let text = match view.catalog.tracks().get(view.app.selected) {
            Some(track) => details_text(view, track),
            None => "No track selected".to_string(),
        };
        let details = Paragraph::new(text)
            .block(padded(" details (K closes) "))
            .wrap(Wrap { trim: true });
        frame.render_widget(details, popup_area);
    }

    let footer = Paragraph::new(controls_text(controls_settings.scrub_seconds))
        .block(padded(" controls "))
        .wrap(Wrap { trim: true });
    frame.render_widget(footer, chunks[3]);
}
