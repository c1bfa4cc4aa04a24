use std::sync::mpsc;
use std::time::{Duration, Instant};

use crossterm::event::{self, Event, KeyCode, KeyEvent, KeyEventKind};
use ratatui::{Terminal, backend::CrosstermBackend};

use crate::app::App;
use crate::config;
use crate::mpris::{ControlCmd, MprisHandle};
use crate::playback::{Controller, MediaBackend, Phase, PlaybackError, SessionSync};
use crate::store::KeyValueStore;
use crate::ui;

use super::{Player, startup};

/// State tracked by the runtime event loop across iterations.
pub struct EventLoopState {
    /// Change tracking for the MPRIS bridge.
    pub session: SessionSync,
    /// Last active track the cursor was moved to.
    last_followed: Option<u32>,
}

impl EventLoopState {
    pub fn new(settings: &config::Settings) -> Self {
        Self {
            session: SessionSync::new(
                settings.session.album.clone(),
                settings.session.art_url.clone(),
            ),
            last_followed: None,
        }
    }
}

/// Main terminal event loop: feeds backend events to the controller, handles
/// input, draws the UI and keeps MPRIS in sync. Returns `Ok(())` when
/// shutdown is requested.
pub fn run(
    terminal: &mut Terminal<CrosstermBackend<std::io::Stdout>>,
    settings: &config::Settings,
    app: &mut App,
    player: &mut Player,
    mpris: Option<&MprisHandle>,
    control_tx: &mpsc::Sender<ControlCmd>,
    control_rx: &mpsc::Receiver<ControlCmd>,
    state: &mut EventLoopState,
) -> Result<(), Box<dyn std::error::Error>> {
    loop {
        for ev in player.backend().drain_events() {
            player.handle_event(ev);
        }
        player.tick(Instant::now());

        // Move the cursor only when the active track changes, so free-roaming
        // with j/k is not undone on every frame.
        let active = player.state().active_track.as_ref().map(|t| t.position);
        if active != state.last_followed {
            app.follow(player.catalog(), active);
            state.last_followed = active;
        }

        if let Some(m) = mpris {
            state.session.sync(m, player.state());
        }

        let view = ui::View {
            app,
            state: player.state(),
            catalog: player.catalog(),
            progress: player.progress(),
            statistics: player.statistics(),
            bookmarks: player.bookmarks(),
        };
        terminal.draw(|f| ui::draw(f, &view, &settings.ui, &settings.controls))?;

        while let Ok(cmd) = control_rx.try_recv() {
            if handle_control_cmd(cmd, app, player) {
                return Ok(());
            }
        }

        if event::poll(Duration::from_millis(50))? {
            if let Event::Key(key) = event::read()? {
                if key.kind != KeyEventKind::Press {
                    continue;
                }
                if handle_key_event(key, settings, app, player, control_tx) {
                    break;
                }
            }
        }
    }

    Ok(())
}

fn report(app: &mut App, result: Result<(), PlaybackError>) {
    if let Err(e) = result {
        log::info!("command rejected: {e}");
        app.set_message(e.to_string());
    }
}

/// Start something when nothing is loaded: the active track if there is one,
/// otherwise the selected one.
fn start_playback<B: MediaBackend, S: KeyValueStore>(
    app: &mut App,
    player: &mut Controller<B, S>,
) {
    let target = player
        .state()
        .active_track
        .as_ref()
        .map(|t| t.position)
        .or_else(|| app.selected_position(player.catalog()));
    match target {
        Some(position) => {
            app.follow_playback = true;
            let result = player.load_and_play(position);
            report(app, result);
        }
        None => app.set_message("nothing to play"),
    }
}

pub(super) fn handle_control_cmd<B: MediaBackend, S: KeyValueStore>(
    cmd: ControlCmd,
    app: &mut App,
    player: &mut Controller<B, S>,
) -> bool {
    match cmd {
        ControlCmd::Quit => return true,
        ControlCmd::Play => {
            if player.state().phase == Phase::Idle {
                start_playback(app, player);
            } else {
                player.play();
            }
        }
        ControlCmd::Pause => player.pause(),
        ControlCmd::PlayPause => {
            if player.state().phase == Phase::Idle {
                start_playback(app, player);
            } else {
                player.toggle_play();
            }
        }
        ControlCmd::Stop => player.stop(),
        ControlCmd::Next => {
            app.follow_playback = true;
            let result = player.next();
            report(app, result);
        }
        ControlCmd::Prev => {
            app.follow_playback = true;
            let result = player.prev();
            report(app, result);
        }
        ControlCmd::SeekTo(seconds) => {
            let duration = player.state().duration_seconds;
            let mut target = seconds.max(0.0);
            if duration > 0.0 {
                target = target.min(duration);
            }
            player.seek(target);
        }
        ControlCmd::SeekBy(delta) => player.seek_by(delta),
    }
    false
}

fn retry_catalog(settings: &config::Settings, app: &mut App, player: &mut Player) {
    match startup::load_catalog(settings) {
        Ok(catalog) => {
            player.set_catalog(catalog);
            app.catalog_error = None;
            app.selected = 0;
            player.restore();
        }
        Err(e) => {
            log::warn!("catalog retry failed: {e}");
            app.catalog_error = Some(e.to_string());
        }
    }
}

/// Returns true when the user asked to quit.
fn handle_key_event(
    key: KeyEvent,
    settings: &config::Settings,
    app: &mut App,
    player: &mut Player,
    control_tx: &mpsc::Sender<ControlCmd>,
) -> bool {
    let len = player.catalog().len();
    if key.code != KeyCode::Char('g') {
        app.pending_gg = false;
    }
    app.clear_message();

    match key.code {
        KeyCode::Char('q') => return true,
        KeyCode::Char('j') | KeyCode::Down => {
            app.follow_playback = false;
            app.next(len);
        }
        KeyCode::Char('k') | KeyCode::Up => {
            app.follow_playback = false;
            app.prev(len);
        }
        KeyCode::Char('g') => {
            if app.press_g() {
                app.follow_playback = false;
                app.first();
            }
        }
        KeyCode::Char('G') => {
            app.follow_playback = false;
            app.last(len);
        }
        KeyCode::Enter => match app.selected_position(player.catalog()) {
            Some(position) => {
                app.follow_playback = true;
                let result = player.load_and_play(position);
                report(app, result);
            }
            None => app.set_message("nothing selected"),
        },
        // Behave like MPRIS PlayPause / Next / Previous.
        KeyCode::Char(' ') | KeyCode::Char('p') => {
            let _ = control_tx.send(ControlCmd::PlayPause);
        }
        KeyCode::Char('l') => {
            let _ = control_tx.send(ControlCmd::Next);
        }
        KeyCode::Char('h') => {
            let _ = control_tx.send(ControlCmd::Prev);
        }
        KeyCode::Char('L') => player.seek_by(settings.controls.scrub_seconds as f64),
        KeyCode::Char('H') => player.seek_by(-(settings.controls.scrub_seconds as f64)),
        KeyCode::Char('+') | KeyCode::Char('=') => {
            let volume = player.state().volume + settings.controls.volume_step;
            player.set_volume(volume);
        }
        KeyCode::Char('-') => {
            let volume = player.state().volume - settings.controls.volume_step;
            player.set_volume(volume);
        }
        KeyCode::Char('>') | KeyCode::Char('.') => {
            let rate = player.state().rate + settings.controls.rate_step;
            let result = player.set_rate(rate);
            report(app, result);
        }
        KeyCode::Char('<') | KeyCode::Char(',') => {
            let rate = player.state().rate - settings.controls.rate_step;
            let result = player.set_rate(rate);
            report(app, result);
        }
        KeyCode::Char('s') => {
            player.cycle_source();
            if let Some(source) = &player.state().active_source {
                app.set_message(format!("Reciter: {}", source.display_name));
            }
        }
        KeyCode::Char('b') => {
            if let Some(position) = app.selected_position(player.catalog()) {
                let marked = player.toggle_bookmark(position);
                app.set_message(if marked {
                    format!("Bookmarked {position}")
                } else {
                    format!("Removed bookmark {position}")
                });
            }
        }
        KeyCode::Char('K') => app.toggle_details_window(),
        KeyCode::Char('R') => {
            if app.catalog_error.is_some() || player.catalog().is_empty() {
                retry_catalog(settings, app, player);
            }
        }
        _ => {}
    }
    false
}
