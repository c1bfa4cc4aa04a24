use std::sync::mpsc;
use std::time::Duration;

use crossterm::execute;
use crossterm::terminal::{EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode};
use ratatui::{Terminal, backend::CrosstermBackend};

use crate::app::App;
use crate::audio::AudioPlayer;
use crate::catalog::Catalog;
use crate::mpris::ControlCmd;
use crate::playback::Controller;
use crate::store::KeyValueStore;

mod event_loop;
mod logging;
mod settings;
mod startup;

/// The controller as wired up for the terminal front-end.
pub type Player = Controller<AudioPlayer, Box<dyn KeyValueStore>>;

pub fn run() -> Result<(), Box<dyn std::error::Error>> {
    let settings = settings::load_settings();
    logging::init_logging(&settings.log);

    let mut app = App::new();
    let catalog = match startup::load_catalog(&settings) {
        Ok(c) => c,
        Err(e) => {
            log::warn!("catalog unavailable: {e}");
            app.catalog_error = Some(e.to_string());
            Catalog::default()
        }
    };
    let sources = startup::load_sources(&settings);
    let store = startup::open_store(&settings);

    let backend = AudioPlayer::new(Duration::from_millis(settings.audio.tick_ms));
    let mut player = Controller::new(
        catalog,
        sources,
        backend,
        store,
        startup::playback_policy(&settings),
    );
    player.restore();

    let (control_tx, control_rx) = mpsc::channel::<ControlCmd>();
    let mpris = settings
        .session
        .enabled
        .then(|| crate::mpris::spawn_mpris(control_tx.clone()));

    enable_raw_mode()?;
    let mut stdout = std::io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let run_result: Result<(), Box<dyn std::error::Error>> = (|| {
        let mut state = event_loop::EventLoopState::new(&settings);

        event_loop::run(
            &mut terminal,
            &settings,
            &mut app,
            &mut player,
            mpris.as_ref(),
            &control_tx,
            &control_rx,
            &mut state,
        )
    })();

    player.shutdown();

    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    run_result
}
