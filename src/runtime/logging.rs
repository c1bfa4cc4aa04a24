use std::fs::{self, OpenOptions};
use std::path::Path;

use log::LevelFilter;

use crate::config::LogSettings;

/// Parse a configured level, falling back to `warn` for unknown names.
pub fn parse_level(level: &str) -> LevelFilter {
    level.trim().parse().unwrap_or(LevelFilter::Warn)
}

/// Install the logger. The TUI owns the terminal, so records only go to
/// `log.file`; without one nothing is installed and `log` stays silent.
pub fn init_logging(settings: &LogSettings) {
    let Some(file) = settings.file.as_deref() else {
        return;
    };

    let path = Path::new(file);
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        let _ = fs::create_dir_all(parent);
    }
    let target = match OpenOptions::new().create(true).append(true).open(path) {
        Ok(f) => f,
        Err(e) => {
            eprintln!("tartil: cannot open log file {file}: {e}");
            return;
        }
    };

    let mut clog = colog::default_builder();
    clog.filter(None, parse_level(&settings.level));
    clog.target(env_logger::Target::Pipe(Box::new(target)));
    clog.write_style(env_logger::WriteStyle::Never);
    if let Err(e) = clog.try_init() {
        eprintln!("tartil: logger already initialized: {e}");
        return;
    }

    std::panic::set_hook(Box::new(|panic_info| {
        let current_thread = std::thread::current();
        let thread_name = current_thread.name().unwrap_or("unnamed");
        log::error!("panic in thread '{}': {}", thread_name, panic_info);
    }));
}
