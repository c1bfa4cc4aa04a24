use std::{env, path::PathBuf};

use super::schema::Settings;

/// Configuration loading helpers.
///
/// `Settings::load` tries environment variables first (prefix `TARTIL__`), then an
/// optional config file and falls back to struct defaults.
impl Settings {
    /// Load settings from environment and optional config file.
    pub fn load() -> Result<Self, ::config::ConfigError> {
        let config_path = resolve_config_path();

        let mut builder = ::config::Config::builder();

        if let Some(path) = &config_path {
            builder = builder.add_source(::config::File::from(path.as_path()).required(false));
        }

        builder = builder.add_source(
            ::config::Environment::with_prefix("TARTIL")
                .separator("__")
                .try_parsing(true),
        );

        let cfg = builder.build()?;
        let settings: Settings = cfg.try_deserialize()?;
        Ok(settings)
    }

    /// Perform basic validation checks on loaded settings.
    pub fn validate(&self) -> Result<(), String> {
        if !(0.0..=1.0).contains(&self.audio.default_volume) {
            return Err("audio.default_volume must be within 0.0..=1.0".to_string());
        }
        if self.audio.tick_ms == 0 {
            return Err("audio.tick_ms must be >= 1".to_string());
        }
        let step = self.persistence.progress_step_percent;
        if step == 0 || step > 100 {
            return Err("persistence.progress_step_percent must be within 1..=100".to_string());
        }
        if self.persistence.stats_interval_seconds == 0 {
            return Err("persistence.stats_interval_seconds must be >= 1".to_string());
        }
        if self.playback.started_threshold_percent >= 100 {
            return Err("playback.started_threshold_percent must be < 100".to_string());
        }
        if !(self.playback.max_listen_delta_seconds > 0.0) {
            return Err("playback.max_listen_delta_seconds must be > 0".to_string());
        }
        if self.playback.stall_timeout_seconds == 0 {
            return Err("playback.stall_timeout_seconds must be >= 1".to_string());
        }
        if !(self.controls.volume_step > 0.0 && self.controls.volume_step <= 1.0) {
            return Err("controls.volume_step must be within (0.0, 1.0]".to_string());
        }
        if !(self.controls.rate_step > 0.0) {
            return Err("controls.rate_step must be > 0".to_string());
        }
        Ok(())
    }

    /// The state file, either configured or under the XDG data directory.
    pub fn store_path(&self) -> Option<PathBuf> {
        match &self.persistence.store_path {
            Some(p) => expand_home(p),
            None => default_store_path(),
        }
    }
}

/// Expand a leading `~` to `$HOME`. `None` when it is needed but unset.
pub fn expand_home(path: &str) -> Option<PathBuf> {
    let rest = match path.strip_prefix('~') {
        Some(rest) if rest.is_empty() || rest.starts_with('/') => rest.trim_start_matches('/'),
        _ => return Some(PathBuf::from(path)),
    };
    let home = PathBuf::from(env::var_os("HOME")?);
    Some(if rest.is_empty() { home } else { home.join(rest) })
}

/// Resolve the config path from `TARTIL_CONFIG_PATH` or XDG defaults.
pub fn resolve_config_path() -> Option<PathBuf> {
    if let Some(p) = env::var_os("TARTIL_CONFIG_PATH") {
        return Some(PathBuf::from(p));
    }
    default_config_path()
}

/// Compute the default config path under `$XDG_CONFIG_HOME/tartil/config.toml`
/// or `~/.config/tartil/config.toml` when `XDG_CONFIG_HOME` is not set.
pub fn default_config_path() -> Option<PathBuf> {
    xdg_dir("XDG_CONFIG_HOME", ".config").map(|d| d.join("tartil").join("config.toml"))
}

/// `$XDG_DATA_HOME/tartil/state.json` or `~/.local/share/tartil/state.json`.
pub fn default_store_path() -> Option<PathBuf> {
    xdg_dir("XDG_DATA_HOME", ".local/share").map(|d| d.join("tartil").join("state.json"))
}

fn xdg_dir(var: &str, home_fallback: &str) -> Option<PathBuf> {
    if let Some(xdg) = env::var_os(var) {
        Some(PathBuf::from(xdg))
    } else {
        env::var_os("HOME").map(|home| PathBuf::from(home).join(home_fallback))
    }
}
