use serde::Deserialize;

/// Top-level application settings loaded from `config.toml`.
///
/// File format: TOML
/// Default path (Linux/XDG): `$XDG_CONFIG_HOME/tartil/config.toml` or `~/.config/tartil/config.toml`
///
/// Precedence (highest wins):
/// 1) Environment variables (prefix `TARTIL__`, `__` as nested separator)
/// 2) Config file (if present)
/// 3) Struct defaults
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub audio: AudioSettings,
    pub playback: PlaybackSettings,
    pub persistence: PersistenceSettings,
    pub catalog: CatalogSettings,
    pub controls: ControlsSettings,
    pub session: SessionSettings,
    pub ui: UiSettings,
    pub log: LogSettings,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct AudioSettings {
    /// Volume used until the user changes it (0.0 - 1.0).
    pub default_volume: f32,
    /// How often the audio thread reports the playback position (milliseconds).
    pub tick_ms: u64,
}

impl Default for AudioSettings {
    fn default() -> Self {
        Self {
            default_volume: 0.7,
            tick_ms: 250,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct PlaybackSettings {
    /// Start the next track when one ends.
    pub auto_advance: bool,
    /// A track counts as started once it passes this percentage.
    pub started_threshold_percent: u8,
    /// Position steps at or above this many seconds are treated as seeks and
    /// do not count as listening time.
    pub max_listen_delta_seconds: f64,
    /// Give up on a load that produced no metadata after this many seconds.
    pub stall_timeout_seconds: u64,
}

impl Default for PlaybackSettings {
    fn default() -> Self {
        Self {
            auto_advance: true,
            started_threshold_percent: 1,
            max_listen_delta_seconds: 2.0,
            stall_timeout_seconds: 20,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct PersistenceSettings {
    /// Where playback state is kept. Defaults to the XDG data directory.
    pub store_path: Option<String>,
    /// Write the progress map whenever a track crosses a multiple of this percentage.
    pub progress_step_percent: u8,
    /// Write statistics whenever listening time crosses a multiple of this many seconds.
    pub stats_interval_seconds: u64,
}

impl Default for PersistenceSettings {
    fn default() -> Self {
        Self {
            store_path: None,
            progress_step_percent: 5,
            stats_interval_seconds: 10,
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct CatalogSettings {
    /// Track list: a JSON file path, `file://` or `http(s)://` URL.
    pub tracks: Option<String>,
    /// Reciter list, same forms as `tracks`. Optional.
    pub sources: Option<String>,
    /// Source id to use when nothing was selected before.
    pub default_source: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ControlsSettings {
    /// Number of seconds to scrub when pressing `H` / `L`.
    pub scrub_seconds: u64,
    /// Volume change per `+` / `-` press.
    pub volume_step: f32,
    /// Rate change per `<` / `>` press.
    pub rate_step: f32,
}

impl Default for ControlsSettings {
    fn default() -> Self {
        Self {
            scrub_seconds: 10,
            volume_step: 0.05,
            rate_step: 0.25,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct SessionSettings {
    /// Publish now-playing state over MPRIS.
    pub enabled: bool,
    /// Album name shown by desktop media widgets.
    pub album: String,
    /// Artwork URL shown by desktop media widgets.
    pub art_url: Option<String>,
}

impl Default for SessionSettings {
    fn default() -> Self {
        Self {
            enabled: true,
            album: "Holy Quran".to_string(),
            art_url: None,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct UiSettings {
    /// The text rendered inside the top header box.
    pub header_text: String,
    /// Show the alternate (native script) name next to each track.
    pub show_alternate_names: bool,
}

impl Default for UiSettings {
    fn default() -> Self {
        Self {
            header_text: " ~ tartil ~ ".to_string(),
            show_alternate_names: true,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct LogSettings {
    /// `off`, `error`, `warn`, `info`, `debug` or `trace`.
    pub level: String,
    /// Log file. Without one, logging stays off while the TUI owns the terminal.
    pub file: Option<String>,
}

impl Default for LogSettings {
    fn default() -> Self {
        Self {
            level: "warn".to_string(),
            file: None,
        }
    }
}
