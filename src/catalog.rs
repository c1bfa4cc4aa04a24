//! Track catalog and reciter sources.
//!
//! The catalog is an immutable, position-ordered list of tracks loaded once
//! at startup from a JSON file or URL. Sources describe where the audio for
//! every track lives.

mod load;
mod model;

pub use load::{load_catalog, load_sources};
pub use model::*;

use thiserror::Error;

/// Track list used when `catalog.tracks` is not configured.
pub const DEFAULT_CATALOG_URL: &str = "https://api.alquran.cloud/v1/surah";

#[derive(Debug, Error)]
pub enum CatalogError {
    #[error("failed to read catalog: {0}")]
    Io(#[from] std::io::Error),

    #[error("failed to fetch catalog: {0}")]
    Http(Box<ureq::Error>),

    #[error("failed to parse catalog: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("duplicate track position {0}")]
    DuplicatePosition(u32),

    #[error("expected track position {expected}, found {found}")]
    PositionGap { expected: u32, found: u32 },

    #[error("catalog contains no tracks")]
    Empty,
}
