use std::fs;
use std::path::Path;
use std::time::Duration;

use serde::Deserialize;
use serde::de::DeserializeOwned;

use super::CatalogError;
use super::model::{Catalog, Source, Track};

#[derive(Deserialize)]
#[serde(untagged)]
enum TrackDocument {
    List(Vec<Track>),
    Wrapped { surahs: Vec<Track> },
    /// `{"code": 200, "status": "OK", "data": [...]}` as served by alquran.cloud.
    Envelope { data: Vec<Track> },
}

#[derive(Deserialize)]
#[serde(untagged)]
enum SourceDocument {
    List(Vec<Source>),
    Wrapped { sources: Vec<Source> },
}

fn is_remote(location: &str) -> bool {
    location.starts_with("http://") || location.starts_with("https://")
}

fn agent() -> ureq::Agent {
    ureq::AgentBuilder::new()
        .timeout_connect(Duration::from_secs(5))
        .timeout_read(Duration::from_secs(15))
        .build()
}

/// Read a JSON document from a local path or an `http(s)` URL.
fn fetch_json<T: DeserializeOwned>(location: &str) -> Result<T, CatalogError> {
    if is_remote(location) {
        log::debug!("fetching {location}");
        let response = agent()
            .get(location)
            .call()
            .map_err(|e| CatalogError::Http(Box::new(e)))?;
        return response.into_json::<T>().map_err(CatalogError::Io);
    }

    let path = location.strip_prefix("file://").unwrap_or(location);
    let raw = fs::read_to_string(Path::new(path))?;
    Ok(serde_json::from_str(&raw)?)
}

/// Load the track list. An empty list is an error: nothing could ever play.
pub fn load_catalog(location: &str) -> Result<Catalog, CatalogError> {
    let tracks = match fetch_json::<TrackDocument>(location)? {
        TrackDocument::List(t)
        | TrackDocument::Wrapped { surahs: t }
        | TrackDocument::Envelope { data: t } => t,
    };
    if tracks.is_empty() {
        return Err(CatalogError::Empty);
    }
    let catalog = Catalog::new(tracks)?;
    log::info!("loaded {} tracks from {location}", catalog.len());
    Ok(catalog)
}

/// Load the reciter list. The default source is always available, first
/// in the list when the document does not already carry it.
pub fn load_sources(location: Option<&str>) -> Result<Vec<Source>, CatalogError> {
    let mut sources = match location {
        Some(loc) => match fetch_json::<SourceDocument>(loc)? {
            SourceDocument::List(s) | SourceDocument::Wrapped { sources: s } => s,
        },
        None => Vec::new(),
    };

    let fallback = Source::default_source();
    if !sources.iter().any(|s| s.id == fallback.id) {
        sources.insert(0, fallback);
    }
    Ok(sources)
}
