use serde::{Deserialize, Serialize};

/// Where a chapter was revealed. Catalogs spell it either way round.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum OriginType {
    #[serde(alias = "meccan", alias = "MECCAN")]
    Meccan,
    #[serde(alias = "medinan", alias = "MEDINAN")]
    Medinan,
}

impl OriginType {
    pub fn label(self) -> &'static str {
        match self {
            Self::Meccan => "Meccan",
            Self::Medinan => "Medinan",
        }
    }
}

/// One playable chapter. Positions in a catalog run from 1 without gaps.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Track {
    #[serde(alias = "number")]
    pub position: u32,
    #[serde(alias = "englishName")]
    pub display_name: String,
    #[serde(alias = "name", default)]
    pub alternate_name: String,
    #[serde(alias = "numberOfAyahs", default)]
    pub ayah_count: u32,
    #[serde(alias = "revelationType")]
    pub origin: OriginType,
}

/// A reciter: every track is available under `base_url`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Source {
    #[serde(alias = "identifier")]
    pub id: String,
    #[serde(alias = "englishName")]
    pub display_name: String,
    #[serde(alias = "name", default)]
    pub alternate_name: String,
    #[serde(alias = "serverUrl")]
    pub base_url: String,
}

impl Source {
    /// Resource locator for `track`: `{base_url}{position:03}.mp3`.
    pub fn locator(&self, track: &Track) -> String {
        format!("{}{:03}.mp3", self.base_url, track.position)
    }

    /// Fallback reciter used when nothing has been selected yet.
    pub fn default_source() -> Self {
        Self {
            id: "mp3quran-123".to_string(),
            display_name: "Mishary Alafasi".to_string(),
            alternate_name: "مشاري العفاسي".to_string(),
            base_url: "https://server8.mp3quran.net/afs/".to_string(),
        }
    }
}

/// Ordered, cyclic list of tracks addressed by position.
#[derive(Debug, Clone, Default)]
pub struct Catalog {
    tracks: Vec<Track>,
}

impl Catalog {
    /// Build a catalog, sorting by position. Positions must be exactly
    /// `1..=len`, which is what next/prev wrap around.
    pub fn new(mut tracks: Vec<Track>) -> Result<Self, super::CatalogError> {
        tracks.sort_by_key(|t| t.position);
        if let Some(w) = tracks.windows(2).find(|w| w[0].position == w[1].position) {
            return Err(super::CatalogError::DuplicatePosition(w[0].position));
        }
        for (expected, track) in (1u32..).zip(&tracks) {
            if track.position != expected {
                return Err(super::CatalogError::PositionGap {
                    expected,
                    found: track.position,
                });
            }
        }
        Ok(Self { tracks })
    }

    pub fn tracks(&self) -> &[Track] {
        &self.tracks
    }

    pub fn len(&self) -> usize {
        self.tracks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tracks.is_empty()
    }

    pub fn find(&self, position: u32) -> Option<&Track> {
        self.tracks
            .binary_search_by_key(&position, |t| t.position)
            .ok()
            .map(|i| &self.tracks[i])
    }

    /// Index of `position` in display order.
    pub fn index_of(&self, position: u32) -> Option<usize> {
        self.tracks
            .binary_search_by_key(&position, |t| t.position)
            .ok()
    }
}
