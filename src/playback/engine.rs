//! Contract between the controller and whatever actually decodes audio.

use super::error::MediaError;

/// Identifies one `load` request. Events carry the id of the load that
/// produced them so late events from a replaced resource can be dropped.
#[derive(Debug, Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct LoadId(pub u64);

/// Lifecycle events raised by a backend.
#[derive(Debug, Clone, PartialEq)]
pub enum EngineEvent {
    /// Media bytes are still arriving; `received` is the running total.
    Buffering { load: LoadId, received: u64 },
    MetadataReady { load: LoadId, duration: f64 },
    PositionAdvanced { load: LoadId, position: f64 },
    Finished { load: LoadId },
    Failed { load: LoadId, error: MediaError },
}

impl EngineEvent {
    pub fn load(&self) -> LoadId {
        match self {
            Self::Buffering { load, .. }
            | Self::MetadataReady { load, .. }
            | Self::PositionAdvanced { load, .. }
            | Self::Finished { load }
            | Self::Failed { load, .. } => *load,
        }
    }
}

/// Playback primitives. Implementations return immediately; results come
/// back later as `EngineEvent`s.
pub trait MediaBackend {
    /// Replace the current resource with `locator`, starting at `start_at`
    /// seconds. Playback begins once decodable unless `autoplay` is false.
    fn load(&mut self, load: LoadId, locator: &str, start_at: f64, autoplay: bool);
    fn play(&mut self);
    fn pause(&mut self);
    fn seek(&mut self, seconds: f64);
    fn set_volume(&mut self, volume: f32);
    fn set_rate(&mut self, rate: f32);
    /// Drop the current resource.
    fn stop(&mut self);
}
