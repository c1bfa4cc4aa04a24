//! Now-playing integration with the desktop (media keys, lock screens).
//!
//! A `MediaSession` only receives state; commands flow back through the
//! runtime as `ControlCmd`s. Running without one changes nothing.

use super::controller::PlaybackState;
use super::phase::Phase;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NowPlaying {
    pub track_position: u32,
    pub title: String,
    pub artist: String,
    pub album: String,
    pub art_url: Option<String>,
}

#[derive(Debug, Copy, Clone, PartialEq, Eq, Default)]
pub enum SessionStatus {
    #[default]
    Stopped,
    Playing,
    Paused,
}

pub trait MediaSession {
    fn set_now_playing(&self, now: Option<&NowPlaying>);
    fn set_status(&self, status: SessionStatus);
    fn set_position(&self, position: f64, duration: f64, rate: f32);
}

/// Pushes controller state to a session, sending metadata and status only
/// when they change.
#[derive(Debug, Default)]
pub struct SessionSync {
    album: String,
    art_url: Option<String>,
    last_now_playing: Option<NowPlaying>,
    last_status: Option<SessionStatus>,
}

impl SessionSync {
    pub fn new(album: impl Into<String>, art_url: Option<String>) -> Self {
        Self {
            album: album.into(),
            art_url,
            last_now_playing: None,
            last_status: None,
        }
    }

    pub fn now_playing(&self, state: &PlaybackState) -> Option<NowPlaying> {
        let track = state.active_track.as_ref()?;
        Some(NowPlaying {
            track_position: track.position,
            title: track.display_name.clone(),
            artist: state
                .active_source
                .as_ref()
                .map(|s| s.display_name.clone())
                .unwrap_or_default(),
            album: self.album.clone(),
            art_url: self.art_url.clone(),
        })
    }

    pub fn status(state: &PlaybackState) -> SessionStatus {
        match state.phase {
            Phase::Idle | Phase::Finished => SessionStatus::Stopped,
            _ if state.is_playing => SessionStatus::Playing,
            _ => SessionStatus::Paused,
        }
    }

    pub fn sync(&mut self, session: &dyn MediaSession, state: &PlaybackState) {
        let now = self.now_playing(state);
        if now != self.last_now_playing {
            session.set_now_playing(now.as_ref());
            self.last_now_playing = now;
        }

        let status = Self::status(state);
        if Some(status) != self.last_status {
            session.set_status(status);
            self.last_status = Some(status);
        }

        if state.duration_seconds > 0.0 {
            session.set_position(state.position_seconds, state.duration_seconds, state.rate);
        }
    }
}
