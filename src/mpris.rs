//! MPRIS bridge: publishes now-playing state on the session bus and turns
//! media-key / `playerctl` calls into `ControlCmd`s.

use std::collections::HashMap;
use std::sync::mpsc::{self, Receiver, Sender};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_io::{Timer, block_on};
use zbus::object_server::InterfaceRef;
use zbus::{Connection, interface};
use zvariant::{ObjectPath, OwnedObjectPath, OwnedValue, Value};

use crate::playback::{MediaSession, NowPlaying, SessionStatus};

const OBJECT_PATH: &str = "/org/mpris/MediaPlayer2";
const BUS_NAME: &str = "org.mpris.MediaPlayer2.tartil";

#[derive(Clone, Debug, PartialEq)]
pub enum ControlCmd {
    Quit,
    Play,
    Pause,
    PlayPause,
    Stop,
    Next,
    Prev,
    /// Absolute position in seconds.
    SeekTo(f64),
    /// Relative offset in seconds.
    SeekBy(f64),
}

#[derive(Debug, Default)]
struct SharedState {
    status: SessionStatus,
    track_id: Option<OwnedObjectPath>,
    title: Option<String>,
    artist: Option<String>,
    album: Option<String>,
    art_url: Option<String>,
    length_micros: Option<i64>,
    position_micros: i64,
    rate: f64,
}

/// Writer side of the bridge, held by the runtime.
pub struct MprisHandle {
    state: Arc<Mutex<SharedState>>,
    notify: Sender<()>,
}

fn micros(seconds: f64) -> i64 {
    (seconds.max(0.0) * 1_000_000.0) as i64
}

fn track_path(position: u32) -> Option<OwnedObjectPath> {
    ObjectPath::try_from(format!("{OBJECT_PATH}/track/{position}"))
        .ok()
        .map(OwnedObjectPath::from)
}

impl MediaSession for MprisHandle {
    fn set_now_playing(&self, now: Option<&NowPlaying>) {
        if let Ok(mut s) = self.state.lock() {
            match now {
                Some(n) => {
                    s.track_id = track_path(n.track_position);
                    s.title = Some(n.title.clone());
                    s.artist = Some(n.artist.clone()).filter(|a| !a.is_empty());
                    s.album = Some(n.album.clone()).filter(|a| !a.is_empty());
                    s.art_url = n.art_url.clone();
                }
                None => {
                    s.track_id = None;
                    s.title = None;
                    s.artist = None;
                    s.album = None;
                    s.art_url = None;
                    s.length_micros = None;
                    s.position_micros = 0;
                }
            }
        }
        let _ = self.notify.send(());
    }

    fn set_status(&self, status: SessionStatus) {
        if let Ok(mut s) = self.state.lock() {
            s.status = status;
        }
        let _ = self.notify.send(());
    }

    fn set_position(&self, position: f64, duration: f64, rate: f32) {
        if let Ok(mut s) = self.state.lock() {
            let length = micros(duration);
            let length_changed = s.length_micros != Some(length);
            s.length_micros = Some(length);
            s.position_micros = micros(position);
            s.rate = f64::from(rate);
            if !length_changed {
                return;
            }
        }
        // Position is polled by clients; only a new length warrants a signal.
        let _ = self.notify.send(());
    }
}

struct RootIface {
    tx: Sender<ControlCmd>,
}

#[interface(name = "org.mpris.MediaPlayer2")]
impl RootIface {
    fn raise(&self) {
        // No-op for TUI.
    }

    fn quit(&self) {
        let _ = self.tx.send(ControlCmd::Quit);
    }

    #[zbus(property)]
    fn can_quit(&self) -> bool {
        true
    }

    #[zbus(property)]
    fn can_raise(&self) -> bool {
        false
    }

    #[zbus(property)]
    fn has_track_list(&self) -> bool {
        false
    }

    #[zbus(property)]
    fn identity(&self) -> &str {
        "tartil"
    }

    #[zbus(property)]
    fn supported_uri_schemes(&self) -> Vec<String> {
        vec![]
    }

    #[zbus(property)]
    fn supported_mime_types(&self) -> Vec<String> {
        vec![]
    }
}

struct PlayerIface {
    tx: Sender<ControlCmd>,
    state: Arc<Mutex<SharedState>>,
}

#[interface(name = "org.mpris.MediaPlayer2.Player")]
impl PlayerIface {
    fn next(&self) {
        let _ = self.tx.send(ControlCmd::Next);
    }

    fn previous(&self) {
        let _ = self.tx.send(ControlCmd::Prev);
    }

    fn play(&self) {
        let _ = self.tx.send(ControlCmd::Play);
    }

    fn pause(&self) {
        let _ = self.tx.send(ControlCmd::Pause);
    }

    fn play_pause(&self) {
        let _ = self.tx.send(ControlCmd::PlayPause);
    }

    fn stop(&self) {
        let _ = self.tx.send(ControlCmd::Stop);
    }

    /// `offset` is in microseconds.
    fn seek(&self, offset: i64) {
        let _ = self.tx.send(ControlCmd::SeekBy(offset as f64 / 1_000_000.0));
    }

    fn set_position(&self, track_id: OwnedObjectPath, position: i64) {
        let current = self.state.lock().ok().and_then(|s| s.track_id.clone());
        // Requests for a track that is no longer current are ignored.
        if current.as_ref() != Some(&track_id) || position < 0 {
            return;
        }
        let _ = self
            .tx
            .send(ControlCmd::SeekTo(position as f64 / 1_000_000.0));
    }

    #[zbus(property)]
    fn playback_status(&self) -> &str {
        let Ok(s) = self.state.lock() else {
            return "Stopped";
        };
        match s.status {
            SessionStatus::Stopped => "Stopped",
            SessionStatus::Playing => "Playing",
            SessionStatus::Paused => "Paused",
        }
    }

    #[zbus(property)]
    fn position(&self) -> i64 {
        self.state.lock().map(|s| s.position_micros).unwrap_or(0)
    }

    #[zbus(property)]
    fn rate(&self) -> f64 {
        self.state
            .lock()
            .ok()
            .map(|s| s.rate)
            .filter(|r| *r > 0.0)
            .unwrap_or(1.0)
    }

    #[zbus(property)]
    fn can_control(&self) -> bool {
        true
    }

    #[zbus(property)]
    fn can_play(&self) -> bool {
        true
    }

    #[zbus(property)]
    fn can_pause(&self) -> bool {
        true
    }

    #[zbus(property)]
    fn can_seek(&self) -> bool {
        true
    }

    #[zbus(property)]
    fn can_go_next(&self) -> bool {
        true
    }

    #[zbus(property)]
    fn can_go_previous(&self) -> bool {
        true
    }

    #[zbus(property)]
    fn metadata(&self) -> HashMap<String, OwnedValue> {
        let mut map = HashMap::new();
        let Ok(s) = self.state.lock() else {
            return map;
        };

        let mut put = |key: &str, value: Value<'_>| {
            if let Ok(v) = OwnedValue::try_from(value) {
                map.insert(key.to_string(), v);
            }
        };

        if let Some(id) = &s.track_id {
            put("mpris:trackid", Value::from(id.clone().into_inner()));
        }
        if let Some(t) = &s.title {
            put("xesam:title", Value::from(t.clone()));
        }
        if let Some(a) = &s.artist {
            put("xesam:artist", Value::from(vec![a.clone()]));
        }
        if let Some(a) = &s.album {
            put("xesam:album", Value::from(a.clone()));
        }
        if let Some(u) = &s.art_url {
            put("mpris:artUrl", Value::from(u.clone()));
        }
        if let Some(l) = s.length_micros {
            put("mpris:length", Value::from(l));
        }
        map
    }
}

async fn emit_changes(player: &InterfaceRef<PlayerIface>) {
    let iface = player.get().await;
    let emitter = player.signal_emitter();
    if let Err(e) = iface.playback_status_changed(emitter).await {
        log::debug!("MPRIS: PlaybackStatus signal failed: {e}");
    }
    if let Err(e) = iface.metadata_changed(emitter).await {
        log::debug!("MPRIS: Metadata signal failed: {e}");
    }
}

async fn serve(
    tx: Sender<ControlCmd>,
    state: Arc<Mutex<SharedState>>,
    notify: Receiver<()>,
) -> zbus::Result<()> {
    let connection = Connection::session().await?;
    connection.request_name(BUS_NAME).await?;

    let object_server = connection.object_server();
    object_server
        .at(OBJECT_PATH, RootIface { tx: tx.clone() })
        .await?;
    object_server
        .at(OBJECT_PATH, PlayerIface { tx, state })
        .await?;
    let player = object_server
        .interface::<_, PlayerIface>(OBJECT_PATH)
        .await?;

    loop {
        Timer::after(Duration::from_millis(200)).await;
        if notify.try_iter().count() > 0 {
            emit_changes(&player).await;
        }
    }
}

/// Start the bridge on its own thread. Without a session bus the handle still
/// works; updates simply go nowhere.
pub fn spawn_mpris(tx: Sender<ControlCmd>) -> MprisHandle {
    let state = Arc::new(Mutex::new(SharedState::default()));
    let (notify, notify_rx) = mpsc::channel::<()>();

    let state_for_thread = state.clone();
    std::thread::spawn(move || {
        if let Err(e) = block_on(serve(tx, state_for_thread, notify_rx)) {
            log::warn!("MPRIS unavailable: {e}");
        }
    });

    MprisHandle { state, notify }
}
