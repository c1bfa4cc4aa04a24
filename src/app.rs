//! Application module: exposes the front-end model used by the TUI and runtime.
//!
//! The `App` model lives in `app::model` and holds the cursor and front-end
//! flags. Playback state is read from the controller.

mod model;

pub use model::*;
