//! HTTP API handlers for qiraat-ui

pub mod audio;
pub mod cookie;
pub mod health;
pub mod identify;
pub mod playback;
pub mod session;
pub mod ui;

pub use audio::{serve_blob, upload_audio};
pub use health::health_routes;
pub use identify::identify;
pub use playback::{playback_event, toggle_playback};
pub use session::end_session;
pub use ui::{serve_app_js, serve_index};
