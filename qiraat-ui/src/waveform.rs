//! Waveform renderer binding
//!
//! The renderer itself lives outside this crate (in the web build it is the
//! browser-side wavesurfer instance). [`WaveformBinding`] owns one renderer
//! for the lifetime of a session: it is mounted once, reloaded when the
//! active audio URL changes, and destroyed exactly once on unmount or drop.
//! Renderer playback events update a single [`PlaybackState`].

use serde::Serialize;
use tracing::debug;

/// Playback state reported by the renderer
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum PlaybackState {
    #[default]
    Stopped,
    Playing,
}

/// Operations the session drives on a waveform renderer
pub trait WaveformRenderer {
    /// Display the waveform of the audio at `url`
    fn load(&mut self, url: &str);

    /// Invert the current playback state
    fn play_pause(&mut self);

    /// Release the renderer; no further calls follow
    fn destroy(&mut self);
}

/// Session-scoped owner of a waveform renderer
#[derive(Debug)]
pub struct WaveformBinding<R: WaveformRenderer> {
    renderer: Option<R>,
    state: PlaybackState,
    loaded_url: Option<String>,
}

impl<R: WaveformRenderer> WaveformBinding<R> {
    /// Take ownership of a freshly created renderer
    pub fn mount(renderer: R) -> Self {
        Self {
            renderer: Some(renderer),
            state: PlaybackState::Stopped,
            loaded_url: None,
        }
    }

    /// Point the renderer at `url` unless it already shows it
    pub fn load(&mut self, url: &str) {
        let Some(renderer) = self.renderer.as_mut() else {
            return;
        };
        if self.loaded_url.as_deref() == Some(url) {
            return;
        }
        debug!("Waveform loading {}", url);
        renderer.load(url);
        self.loaded_url = Some(url.to_string());
        // Loading new audio stops playback of the old one
        self.state = PlaybackState::Stopped;
    }

    /// Ask the renderer to invert playback. Returns false once unmounted.
    pub fn toggle(&mut self) -> bool {
        match self.renderer.as_mut() {
            Some(renderer) => {
                renderer.play_pause();
                true
            }
            None => false,
        }
    }

    pub fn on_play(&mut self) {
        self.set_state(PlaybackState::Playing);
    }

    pub fn on_pause(&mut self) {
        self.set_state(PlaybackState::Stopped);
    }

    pub fn on_finish(&mut self) {
        self.set_state(PlaybackState::Stopped);
    }

    fn set_state(&mut self, state: PlaybackState) {
        // Events arriving after teardown are stale
        if self.renderer.is_some() {
            self.state = state;
        }
    }

    pub fn state(&self) -> PlaybackState {
        self.state
    }

    pub fn is_playing(&self) -> bool {
        self.state == PlaybackState::Playing
    }

    pub fn loaded_url(&self) -> Option<&str> {
        self.loaded_url.as_deref()
    }

    pub fn is_mounted(&self) -> bool {
        self.renderer.is_some()
    }

    pub fn renderer_mut(&mut self) -> Option<&mut R> {
        self.renderer.as_mut()
    }

    /// Destroy the renderer and clear the reference. Idempotent.
    ///
    /// Returns the destroyed renderer on the first call so callers can
    /// collect anything it still has to report.
    pub fn unmount(&mut self) -> Option<R> {
        self.state = PlaybackState::Stopped;
        self.loaded_url = None;
        let mut renderer = self.renderer.take()?;
        debug!("Waveform renderer destroyed");
        renderer.destroy();
        Some(renderer)
    }
}

impl<R: WaveformRenderer> Drop for WaveformBinding<R> {
    fn drop(&mut self) {
        let _ = self.unmount();
    }
}

/// Command forwarded to the browser-side renderer
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "command", rename_all = "snake_case")]
pub enum RendererCommand {
    Load { url: String },
    PlayPause,
    Destroy,
}

/// Renderer proxy for the analyzer page
///
/// Queues commands until the page script drains them.
#[derive(Debug, Default)]
pub struct PageWaveform {
    pending: Vec<RendererCommand>,
}

impl PageWaveform {
    pub fn new() -> Self {
        Self::default()
    }

    /// Take all queued commands, oldest first
    pub fn drain(&mut self) -> Vec<RendererCommand> {
        std::mem::take(&mut self.pending)
    }

    pub fn pending(&self) -> &[RendererCommand] {
        &self.pending
    }
}

impl WaveformRenderer for PageWaveform {
    fn load(&mut self, url: &str) {
        self.pending.push(RendererCommand::Load {
            url: url.to_string(),
        });
    }

    fn play_pause(&mut self) {
        self.pending.push(RendererCommand::PlayPause);
    }

    fn destroy(&mut self) {
        self.pending.clear();
        self.pending.push(RendererCommand::Destroy);
    }
}
