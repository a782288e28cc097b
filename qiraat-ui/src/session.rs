//! Analyzer sessions
//!
//! One [`AnalyzerSession`] holds everything a browser session owns: the
//! active audio, the displayed outcome, the bounded history, the busy flag
//! and the waveform binding. [`SessionStore`] keys sessions by cookie id.
//!
//! Identification is split in two steps so the store lock is not held while
//! the classification request is in flight: [`AnalyzerSession::begin_identify`]
//! marks the session busy and snapshots the audio, and
//! [`AnalyzerSession::finish_identify`] records the outcome.

use qiraat_common::{History, OutcomeRecord};
use std::collections::HashMap;
use std::sync::Arc;
use std::time::{Duration, Instant};
use thiserror::Error;
use tokio::sync::RwLock;
use tracing::{error, info, warn};
use uuid::Uuid;

use crate::capture::{AudioPayload, AudioSource, ObjectUrlStore, RawAudio};
use crate::client::{ClassificationClient, GENERIC_ERROR_MESSAGE};
use crate::waveform::{PageWaveform, PlaybackState, RendererCommand, WaveformBinding, WaveformRenderer};

/// Prompt shown when identification is requested without audio
pub const NO_AUDIO_PROMPT: &str = "Silakan unggah audio terlebih dahulu.";

/// Session-level errors
#[derive(Debug, Error, PartialEq, Eq)]
pub enum SessionError {
    /// No audio loaded; nothing was sent
    #[error("{}", NO_AUDIO_PROMPT)]
    NoAudio,

    /// An identification is already in flight for this session
    #[error("Identification already in progress")]
    Busy,

    /// Session id is not (or no longer) known
    #[error("Unknown session")]
    UnknownSession,
}

/// Renderer playback signal reported by the page
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlaybackSignal {
    Play,
    Pause,
    Finish,
}

impl std::str::FromStr for PlaybackSignal {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "play" => Ok(PlaybackSignal::Play),
            "pause" => Ok(PlaybackSignal::Pause),
            "finish" => Ok(PlaybackSignal::Finish),
            other => Err(format!("Unknown playback signal: {}", other)),
        }
    }
}

/// State owned by one browser session
#[derive(Debug)]
pub struct AnalyzerSession<R: WaveformRenderer = PageWaveform> {
    audio: Option<AudioSource>,
    outcome: Option<OutcomeRecord>,
    history: History,
    busy: bool,
    waveform: WaveformBinding<R>,
    blobs: Arc<ObjectUrlStore>,
    last_seen: Instant,
}

impl<R: WaveformRenderer> AnalyzerSession<R> {
    /// Create a session and mount its renderer
    pub fn new(blobs: Arc<ObjectUrlStore>, renderer: R) -> Self {
        Self {
            audio: None,
            outcome: None,
            history: History::new(),
            busy: false,
            waveform: WaveformBinding::mount(renderer),
            blobs,
            last_seen: Instant::now(),
        }
    }

    /// Replace the active audio.
    ///
    /// `None` is a no-op. Otherwise the previous playable URL is released,
    /// the displayed outcome is cleared and the renderer is pointed at the
    /// new URL. History is kept.
    pub fn submit_audio(&mut self, raw: Option<RawAudio>) -> Option<&AudioSource> {
        let raw = raw?;

        // Release the old URL before allocating the new one
        self.audio = None;
        self.outcome = None;

        let source = AudioSource::register(raw, &self.blobs);
        self.waveform.load(&source.url());
        info!(
            name = source.file_name().unwrap_or("(rekaman)"),
            bytes = source.len(),
            "Audio source replaced"
        );
        self.audio = Some(source);
        self.audio.as_ref()
    }

    /// Mark the session busy and snapshot the audio for the request
    pub fn begin_identify(&mut self) -> Result<AudioPayload, SessionError> {
        if self.busy {
            return Err(SessionError::Busy);
        }
        let payload = self.audio.as_ref().ok_or(SessionError::NoAudio)?.payload();
        self.busy = true;
        self.outcome = None;
        Ok(payload)
    }

    /// Record the outcome of the request started by `begin_identify`
    pub fn finish_identify(&mut self, record: OutcomeRecord) {
        self.busy = false;
        self.history.record(record.clone());
        self.outcome = Some(record);
    }

    /// Ask the renderer to invert playback
    pub fn toggle_playback(&mut self) -> Result<(), SessionError> {
        if self.audio.is_none() {
            return Err(SessionError::NoAudio);
        }
        self.waveform.toggle();
        Ok(())
    }

    pub fn on_playback(&mut self, signal: PlaybackSignal) {
        match signal {
            PlaybackSignal::Play => self.waveform.on_play(),
            PlaybackSignal::Pause => self.waveform.on_pause(),
            PlaybackSignal::Finish => self.waveform.on_finish(),
        }
    }

    pub fn audio(&self) -> Option<&AudioSource> {
        self.audio.as_ref()
    }

    pub fn outcome(&self) -> Option<&OutcomeRecord> {
        self.outcome.as_ref()
    }

    pub fn history(&self) -> &History {
        &self.history
    }

    pub fn is_busy(&self) -> bool {
        self.busy
    }

    pub fn playback(&self) -> PlaybackState {
        self.waveform.state()
    }

    pub fn waveform(&self) -> &WaveformBinding<R> {
        &self.waveform
    }

    pub fn waveform_mut(&mut self) -> &mut WaveformBinding<R> {
        &mut self.waveform
    }

    fn touch(&mut self) {
        self.last_seen = Instant::now();
    }

    fn idle_for(&self) -> Duration {
        self.last_seen.elapsed()
    }

    /// Release the audio URL and destroy the renderer
    pub fn teardown(&mut self) -> Option<R> {
        self.audio = None;
        self.outcome = None;
        self.waveform.unmount()
    }

    /// Snapshot for rendering
    pub fn view(&self) -> SessionView {
        SessionView {
            file_name: self
                .audio
                .as_ref()
                .and_then(|a| a.file_name().map(str::to_owned)),
            audio_url: self.audio.as_ref().map(AudioSource::url),
            outcome: self.outcome.clone(),
            history: self.history.clone(),
            busy: self.busy,
            playback: self.playback(),
        }
    }
}

impl AnalyzerSession<PageWaveform> {
    /// Drain renderer commands queued for the page
    pub fn take_renderer_commands(&mut self) -> Vec<RendererCommand> {
        self.waveform
            .renderer_mut()
            .map(PageWaveform::drain)
            .unwrap_or_default()
    }

    /// Snapshot for a freshly loaded page.
    ///
    /// The page builds a new browser renderer from the snapshot, so queued
    /// commands are dropped and playback starts out stopped.
    pub fn page_view(&mut self) -> SessionView {
        self.take_renderer_commands();
        self.waveform.on_pause();
        self.view()
    }
}

/// Read-only snapshot of a session for the presenter
#[derive(Debug, Clone, Default)]
pub struct SessionView {
    pub file_name: Option<String>,
    pub audio_url: Option<String>,
    pub outcome: Option<OutcomeRecord>,
    pub history: History,
    pub busy: bool,
    pub playback: PlaybackState,
}

impl SessionView {
    pub fn has_audio(&self) -> bool {
        self.audio_url.is_some()
    }
}

/// All live analyzer sessions, keyed by cookie id
#[derive(Clone)]
pub struct SessionStore {
    sessions: Arc<RwLock<HashMap<Uuid, AnalyzerSession>>>,
    blobs: Arc<ObjectUrlStore>,
}

impl SessionStore {
    pub fn new(blobs: Arc<ObjectUrlStore>) -> Self {
        Self {
            sessions: Arc::new(RwLock::new(HashMap::new())),
            blobs,
        }
    }

    /// Return `id` if it names a live session, otherwise open a new one
    pub async fn ensure(&self, id: Option<Uuid>) -> Uuid {
        let mut sessions = self.sessions.write().await;
        if let Some(id) = id {
            if let Some(session) = sessions.get_mut(&id) {
                session.touch();
                return id;
            }
        }

        let id = Uuid::new_v4();
        sessions.insert(
            id,
            AnalyzerSession::new(Arc::clone(&self.blobs), PageWaveform::new()),
        );
        info!(session = %id, "Session opened ({} live)", sessions.len());
        id
    }

    /// Run `f` against a live session
    pub async fn with_session<T>(
        &self,
        id: Uuid,
        f: impl FnOnce(&mut AnalyzerSession) -> T,
    ) -> Result<T, SessionError> {
        let mut sessions = self.sessions.write().await;
        let session = sessions.get_mut(&id).ok_or(SessionError::UnknownSession)?;
        session.touch();
        Ok(f(session))
    }

    pub async fn submit_audio(&self, id: Uuid, raw: Option<RawAudio>) -> Result<(), SessionError> {
        self.with_session(id, |session| {
            session.submit_audio(raw);
        })
        .await
    }

    /// Identify the session's audio and record the outcome.
    ///
    /// The store lock is released while the request is in flight. The
    /// request runs in its own task, so it completes and its outcome is
    /// recorded even if the caller stops waiting. A session removed
    /// meanwhile loses the outcome.
    pub async fn identify(
        &self,
        id: Uuid,
        client: &ClassificationClient,
    ) -> Result<OutcomeRecord, SessionError> {
        let payload = self
            .with_session(id, |session| session.begin_identify())
            .await??;
        let fallback_name = payload.display_name();

        let store = self.clone();
        let client = client.clone();
        let request = tokio::spawn(async move {
            let record = client.identify(&payload).await;
            store.record_outcome(id, record).await
        });

        match request.await {
            Ok(result) => result,
            Err(e) => {
                // The task never recorded anything; release the session
                error!(session = %id, "Identification task failed: {}", e);
                let record = OutcomeRecord::failure(fallback_name, GENERIC_ERROR_MESSAGE);
                self.record_outcome(id, record).await
            }
        }
    }

    async fn record_outcome(
        &self,
        id: Uuid,
        record: OutcomeRecord,
    ) -> Result<OutcomeRecord, SessionError> {
        match self
            .with_session(id, |session| session.finish_identify(record.clone()))
            .await
        {
            Ok(()) => Ok(record),
            Err(e) => {
                warn!(session = %id, "Session ended before identification finished");
                Err(e)
            }
        }
    }

    pub async fn view(&self, id: Uuid) -> Result<SessionView, SessionError> {
        self.with_session(id, |session| session.view()).await
    }

    /// Remove a session and tear it down; returns the renderer's last commands
    pub async fn end(&self, id: Uuid) -> Option<Vec<RendererCommand>> {
        let mut session = self.sessions.write().await.remove(&id)?;
        let commands = session
            .teardown()
            .map(|mut renderer| renderer.drain())
            .unwrap_or_default();
        info!(session = %id, "Session ended");
        Some(commands)
    }

    /// Tear down sessions idle longer than `max_idle`; returns how many
    pub async fn sweep_idle(&self, max_idle: Duration) -> usize {
        let mut sessions = self.sessions.write().await;
        let before = sessions.len();
        // Busy sessions have a request in flight
        sessions.retain(|_, session| session.is_busy() || session.idle_for() < max_idle);
        let removed = before - sessions.len();
        if removed > 0 {
            info!("Expired {} idle session(s), {} live", removed, sessions.len());
        }
        removed
    }

    pub async fn len(&self) -> usize {
        self.sessions.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }

    pub fn blobs(&self) -> &Arc<ObjectUrlStore> {
        &self.blobs
    }
}
