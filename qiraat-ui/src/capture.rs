//! Audio capture and upload handling
//!
//! An uploaded or recorded clip becomes an [`AudioSource`]: the bytes, the
//! display name and a playable URL served from the [`ObjectUrlStore`]. The
//! URL is an [`ObjectUrl`] handle that revokes itself when dropped, so
//! replacing or tearing down a source always releases its blob.

use axum::body::Bytes;
use std::collections::HashMap;
use std::sync::{Arc, Mutex, PoisonError};
use tracing::debug;
use uuid::Uuid;

/// Route prefix of playable URLs
pub const BLOB_ROUTE_PREFIX: &str = "/blob/";

/// Fallback upload name for recorded (webm) clips
pub const RECORDING_FILE_NAME: &str = "rekaman.webm";

/// Fallback upload name for everything else
pub const DEFAULT_FILE_NAME: &str = "audio.wav";

/// Fallback content type
pub const DEFAULT_CONTENT_TYPE: &str = "audio/wav";

/// History name of unnamed clips whose request never got a response
pub const UNNAMED_DISPLAY_NAME: &str = "audio";

/// Audio as received from the file picker or recorder
#[derive(Debug, Clone)]
pub struct RawAudio {
    pub file_name: Option<String>,
    pub content_type: Option<String>,
    pub bytes: Bytes,
}

impl RawAudio {
    pub fn new(file_name: Option<String>, content_type: Option<String>, bytes: Bytes) -> Self {
        // Browsers send "" for blobs appended without a name
        Self {
            file_name: file_name.filter(|n| !n.trim().is_empty()),
            content_type: content_type.filter(|c| !c.trim().is_empty()),
            bytes,
        }
    }
}

/// Blob registered behind a playable URL
#[derive(Debug, Clone)]
pub struct Blob {
    pub content_type: String,
    pub bytes: Bytes,
}

/// Registry of playable URLs
///
/// Mirrors browser object URLs: [`ObjectUrlStore::create`] registers bytes and
/// returns a handle; dropping the handle revokes the entry.
#[derive(Debug, Default)]
pub struct ObjectUrlStore {
    blobs: Mutex<HashMap<Uuid, Blob>>,
}

impl ObjectUrlStore {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    /// Register bytes and return the owning handle
    pub fn create(self: &Arc<Self>, bytes: Bytes, content_type: &str) -> ObjectUrl {
        let id = Uuid::new_v4();
        let blob = Blob {
            content_type: content_type.to_string(),
            bytes,
        };
        self.blobs
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(id, blob);
        debug!("Created playable URL {}{}", BLOB_ROUTE_PREFIX, id);

        ObjectUrl {
            id,
            store: Arc::clone(self),
        }
    }

    /// Look up a live blob
    pub fn get(&self, id: &Uuid) -> Option<Blob> {
        self.blobs
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .get(id)
            .cloned()
    }

    pub fn contains(&self, id: &Uuid) -> bool {
        self.blobs
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .contains_key(id)
    }

    /// Number of live blobs
    pub fn len(&self) -> usize {
        self.blobs.lock().unwrap_or_else(PoisonError::into_inner).len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn revoke(&self, id: &Uuid) {
        let removed = self
            .blobs
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .remove(id);
        if removed.is_some() {
            debug!("Revoked playable URL {}{}", BLOB_ROUTE_PREFIX, id);
        }
    }
}

/// Owning handle to a playable URL; revokes the URL on drop
#[derive(Debug)]
pub struct ObjectUrl {
    id: Uuid,
    store: Arc<ObjectUrlStore>,
}

impl ObjectUrl {
    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn url(&self) -> String {
        format!("{}{}", BLOB_ROUTE_PREFIX, self.id)
    }
}

impl Drop for ObjectUrl {
    fn drop(&mut self) {
        self.store.revoke(&self.id);
    }
}

/// Snapshot of an audio source for one classification request
#[derive(Debug, Clone)]
pub struct AudioPayload {
    pub file_name: Option<String>,
    pub content_type: Option<String>,
    pub bytes: Bytes,
}

impl AudioPayload {
    /// Name sent with the multipart part and shown in history.
    ///
    /// Unnamed clips are named after their content type: `rekaman.webm` for
    /// webm recordings, `audio.wav` otherwise.
    pub fn upload_file_name(&self) -> String {
        if let Some(name) = &self.file_name {
            return name.clone();
        }
        let is_webm = self
            .content_type
            .as_deref()
            .is_some_and(|ct| ct.contains("webm"));
        if is_webm {
            RECORDING_FILE_NAME.to_string()
        } else {
            DEFAULT_FILE_NAME.to_string()
        }
    }

    /// Name recorded when no response was obtained: the user's name or `audio`
    pub fn display_name(&self) -> String {
        self.file_name
            .clone()
            .unwrap_or_else(|| UNNAMED_DISPLAY_NAME.to_string())
    }

    pub fn upload_content_type(&self) -> &str {
        self.content_type.as_deref().unwrap_or(DEFAULT_CONTENT_TYPE)
    }
}

/// The session's active audio clip
#[derive(Debug)]
pub struct AudioSource {
    file_name: Option<String>,
    content_type: Option<String>,
    bytes: Bytes,
    url: ObjectUrl,
}

impl AudioSource {
    /// Register the clip's bytes in `store` and wrap it as a source
    pub fn register(raw: RawAudio, store: &Arc<ObjectUrlStore>) -> Self {
        let content_type = raw
            .content_type
            .as_deref()
            .unwrap_or(DEFAULT_CONTENT_TYPE)
            .to_string();
        let url = store.create(raw.bytes.clone(), &content_type);
        Self {
            file_name: raw.file_name,
            content_type: raw.content_type,
            bytes: raw.bytes,
            url,
        }
    }

    /// Name given by the user, if any (recordings have none)
    pub fn file_name(&self) -> Option<&str> {
        self.file_name.as_deref()
    }

    pub fn url(&self) -> String {
        self.url.url()
    }

    pub fn url_id(&self) -> Uuid {
        self.url.id()
    }

    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }

    pub fn payload(&self) -> AudioPayload {
        AudioPayload {
            file_name: self.file_name.clone(),
            content_type: self.content_type.clone(),
            bytes: self.bytes.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn raw(name: Option<&str>, content_type: Option<&str>) -> RawAudio {
        RawAudio::new(
            name.map(str::to_string),
            content_type.map(str::to_string),
            Bytes::from_static(b"RIFF"),
        )
    }

    #[test]
    fn test_dropping_handle_revokes_url() {
        let store = ObjectUrlStore::new();
        let url = store.create(Bytes::from_static(b"abc"), "audio/mpeg");
        let id = url.id();
        assert!(store.contains(&id));
        assert_eq!(store.get(&id).unwrap().content_type, "audio/mpeg");

        drop(url);
        assert!(!store.contains(&id));
        assert!(store.is_empty());
    }

    #[test]
    fn test_url_uses_blob_route() {
        let store = ObjectUrlStore::new();
        let url = store.create(Bytes::new(), "audio/wav");
        assert_eq!(url.url(), format!("/blob/{}", url.id()));
    }

    #[test]
    fn test_source_keeps_given_name() {
        let store = ObjectUrlStore::new();
        let source = AudioSource::register(raw(Some("surah.mp3"), Some("audio/mpeg")), &store);
        let payload = source.payload();
        assert_eq!(payload.upload_file_name(), "surah.mp3");
        assert_eq!(payload.upload_content_type(), "audio/mpeg");
    }

    #[test]
    fn test_unnamed_webm_is_recording() {
        let store = ObjectUrlStore::new();
        let source =
            AudioSource::register(raw(None, Some("audio/webm;codecs=opus")), &store);
        assert_eq!(source.payload().upload_file_name(), "rekaman.webm");
    }

    #[test]
    fn test_display_name_keeps_user_name_only() {
        let store = ObjectUrlStore::new();
        let named = AudioSource::register(raw(Some("surah.mp3"), None), &store);
        assert_eq!(named.payload().display_name(), "surah.mp3");

        let recording = AudioSource::register(raw(None, Some("audio/webm")), &store);
        assert_eq!(recording.payload().display_name(), "audio");
    }

    #[test]
    fn test_unnamed_untyped_falls_back_to_wav() {
        let store = ObjectUrlStore::new();
        let source = AudioSource::register(raw(Some(""), Some("")), &store);
        let payload = source.payload();
        assert!(source.file_name().is_none());
        assert_eq!(payload.upload_file_name(), "audio.wav");
        assert_eq!(payload.upload_content_type(), "audio/wav");
        // Blob is still served with a usable type
        assert_eq!(store.get(&source.url_id()).unwrap().content_type, "audio/wav");
    }
}
