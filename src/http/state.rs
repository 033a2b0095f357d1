use crate::nats::ScribeClient;
use crate::session::{BackendFactory, RecordingSession};
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;

/// Shared application state for HTTP handlers
#[derive(Clone)]
pub struct AppState {
    /// Current session per clinician (doctor_id → session)
    pub sessions: Arc<RwLock<HashMap<i64, Arc<RecordingSession>>>>,
    /// Request-reply bridge to the transcription and notes services
    pub client: Arc<ScribeClient>,
    /// Host-registered microphone backend. None means live capture is
    /// unavailable on this install; uploads still work.
    pub backend: Option<BackendFactory>,
    /// Countdown length for new microphone sessions, in seconds
    pub countdown_secs: u32,
}

impl AppState {
    pub fn new(client: Arc<ScribeClient>, countdown_secs: u32) -> Self {
        Self {
            sessions: Arc::new(RwLock::new(HashMap::new())),
            client,
            backend: None,
            countdown_secs,
        }
    }

    /// Register the capture backend used for live microphone sessions
    pub fn with_backend(mut self, factory: BackendFactory) -> Self {
        self.backend = Some(factory);
        self
    }
}
