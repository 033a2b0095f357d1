use super::source::CaptureStream;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, info, warn};

/// Where a session's audio comes from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SourceKind {
    /// Live device stream; requires permission negotiation before capture.
    Microphone,
    /// Pre-recorded file; the bytes become the artifact immediately.
    Upload,
}

/// Lifecycle states of one capture attempt.
///
/// Transitions are strictly linear except `PermissionDenied`, which absorbs
/// the session once device access is refused. A new attempt always starts
/// from a fresh machine.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionState {
    Idle,
    AwaitingPermission,
    Countdown { remaining_secs: u32 },
    Recording { elapsed_secs: u64 },
    Stopped { elapsed_secs: u64 },
    PermissionDenied { reason: String },
}

impl SessionState {
    /// Short tag for logs and status responses.
    pub fn label(&self) -> &'static str {
        match self {
            SessionState::Idle => "idle",
            SessionState::AwaitingPermission => "awaiting_permission",
            SessionState::Countdown { .. } => "countdown",
            SessionState::Recording { .. } => "recording",
            SessionState::Stopped { .. } => "stopped",
            SessionState::PermissionDenied { .. } => "permission_denied",
        }
    }
}

/// Finalized audio produced by a completed session.
#[derive(Debug, Clone, PartialEq)]
pub struct CaptureArtifact {
    pub bytes: Vec<u8>,
    pub media_type: String,
}

impl CaptureArtifact {
    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }
}

/// Session-level errors. Device refusals are deliberately not here: a
/// refusal surfaces as the `PermissionDenied` state, never as an error
/// crossing the component boundary.
#[derive(Debug, Error)]
pub enum SessionError {
    /// Sessions are single-shot: once started, a machine never restarts.
    #[error("capture session already started")]
    AlreadyStarted,

    /// No capture backend can serve the requested source on this host.
    #[error("capture source unavailable: {reason}")]
    SourceUnavailable { reason: String },
}

/// The deterministic core of a recording session.
///
/// The machine has no clock and no device access of its own: every
/// transition is an explicit call (`begin`, the permission outcome,
/// `tick` once per elapsed second, audio chunks, `source_ended`, `stop`).
/// The async driver feeds it real timer and device events; tests feed it
/// scripted ones. Either way the machine owns the capture stream handle
/// and guarantees it is released on every exit path, including drop.
pub struct SessionMachine {
    session_id: String,
    kind: SourceKind,
    countdown_from: u32,
    state: SessionState,
    stream: Option<Box<dyn CaptureStream>>,
    media_type: Option<String>,
    buffer: Vec<u8>,
    artifact: Option<CaptureArtifact>,
}

impl SessionMachine {
    pub fn new(session_id: impl Into<String>, kind: SourceKind, countdown_secs: u32) -> Self {
        Self {
            session_id: session_id.into(),
            kind,
            countdown_from: countdown_secs,
            state: SessionState::Idle,
            stream: None,
            media_type: None,
            buffer: Vec::new(),
            artifact: None,
        }
    }

    /// Declared media type of the artifact being captured. Set by the
    /// driver once the source is known (upload extension or acquired
    /// device stream).
    pub fn set_media_type(&mut self, media_type: impl Into<String>) {
        self.media_type = Some(media_type.into());
    }

    /// Start the attempt: microphone sessions wait on the permission
    /// prompt, upload sessions go straight to recording since their bytes
    /// need no device negotiation.
    pub fn begin(&mut self) -> Result<(), SessionError> {
        if self.state != SessionState::Idle {
            return Err(SessionError::AlreadyStarted);
        }

        match self.kind {
            SourceKind::Microphone => {
                info!("session {}: awaiting device permission", self.session_id);
                self.state = SessionState::AwaitingPermission;
            }
            SourceKind::Upload => self.enter_recording(),
        }

        Ok(())
    }

    /// Device access granted: adopt the stream and start the countdown.
    ///
    /// A grant that lands in any other state (typically after the caller
    /// cancelled while the prompt was still open) releases the offered
    /// stream immediately instead of adopting it.
    pub fn permission_granted(&mut self, mut stream: Box<dyn CaptureStream>) {
        if self.state != SessionState::AwaitingPermission {
            warn!(
                "session {}: releasing stream granted in state {}",
                self.session_id,
                self.state.label()
            );
            stream.release();
            return;
        }

        self.stream = Some(stream);

        if self.countdown_from == 0 {
            self.enter_recording();
        } else {
            info!(
                "session {}: permission granted, countdown from {}",
                self.session_id, self.countdown_from
            );
            self.state = SessionState::Countdown {
                remaining_secs: self.countdown_from,
            };
        }
    }

    /// Device access refused or the device failed during negotiation.
    /// Terminal: a new attempt requires a fresh machine.
    pub fn permission_denied(&mut self, reason: impl Into<String>) {
        if self.state != SessionState::AwaitingPermission {
            debug!(
                "session {}: ignoring denial in state {}",
                self.session_id,
                self.state.label()
            );
            return;
        }

        let reason = reason.into();
        warn!("session {}: device access refused: {}", self.session_id, reason);
        self.state = SessionState::PermissionDenied { reason };
    }

    /// One elapsed second. Drives the countdown and the recording counter;
    /// stale ticks arriving after stop or denial are ignored.
    pub fn tick(&mut self) {
        match &self.state {
            SessionState::Countdown { remaining_secs } => {
                let remaining = *remaining_secs;
                if remaining <= 1 {
                    // Countdown reached zero: capture begins at this tick,
                    // never earlier.
                    self.enter_recording();
                } else {
                    debug!("session {}: countdown {}", self.session_id, remaining - 1);
                    self.state = SessionState::Countdown {
                        remaining_secs: remaining - 1,
                    };
                }
            }
            SessionState::Recording { elapsed_secs } => {
                let elapsed = *elapsed_secs;
                self.state = SessionState::Recording {
                    elapsed_secs: elapsed + 1,
                };
            }
            _ => {}
        }
    }

    /// Audio delivered by the source. Buffered while recording; anything
    /// arriving during the countdown is discarded so openings are never
    /// captured early.
    pub fn push_audio(&mut self, chunk: &[u8]) {
        match self.state {
            SessionState::Recording { .. } => self.buffer.extend_from_slice(chunk),
            _ => debug!(
                "session {}: discarding {} bytes in state {}",
                self.session_id,
                chunk.len(),
                self.state.label()
            ),
        }
    }

    /// The device or file source ended on its own (disconnect, EOF).
    /// Treated as an implicit stop, not an error: partial audio is still
    /// useful to the clinician.
    pub fn source_ended(&mut self) {
        match self.state {
            SessionState::Recording { .. } | SessionState::Countdown { .. } => {
                info!("session {}: source ended, stopping", self.session_id);
                self.finish();
            }
            _ => {}
        }
    }

    /// Stop the session and release its resources.
    ///
    /// Valid from `Recording` in the normal flow; calling it during the
    /// countdown or the permission wait cancels the attempt and releases
    /// whatever was held. Idempotent: stopping a finished or never-started
    /// session does nothing.
    pub fn stop(&mut self) {
        match self.state {
            SessionState::Recording { .. } | SessionState::Countdown { .. } => self.finish(),
            SessionState::AwaitingPermission => {
                info!(
                    "session {}: cancelled before permission resolved",
                    self.session_id
                );
                self.finish();
            }
            _ => {}
        }
    }

    /// Elapsed recording seconds: live counter while `Recording`, frozen
    /// once `Stopped`, `None` before capture begins.
    pub fn elapsed_secs(&self) -> Option<u64> {
        match self.state {
            SessionState::Recording { elapsed_secs } | SessionState::Stopped { elapsed_secs } => {
                Some(elapsed_secs)
            }
            _ => None,
        }
    }

    /// Seconds left on the countdown, if one is running.
    pub fn countdown_remaining(&self) -> Option<u32> {
        match self.state {
            SessionState::Countdown { remaining_secs } => Some(remaining_secs),
            _ => None,
        }
    }

    /// Why device access was refused, once in `PermissionDenied`.
    pub fn denial_reason(&self) -> Option<&str> {
        match &self.state {
            SessionState::PermissionDenied { reason } => Some(reason),
            _ => None,
        }
    }

    /// The finalized artifact. Available only once `Stopped`.
    pub fn artifact(&self) -> Option<&CaptureArtifact> {
        match self.state {
            SessionState::Stopped { .. } => self.artifact.as_ref(),
            _ => None,
        }
    }

    pub fn state(&self) -> &SessionState {
        &self.state
    }

    pub fn kind(&self) -> SourceKind {
        self.kind
    }

    pub fn session_id(&self) -> &str {
        &self.session_id
    }

    /// Whether the attempt is still in flight (waiting, counting down, or
    /// recording).
    pub fn is_active(&self) -> bool {
        matches!(
            self.state,
            SessionState::AwaitingPermission
                | SessionState::Countdown { .. }
                | SessionState::Recording { .. }
        )
    }

    /// Whether a device stream is currently held open.
    pub fn stream_open(&self) -> bool {
        self.stream.as_ref().is_some_and(|s| s.is_open())
    }

    fn enter_recording(&mut self) {
        if let Some(stream) = self.stream.as_mut() {
            stream.begin();
        }
        info!("session {}: recording started", self.session_id);
        self.state = SessionState::Recording { elapsed_secs: 0 };
    }

    /// Shared exit path: release the stream synchronously, then finalize
    /// the buffer into the artifact.
    fn finish(&mut self) {
        self.release_stream();

        let elapsed = self.elapsed_secs().unwrap_or(0);
        let bytes = std::mem::take(&mut self.buffer);
        let media_type = self
            .media_type
            .clone()
            .unwrap_or_else(|| "application/octet-stream".to_string());

        info!(
            "session {}: stopped after {}s with {} bytes of {}",
            self.session_id,
            elapsed,
            bytes.len(),
            media_type
        );

        self.artifact = Some(CaptureArtifact { bytes, media_type });
        self.state = SessionState::Stopped {
            elapsed_secs: elapsed,
        };
    }

    fn release_stream(&mut self) {
        if let Some(mut stream) = self.stream.take() {
            stream.release();
            debug!("session {}: capture stream released", self.session_id);
        }
    }
}

impl Drop for SessionMachine {
    fn drop(&mut self) {
        // Teardown paths that skip stop() still must not leak the device.
        self.release_stream();
    }
}
