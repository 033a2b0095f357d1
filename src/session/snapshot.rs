use super::machine::SourceKind;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Point-in-time view of a recording session for status responses.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionSnapshot {
    /// Session identifier.
    pub session_id: String,

    /// Where the audio comes from.
    pub source: SourceKind,

    /// Current state tag: idle, awaiting_permission, countdown, recording,
    /// stopped, permission_denied.
    pub state: String,

    /// Seconds left on the countdown, while one is running.
    pub countdown_remaining_secs: Option<u32>,

    /// Elapsed recording seconds: live while recording, frozen after stop.
    pub elapsed_secs: Option<u64>,

    /// Finalized artifact size in bytes, once stopped.
    pub artifact_bytes: Option<usize>,

    /// Declared media type of the finalized artifact.
    pub media_type: Option<String>,

    /// Why device access was refused, if it was.
    pub denial_reason: Option<String>,

    /// When the session was created.
    pub started_at: DateTime<Utc>,
}
