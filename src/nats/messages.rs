use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Finished capture submitted to the transcription service
#[derive(Debug, Serialize, Deserialize)]
pub struct AudioSubmission {
    pub session_id: String,
    pub patient_id: i64,
    pub doctor_id: i64,
    pub media_type: String,
    pub audio: String,  // Base64-encoded audio bytes
    pub duration_secs: u64,
    pub submitted_at: String,  // RFC3339 timestamp
}

/// Acknowledgment from the transcription service
#[derive(Debug, Serialize, Deserialize)]
pub struct SubmissionAck {
    pub accepted: bool,
    pub message: String,
}

/// Request for one patient's stored notes
#[derive(Debug, Serialize, Deserialize)]
pub struct NotesQuery {
    pub patient_id: i64,
    pub doctor_id: i64,
}

/// One stored note as the notes service holds it. The note text is an
/// opaque string here; making it displayable is the renderer's job.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NoteRecord {
    pub id: Uuid,
    pub patient_id: i64,
    pub doctor_id: i64,
    pub note: String,
    pub created_at: DateTime<Utc>,
}

/// Reply to a notes query
#[derive(Debug, Serialize, Deserialize)]
pub struct NotesReply {
    pub notes: Vec<NoteRecord>,
}

/// Verbatim replacement of one note's text
#[derive(Debug, Serialize, Deserialize)]
pub struct NoteUpdate {
    pub note_id: Uuid,
    pub note: String,
}

/// Acknowledgment of a note update
#[derive(Debug, Serialize, Deserialize)]
pub struct UpdateAck {
    pub updated: bool,
    pub message: String,
}
