use anyhow::{Context, Result};
use async_nats::Client;
use base64::Engine;
use tracing::info;
use uuid::Uuid;

use super::messages::{
    AudioSubmission, NoteRecord, NoteUpdate, NotesQuery, NotesReply, SubmissionAck, UpdateAck,
};
use crate::session::CaptureArtifact;

const SUBMIT_SUBJECT: &str = "scribe.audio.submit";
const FETCH_SUBJECT: &str = "scribe.notes.fetch";
const UPDATE_SUBJECT: &str = "scribe.notes.update";

/// Request-reply client for the remote transcription and notes services.
pub struct ScribeClient {
    client: Client,
}

impl ScribeClient {
    /// Connect to NATS server
    pub async fn connect(url: &str) -> Result<Self> {
        info!("Connecting to NATS at {}", url);

        let client = async_nats::connect(url)
            .await
            .context("Failed to connect to NATS")?;

        info!("Connected to NATS successfully");

        Ok(Self { client })
    }

    /// Submit a finished capture for transcription. A transport or service
    /// failure here leaves the caller's artifact untouched, so the same
    /// capture can be submitted again.
    pub async fn submit_audio(
        &self,
        session_id: &str,
        patient_id: i64,
        doctor_id: i64,
        artifact: &CaptureArtifact,
        duration_secs: u64,
    ) -> Result<SubmissionAck> {
        let message = AudioSubmission {
            session_id: session_id.to_string(),
            patient_id,
            doctor_id,
            media_type: artifact.media_type.clone(),
            audio: base64::engine::general_purpose::STANDARD.encode(&artifact.bytes),
            duration_secs,
            submitted_at: chrono::Utc::now().to_rfc3339(),
        };

        let payload = serde_json::to_vec(&message)?;

        let reply = self.client.request(SUBMIT_SUBJECT, payload.into())
            .await
            .context("Failed to submit audio for transcription")?;

        let ack: SubmissionAck = serde_json::from_slice(&reply.payload)
            .context("Transcription service sent an unreadable reply")?;

        info!(
            "Submitted session {} ({} bytes of {}, accepted={})",
            session_id, artifact.len(), artifact.media_type, ack.accepted
        );

        Ok(ack)
    }

    /// Fetch every stored note for one patient
    pub async fn fetch_notes(&self, patient_id: i64, doctor_id: i64) -> Result<Vec<NoteRecord>> {
        let query = NotesQuery { patient_id, doctor_id };
        let payload = serde_json::to_vec(&query)?;

        let reply = self.client.request(FETCH_SUBJECT, payload.into())
            .await
            .context("Failed to fetch notes")?;

        let notes: NotesReply = serde_json::from_slice(&reply.payload)
            .context("Notes service sent an unreadable reply")?;

        info!("Fetched {} notes for patient {}", notes.notes.len(), patient_id);

        Ok(notes.notes)
    }

    /// Replace one note's text verbatim
    pub async fn update_note(&self, note_id: Uuid, note: &str) -> Result<UpdateAck> {
        let update = NoteUpdate {
            note_id,
            note: note.to_string(),
        };

        let payload = serde_json::to_vec(&update)?;

        let reply = self.client.request(UPDATE_SUBJECT, payload.into())
            .await
            .context("Failed to update note")?;

        let ack: UpdateAck = serde_json::from_slice(&reply.payload)
            .context("Notes service sent an unreadable reply")?;

        info!("Updated note {} (updated={})", note_id, ack.updated);

        Ok(ack)
    }
}
