use super::state::AppState;
use crate::identity::ClinicianIdentity;
use crate::note::{render, Rendering};
use crate::session::{
    CaptureBackend, RecordingSession, SessionError, SessionSnapshot, SourceKind, UploadSource,
};
use axum::{
    extract::{Path, State},
    http::{header, HeaderMap, StatusCode},
    response::{IntoResponse, Json},
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{error, info};
use uuid::Uuid;

// ============================================================================
// Request/Response Types
// ============================================================================

#[derive(Debug, Deserialize)]
pub struct StartSessionRequest {
    /// Countdown override in seconds (default comes from config)
    pub countdown_secs: Option<u32>,
}

#[derive(Debug, Serialize)]
pub struct StartSessionResponse {
    pub session_id: String,
    pub status: String,
    pub message: String,
}

#[derive(Debug, Deserialize)]
pub struct UploadSessionRequest {
    /// Local path to an existing audio file; `~` is expanded
    pub path: String,
}

#[derive(Debug, Serialize)]
pub struct UploadSessionResponse {
    pub session_id: String,
    pub status: String,
    pub artifact_bytes: usize,
    /// Probed from the file header where the format allows it
    pub duration_secs: Option<f64>,
    pub message: String,
}

#[derive(Debug, Serialize)]
pub struct StopSessionResponse {
    pub session_id: String,
    pub status: String,
    pub message: String,
    pub snapshot: SessionSnapshot,
}

#[derive(Debug, Deserialize)]
pub struct SubmitSessionRequest {
    /// Patient the finished note belongs to
    pub patient_id: i64,
}

#[derive(Debug, Serialize)]
pub struct SubmitSessionResponse {
    pub session_id: String,
    pub accepted: bool,
    pub message: String,
}

/// One stored note plus its display form, rebuilt on every fetch so
/// edits show up without any cached rendering going stale.
#[derive(Debug, Serialize)]
pub struct RenderedNote {
    pub id: Uuid,
    pub created_at: DateTime<Utc>,
    pub raw: String,
    pub rendering: Rendering,
}

#[derive(Debug, Deserialize)]
pub struct UpdateNoteRequest {
    /// Replacement text, stored verbatim
    pub note: String,
}

#[derive(Debug, Serialize)]
pub struct UpdateNoteResponse {
    pub note_id: Uuid,
    pub updated: bool,
    pub message: String,
}

#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
}

// ============================================================================
// Authentication
// ============================================================================

/// Decode the bearer token into the acting clinician. The token is not
/// verified here; the auth service signs it and the remote services check
/// it. This layer only needs to know who is asking.
fn authenticate(headers: &HeaderMap) -> Result<ClinicianIdentity, (StatusCode, Json<ErrorResponse>)> {
    let token = headers
        .get(header::AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.strip_prefix("Bearer "))
        .ok_or_else(|| unauthorized("Missing bearer token"))?;

    ClinicianIdentity::from_token(token)
        .map_err(|e| unauthorized(&format!("Unreadable identity token: {:#}", e)))
}

fn unauthorized(message: &str) -> (StatusCode, Json<ErrorResponse>) {
    (
        StatusCode::UNAUTHORIZED,
        Json(ErrorResponse {
            error: message.to_string(),
        }),
    )
}

/// Build a live-capture backend, if this install registered one.
fn live_backend(state: &AppState) -> Result<Box<dyn CaptureBackend>, SessionError> {
    let factory = state
        .backend
        .as_ref()
        .ok_or_else(|| SessionError::SourceUnavailable {
            reason: "no capture backend registered on this install".to_string(),
        })?;

    factory().map_err(|e| SessionError::SourceUnavailable {
        reason: format!("{:#}", e),
    })
}

// ============================================================================
// Handlers
// ============================================================================

/// POST /sessions/start
/// Begin a microphone session for the authenticated clinician
pub async fn start_session(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(req): Json<StartSessionRequest>,
) -> impl IntoResponse {
    let identity = match authenticate(&headers) {
        Ok(identity) => identity,
        Err(rejection) => return rejection.into_response(),
    };

    let backend = match live_backend(&state) {
        Ok(backend) => backend,
        Err(e) => {
            error!("Cannot start microphone session: {}", e);
            return (
                StatusCode::SERVICE_UNAVAILABLE,
                Json(ErrorResponse {
                    error: e.to_string(),
                }),
            )
                .into_response();
        }
    };

    let session_id = format!("session-{}", Uuid::new_v4());
    let countdown = req.countdown_secs.unwrap_or(state.countdown_secs);

    info!(
        "Starting capture session {} for {} (countdown {}s)",
        session_id, identity.display_name, countdown
    );

    let session = Arc::new(RecordingSession::new(
        session_id.clone(),
        SourceKind::Microphone,
        countdown,
    ));

    // One session per clinician. Publish the new one first, then stop
    // whatever it displaced; a start that races this one will force-stop
    // this session the same way.
    let previous = {
        let mut sessions = state.sessions.write().await;
        sessions.insert(identity.doctor_id, session.clone())
    };

    if let Some(previous) = previous {
        if previous.is_active().await {
            info!(
                "Force-stopping session {} displaced by {}",
                previous.session_id(),
                session_id
            );
        }
        previous.stop().await;
    }

    if let Err(e) = session.start_microphone(backend).await {
        error!("Failed to start session {}: {}", session_id, e);
        return (
            StatusCode::CONFLICT,
            Json(ErrorResponse {
                error: format!("Failed to start session: {}", e),
            }),
        )
            .into_response();
    }

    let snapshot = session.snapshot().await;

    (
        StatusCode::OK,
        Json(StartSessionResponse {
            session_id,
            status: snapshot.state.clone(),
            message: match snapshot.state.as_str() {
                "permission_denied" => "Microphone permission was denied".to_string(),
                _ => "Capture session started".to_string(),
            },
        }),
    )
        .into_response()
}

/// POST /sessions/upload
/// Create a session from an existing local audio file
pub async fn upload_session(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(req): Json<UploadSessionRequest>,
) -> impl IntoResponse {
    let identity = match authenticate(&headers) {
        Ok(identity) => identity,
        Err(rejection) => return rejection.into_response(),
    };

    let source = match UploadSource::open(&req.path) {
        Ok(source) => source,
        Err(e) => {
            error!("Failed to open upload {}: {:#}", req.path, e);
            return (
                StatusCode::BAD_REQUEST,
                Json(ErrorResponse {
                    error: format!("Failed to open upload: {}", e),
                }),
            )
                .into_response();
        }
    };

    let session_id = format!("session-{}", Uuid::new_v4());
    let duration_secs = source.duration_seconds;

    info!(
        "Creating upload session {} for {} from {}",
        session_id, identity.display_name, req.path
    );

    let session = Arc::new(RecordingSession::new(
        session_id.clone(),
        SourceKind::Upload,
        0,
    ));

    if let Err(e) = session.start_upload(source).await {
        error!("Failed to ingest upload: {}", e);
        return (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(ErrorResponse {
                error: format!("Failed to ingest upload: {}", e),
            }),
        )
            .into_response();
    }

    let previous = {
        let mut sessions = state.sessions.write().await;
        sessions.insert(identity.doctor_id, session.clone())
    };

    if let Some(previous) = previous {
        previous.stop().await;
    }

    let snapshot = session.snapshot().await;

    (
        StatusCode::OK,
        Json(UploadSessionResponse {
            session_id,
            status: snapshot.state.clone(),
            artifact_bytes: snapshot.artifact_bytes.unwrap_or(0),
            duration_secs,
            message: "Upload ingested and ready to submit".to_string(),
        }),
    )
        .into_response()
}

/// GET /sessions/status
/// Snapshot of the clinician's current session
pub async fn session_status(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> impl IntoResponse {
    let identity = match authenticate(&headers) {
        Ok(identity) => identity,
        Err(rejection) => return rejection.into_response(),
    };

    let sessions = state.sessions.read().await;

    match sessions.get(&identity.doctor_id) {
        Some(session) => {
            let snapshot = session.snapshot().await;
            (StatusCode::OK, Json(snapshot)).into_response()
        }
        None => (
            StatusCode::NOT_FOUND,
            Json(ErrorResponse {
                error: "No capture session for this clinician".to_string(),
            }),
        )
            .into_response(),
    }
}

/// POST /sessions/stop
/// Stop the clinician's current session and finalize its capture
pub async fn stop_session(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> impl IntoResponse {
    let identity = match authenticate(&headers) {
        Ok(identity) => identity,
        Err(rejection) => return rejection.into_response(),
    };

    // The session stays in the map after stopping so the finished capture
    // can still be submitted.
    let session = {
        let sessions = state.sessions.read().await;
        sessions.get(&identity.doctor_id).cloned()
    };

    match session {
        Some(session) => {
            let snapshot = session.stop().await;
            info!(
                "Stopped session {} ({} recorded seconds)",
                snapshot.session_id,
                snapshot.elapsed_secs.unwrap_or(0)
            );
            (
                StatusCode::OK,
                Json(StopSessionResponse {
                    session_id: snapshot.session_id.clone(),
                    status: snapshot.state.clone(),
                    message: "Capture stopped".to_string(),
                    snapshot,
                }),
            )
                .into_response()
        }
        None => (
            StatusCode::NOT_FOUND,
            Json(ErrorResponse {
                error: "No capture session for this clinician".to_string(),
            }),
        )
            .into_response(),
    }
}

/// POST /sessions/submit
/// Send the finished capture to the transcription service
pub async fn submit_session(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(req): Json<SubmitSessionRequest>,
) -> impl IntoResponse {
    let identity = match authenticate(&headers) {
        Ok(identity) => identity,
        Err(rejection) => return rejection.into_response(),
    };

    let session = {
        let sessions = state.sessions.read().await;
        sessions.get(&identity.doctor_id).cloned()
    };

    let session = match session {
        Some(session) => session,
        None => {
            return (
                StatusCode::NOT_FOUND,
                Json(ErrorResponse {
                    error: "No capture session for this clinician".to_string(),
                }),
            )
                .into_response();
        }
    };

    let artifact = match session.artifact().await {
        Some(artifact) => artifact,
        None => {
            return (
                StatusCode::CONFLICT,
                Json(ErrorResponse {
                    error: "Session has no finished capture to submit; stop it first".to_string(),
                }),
            )
                .into_response();
        }
    };

    let snapshot = session.snapshot().await;
    let duration_secs = snapshot.elapsed_secs.unwrap_or(0);

    match state
        .client
        .submit_audio(
            session.session_id(),
            req.patient_id,
            identity.doctor_id,
            &artifact,
            duration_secs,
        )
        .await
    {
        Ok(ack) => {
            if ack.accepted {
                // Consumed. A rejected submission keeps the session around
                // so the clinician can retry without re-recording.
                let mut sessions = state.sessions.write().await;
                sessions.remove(&identity.doctor_id);
            }
            (
                StatusCode::OK,
                Json(SubmitSessionResponse {
                    session_id: session.session_id().to_string(),
                    accepted: ack.accepted,
                    message: ack.message,
                }),
            )
                .into_response()
        }
        Err(e) => {
            // Transport failure: the artifact is untouched, retry is safe.
            error!("Failed to submit session {}: {:#}", session.session_id(), e);
            (
                StatusCode::BAD_GATEWAY,
                Json(ErrorResponse {
                    error: format!("Failed to submit capture: {}", e),
                }),
            )
                .into_response()
        }
    }
}

/// GET /patients/:patient_id/notes
/// Fetch a patient's notes, each rendered for display
pub async fn patient_notes(
    State(state): State<AppState>,
    Path(patient_id): Path<i64>,
    headers: HeaderMap,
) -> impl IntoResponse {
    let identity = match authenticate(&headers) {
        Ok(identity) => identity,
        Err(rejection) => return rejection.into_response(),
    };

    match state.client.fetch_notes(patient_id, identity.doctor_id).await {
        Ok(records) => {
            let notes: Vec<RenderedNote> = records
                .into_iter()
                .map(|record| RenderedNote {
                    id: record.id,
                    created_at: record.created_at,
                    rendering: render(&record.note),
                    raw: record.note,
                })
                .collect();
            (StatusCode::OK, Json(notes)).into_response()
        }
        Err(e) => {
            error!("Failed to fetch notes for patient {}: {:#}", patient_id, e);
            (
                StatusCode::BAD_GATEWAY,
                Json(ErrorResponse {
                    error: format!("Failed to fetch notes: {}", e),
                }),
            )
                .into_response()
        }
    }
}

/// PUT /notes/:note_id
/// Replace a note's text verbatim
pub async fn update_note(
    State(state): State<AppState>,
    Path(note_id): Path<Uuid>,
    headers: HeaderMap,
    Json(req): Json<UpdateNoteRequest>,
) -> impl IntoResponse {
    let identity = match authenticate(&headers) {
        Ok(identity) => identity,
        Err(rejection) => return rejection.into_response(),
    };

    info!(
        "Updating note {} on behalf of {}",
        note_id, identity.display_name
    );

    match state.client.update_note(note_id, &req.note).await {
        Ok(ack) => (
            StatusCode::OK,
            Json(UpdateNoteResponse {
                note_id,
                updated: ack.updated,
                message: ack.message,
            }),
        )
            .into_response(),
        Err(e) => {
            error!("Failed to update note {}: {:#}", note_id, e);
            (
                StatusCode::BAD_GATEWAY,
                Json(ErrorResponse {
                    error: format!("Failed to update note: {}", e),
                }),
            )
                .into_response()
        }
    }
}

/// GET /health
/// Health check endpoint
pub async fn health_check() -> impl IntoResponse {
    (StatusCode::OK, "OK")
}
