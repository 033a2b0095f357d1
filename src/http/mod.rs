//! HTTP API server for the clinician-facing UI
//!
//! This module provides a REST API for driving capture sessions and notes:
//! - POST /sessions/start - Begin a microphone session
//! - POST /sessions/upload - Ingest a local audio file as a session
//! - GET /sessions/status - Query the current session
//! - POST /sessions/stop - Stop and finalize the current session
//! - POST /sessions/submit - Send the finished capture for transcription
//! - GET /patients/:patient_id/notes - Fetch and render a patient's notes
//! - PUT /notes/:note_id - Replace a note's text
//! - GET /health - Health check
//!
//! Every route except /health carries a bearer token naming the clinician.

mod handlers;
mod routes;
mod state;

pub use routes::create_router;
pub use state::AppState;
