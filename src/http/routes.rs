use super::handlers;
use super::state::AppState;
use axum::{
    routing::{get, post, put},
    Router,
};
use tower_http::trace::TraceLayer;

/// Create the HTTP router with all routes
pub fn create_router(state: AppState) -> Router {
    Router::new()
        // Health check
        .route("/health", get(handlers::health_check))
        // Capture control
        .route("/sessions/start", post(handlers::start_session))
        .route("/sessions/upload", post(handlers::upload_session))
        .route("/sessions/status", get(handlers::session_status))
        .route("/sessions/stop", post(handlers::stop_session))
        .route("/sessions/submit", post(handlers::submit_session))
        // Notes
        .route("/patients/:patient_id/notes", get(handlers::patient_notes))
        .route("/notes/:note_id", put(handlers::update_note))
        // Add tracing middleware for request logging
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
