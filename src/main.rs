use anyhow::{Context, Result};
use clap::Parser;
use clinic_scribe::{create_router, AppState, Config, ScribeClient};
use std::sync::Arc;
use tracing::info;

#[derive(Parser, Debug)]
#[command(author, version, about = "Local capture daemon for clinical voice notes")]
struct Args {
    /// Path to the config file (extension optional)
    #[arg(long, default_value = "config/clinic-scribe")]
    config: String,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt::init();

    let args = Args::parse();

    let cfg = Config::load(&args.config)
        .with_context(|| format!("Failed to load config from {}", args.config))?;

    info!("{} starting", cfg.service.name);
    info!("Transcription/notes services via NATS at {}", cfg.remote.nats_url);

    let client = ScribeClient::connect(&cfg.remote.nats_url).await?;

    // Live microphone capture needs a host-registered backend (see
    // session::CaptureBackend). Without one this install still serves
    // uploads, status, and the notes routes.
    let state = AppState::new(Arc::new(client), cfg.recording.countdown_secs);

    let router = create_router(state);

    let addr = format!("{}:{}", cfg.service.http.bind, cfg.service.http.port);
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("Failed to bind {}", addr))?;

    info!("HTTP server listening on {}", addr);

    axum::serve(listener, router).await?;

    Ok(())
}
