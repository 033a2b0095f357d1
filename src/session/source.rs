use anyhow::{Context, Result};
use async_trait::async_trait;
use hound::WavReader;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::sync::mpsc;
use tracing::info;

/// Lifecycle handle for an acquired capture stream.
///
/// Acquisition happens on the backend (async, because it may wait on a
/// permission prompt); this handle is what the session machine owns
/// afterwards. Implementations deliver audio through the chunk channel
/// handed out at acquisition and signal device failure by closing it.
pub trait CaptureStream: Send {
    /// Start delivering audio. Called exactly once, when the countdown
    /// reaches zero, never at permission grant.
    fn begin(&mut self);

    /// Stop the device and release the handle. Must be idempotent; this is
    /// called on every session exit path.
    fn release(&mut self);

    /// Whether the underlying device handle is still open.
    fn is_open(&self) -> bool;
}

/// A successfully negotiated capture stream: the lifecycle handle, the
/// channel audio arrives on, and the media type the device produces.
pub struct AcquiredStream {
    pub stream: Box<dyn CaptureStream>,
    pub chunks: mpsc::Receiver<Vec<u8>>,
    pub media_type: String,
}

/// A source of live audio.
///
/// `acquire` models the permission prompt: it resolves once the user
/// grants or refuses access, with no timeout; the caller cancels by
/// stopping the session. The returned stream must stay valid after the
/// backend itself is dropped.
#[async_trait]
pub trait CaptureBackend: Send {
    /// Negotiate device access. `Ok` hands over the stream; `Err` surfaces
    /// as a permission denial with the error's message as the reason.
    async fn acquire(&mut self) -> Result<AcquiredStream>;

    /// Backend name for logs.
    fn name(&self) -> &str;
}

/// Constructor for live-capture backends. Live microphone capture is
/// host-provided: the daemon refuses microphone sessions until its
/// embedder registers one, and tests register scripted backends.
pub type BackendFactory = Arc<dyn Fn() -> Result<Box<dyn CaptureBackend>> + Send + Sync>;

/// An uploaded recording read from the local filesystem.
///
/// The bytes are the artifact exactly as read, with no decoding and no
/// validation. WAV files additionally get a duration probe for logs and
/// the upload response.
#[derive(Debug)]
pub struct UploadSource {
    pub path: PathBuf,
    pub bytes: Vec<u8>,
    pub media_type: String,
    pub duration_seconds: Option<f64>,
}

impl UploadSource {
    /// Read an upload from `path`. Tildes are expanded and the media type
    /// is derived from the file extension.
    pub fn open(path: &str) -> Result<Self> {
        let expanded = shellexpand::tilde(path);
        let path = PathBuf::from(expanded.as_ref());

        info!("Opening uploaded audio: {}", path.display());

        let bytes = std::fs::read(&path)
            .with_context(|| format!("Failed to read upload {}", path.display()))?;

        let media_type = media_type_for(&path);
        let duration_seconds = probe_wav_duration(&path);

        match duration_seconds {
            Some(secs) => info!(
                "Upload loaded: {:.1}s, {} bytes, {}",
                secs,
                bytes.len(),
                media_type
            ),
            None => info!("Upload loaded: {} bytes, {}", bytes.len(), media_type),
        }

        Ok(Self {
            path,
            bytes,
            media_type,
            duration_seconds,
        })
    }
}

/// Media type from the file extension; unknown extensions stay opaque.
fn media_type_for(path: &Path) -> String {
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| e.to_ascii_lowercase());

    match ext.as_deref() {
        Some("wav") => "audio/wav",
        Some("mp3") => "audio/mpeg",
        Some("m4a") => "audio/mp4",
        Some("ogg") => "audio/ogg",
        Some("webm") => "audio/webm",
        Some("flac") => "audio/flac",
        _ => "application/octet-stream",
    }
    .to_string()
}

/// Seconds of audio in a WAV upload. Anything hound cannot read is treated
/// as opaque, not an error.
fn probe_wav_duration(path: &Path) -> Option<f64> {
    let reader = WavReader::open(path).ok()?;
    let spec = reader.spec();
    let frames = reader.duration();
    Some(frames as f64 / spec.sample_rate as f64)
}
