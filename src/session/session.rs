use super::machine::{CaptureArtifact, SessionError, SessionMachine, SourceKind};
use super::snapshot::SessionSnapshot;
use super::source::{AcquiredStream, CaptureBackend, UploadSource};
use chrono::{DateTime, Utc};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{mpsc, Mutex};
use tokio::task::JoinHandle;
use tokio::time::{interval_at, Instant, MissedTickBehavior};
use tracing::{debug, info};

/// A recording session: the deterministic state machine plus the tokio
/// plumbing that feeds it real timer and device events.
///
/// Every transition goes through one mutex-guarded machine, so transitions
/// are strictly serialized: external calls and the pump task interleave
/// but never overlap. `stop` cancels the pump and waits for it to
/// terminate before releasing the device, so no tick can land after
/// release.
pub struct RecordingSession {
    session_id: String,
    kind: SourceKind,
    started_at: DateTime<Utc>,
    machine: Arc<Mutex<SessionMachine>>,
    pump: Mutex<Option<JoinHandle<()>>>,
}

impl RecordingSession {
    /// Create a session in `Idle`. Nothing is acquired yet.
    pub fn new(session_id: impl Into<String>, kind: SourceKind, countdown_secs: u32) -> Self {
        let session_id = session_id.into();
        info!("Creating recording session: {} ({:?})", session_id, kind);

        Self {
            machine: Arc::new(Mutex::new(SessionMachine::new(
                session_id.clone(),
                kind,
                countdown_secs,
            ))),
            session_id,
            kind,
            started_at: Utc::now(),
            pump: Mutex::new(None),
        }
    }

    /// Start a live-microphone session: negotiate device access, then on
    /// grant run the countdown and capture until stopped.
    ///
    /// Returns once the permission prompt resolves. A refusal is not an
    /// `Err`; the session lands in `PermissionDenied` and the snapshot
    /// carries the reason. Stopping the session while the prompt is still
    /// open cancels the attempt; a grant arriving after that is released
    /// by the machine without being adopted.
    pub async fn start_microphone(
        &self,
        mut backend: Box<dyn CaptureBackend>,
    ) -> Result<(), SessionError> {
        {
            let mut machine = self.machine.lock().await;
            machine.begin()?;
        }

        info!(
            "session {}: requesting device access via {}",
            self.session_id,
            backend.name()
        );

        // The permission prompt: an open-ended await.
        let acquired = backend.acquire().await;

        let chunks = {
            let mut machine = self.machine.lock().await;
            match acquired {
                Ok(AcquiredStream {
                    stream,
                    chunks,
                    media_type,
                }) => {
                    machine.set_media_type(media_type);
                    machine.permission_granted(stream);
                    machine.is_active().then_some(chunks)
                }
                Err(e) => {
                    machine.permission_denied(format!("{e:#}"));
                    None
                }
            }
        };

        if let Some(chunks) = chunks {
            self.spawn_pump(chunks).await;
        }

        Ok(())
    }

    /// Create the artifact directly from an uploaded file: no device
    /// negotiation and no countdown, the bytes are finalized immediately.
    pub async fn start_upload(&self, source: UploadSource) -> Result<(), SessionError> {
        let mut machine = self.machine.lock().await;
        machine.set_media_type(source.media_type.clone());
        machine.begin()?;
        machine.push_audio(&source.bytes);
        machine.source_ended();
        Ok(())
    }

    /// Stop the session: cancel the pump, wait for it to terminate, then
    /// drive the machine's synchronous release. Idempotent.
    pub async fn stop(&self) -> SessionSnapshot {
        if let Some(pump) = self.pump.lock().await.take() {
            pump.abort();
            // Wait out the abort so no pump event can race the release.
            let _ = pump.await;
        }

        let mut machine = self.machine.lock().await;
        machine.stop();
        self.snapshot_of(&machine)
    }

    /// Point-in-time status view.
    pub async fn snapshot(&self) -> SessionSnapshot {
        let machine = self.machine.lock().await;
        self.snapshot_of(&machine)
    }

    /// Clone of the finalized artifact, once stopped. The session keeps
    /// its own copy so a failed submission can be retried.
    pub async fn artifact(&self) -> Option<CaptureArtifact> {
        self.machine.lock().await.artifact().cloned()
    }

    /// Elapsed recording seconds: live while recording, frozen after stop.
    pub async fn elapsed_secs(&self) -> Option<u64> {
        self.machine.lock().await.elapsed_secs()
    }

    /// Whether the attempt is still in flight.
    pub async fn is_active(&self) -> bool {
        self.machine.lock().await.is_active()
    }

    pub fn session_id(&self) -> &str {
        &self.session_id
    }

    pub fn kind(&self) -> SourceKind {
        self.kind
    }

    /// Feed real time and device events into the machine: one tick per
    /// elapsed second, chunks as they arrive, source end on channel close.
    async fn spawn_pump(&self, mut chunks: mpsc::Receiver<Vec<u8>>) {
        let machine = Arc::clone(&self.machine);
        let session_id = self.session_id.clone();

        let period = Duration::from_secs(1);
        // First tick one full second in; catch-up ticks are skipped so
        // a stalled runtime cannot burst the countdown. The anchor is
        // sampled here, at spawn, so the tick schedule is not skewed by
        // when the task is first polled.
        let first_tick = Instant::now() + period;

        let pump = tokio::spawn(async move {
            let mut ticker = interval_at(first_tick, period);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);

            loop {
                tokio::select! {
                    _ = ticker.tick() => {
                        let mut machine = machine.lock().await;
                        machine.tick();
                        if !machine.is_active() {
                            break;
                        }
                    }
                    chunk = chunks.recv() => {
                        let mut machine = machine.lock().await;
                        match chunk {
                            Some(bytes) => {
                                machine.push_audio(&bytes);
                                if !machine.is_active() {
                                    break;
                                }
                            }
                            None => {
                                machine.source_ended();
                                break;
                            }
                        }
                    }
                }
            }

            debug!("session {}: pump finished", session_id);
        });

        *self.pump.lock().await = Some(pump);
    }

    fn snapshot_of(&self, machine: &SessionMachine) -> SessionSnapshot {
        SessionSnapshot {
            session_id: self.session_id.clone(),
            source: self.kind,
            state: machine.state().label().to_string(),
            countdown_remaining_secs: machine.countdown_remaining(),
            elapsed_secs: machine.elapsed_secs(),
            artifact_bytes: machine.artifact().map(|a| a.len()),
            media_type: machine.artifact().map(|a| a.media_type.clone()),
            denial_reason: machine.denial_reason().map(str::to_string),
            started_at: self.started_at,
        }
    }
}

impl Drop for RecordingSession {
    fn drop(&mut self) {
        // Explicit stop is the synchronous path; this backstop keeps a
        // dropped session from leaving its pump ticking.
        if let Ok(mut pump) = self.pump.try_lock() {
            if let Some(handle) = pump.take() {
                handle.abort();
            }
        }
    }
}
