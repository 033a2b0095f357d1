//! Recording session management
//!
//! This module owns one audio capture attempt end to end:
//! - Permission negotiation against a `CaptureBackend` (microphone) or a
//!   direct file read (upload)
//! - Countdown and per-second elapsed tracking, driven by explicit ticks
//! - Buffering of device audio into a single finalized artifact
//! - Release of the capture stream on every exit path
//!
//! The state machine (`SessionMachine`) is synchronous and deterministic;
//! `RecordingSession` adds the tokio plumbing that feeds it wall-clock
//! ticks and device events.

mod machine;
mod session;
mod snapshot;
mod source;

pub use machine::{CaptureArtifact, SessionError, SessionMachine, SessionState, SourceKind};
pub use session::RecordingSession;
pub use snapshot::SessionSnapshot;
pub use source::{AcquiredStream, BackendFactory, CaptureBackend, CaptureStream, UploadSource};
