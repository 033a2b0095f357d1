pub mod config;
pub mod http;
pub mod identity;
pub mod nats;
pub mod note;
pub mod session;

pub use config::Config;
pub use http::{create_router, AppState};
pub use identity::ClinicianIdentity;
pub use nats::{
    AudioSubmission, NoteRecord, NoteUpdate, NotesQuery, NotesReply, ScribeClient, SubmissionAck,
    UpdateAck,
};
pub use note::{
    render, ClinicalDocument, ClinicalNote, NotePayload, Rendering, Section, SectionBody,
};
pub use session::{
    AcquiredStream, BackendFactory, CaptureArtifact, CaptureBackend, CaptureStream,
    RecordingSession, SessionError, SessionMachine, SessionSnapshot, SessionState, SourceKind,
    UploadSource,
};
