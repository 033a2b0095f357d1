pub mod client;
pub mod messages;

pub use client::ScribeClient;
pub use messages::{
    AudioSubmission, NoteRecord, NoteUpdate, NotesQuery, NotesReply, SubmissionAck, UpdateAck,
};
