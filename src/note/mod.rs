//! Note rendering: one opaque payload string in, one displayable document out.
//!
//! The transcription service returns whatever it returns: well-formed
//! structured JSON, malformed JSON, or plain dictation text. This module
//! guarantees every payload renders to something a clinician can read:
//! - structured payloads walk a fixed section order with undocumented
//!   fields omitted,
//! - everything else passes through verbatim,
//! - clinician edits replace the raw text with no validation.

pub mod document;
pub mod payload;
pub mod render;
pub mod schema;

pub use document::{ClinicalDocument, LabeledValue, Rendering, Section, SectionBody};
pub use payload::NotePayload;
pub use render::{humanize_key, render};
pub use schema::{ClinicalNote, PatientInfo, PhysicalExam, PreviousHistory, ReviewOfSystems, VitalSigns, NOT_DOCUMENTED};
