use super::document::Rendering;
use super::render::render;

/// One note's raw text, the single source of truth.
///
/// The storage layer treats this as an opaque string; any structure inside
/// it is purely a rendering concern. The display view is derived and
/// ephemeral: recomputed on every request, never cached or persisted.
#[derive(Debug, Clone, PartialEq)]
pub struct NotePayload {
    raw: String,
}

impl NotePayload {
    pub fn new(raw: impl Into<String>) -> Self {
        Self { raw: raw.into() }
    }

    /// The exact stored text.
    pub fn raw(&self) -> &str {
        &self.raw
    }

    /// Replace the stored text verbatim. This is the clinician's edit path.
    ///
    /// No validation, no schema coercion: the next render re-parses
    /// whatever was saved.
    pub fn replace(&mut self, raw: impl Into<String>) {
        self.raw = raw.into();
    }

    /// Compute the display view from the current raw text.
    pub fn render(&self) -> Rendering {
        render(&self.raw)
    }
}
