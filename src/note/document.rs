use serde::{Deserialize, Serialize};

/// A displayable clinical document: an ordered sequence of labeled sections
/// derived from one structured note payload. Never persisted, rebuilt from
/// the raw payload on every view.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClinicalDocument {
    pub sections: Vec<Section>,
}

impl ClinicalDocument {
    /// Section headings in display order.
    pub fn headings(&self) -> Vec<&str> {
        self.sections.iter().map(|s| s.heading.as_str()).collect()
    }

    /// First section with the given heading, if present.
    pub fn section(&self, heading: &str) -> Option<&Section> {
        self.sections.iter().find(|s| s.heading == heading)
    }
}

/// One labeled section of the document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Section {
    pub heading: String,
    pub body: SectionBody,
}

impl Section {
    pub fn paragraph(heading: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            heading: heading.into(),
            body: SectionBody::Paragraph { text: text.into() },
        }
    }

    pub fn bullets(heading: impl Into<String>, items: Vec<String>) -> Self {
        Self {
            heading: heading.into(),
            body: SectionBody::Bullets { items },
        }
    }

    pub fn numbered(heading: impl Into<String>, items: Vec<String>) -> Self {
        Self {
            heading: heading.into(),
            body: SectionBody::Numbered { items },
        }
    }

    pub fn fields(heading: impl Into<String>, entries: Vec<LabeledValue>) -> Self {
        Self {
            heading: heading.into(),
            body: SectionBody::Fields { entries },
        }
    }
}

/// The shapes a section body can take.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum SectionBody {
    /// Narrative text, e.g. the assessment.
    Paragraph { text: String },
    /// Unordered list, e.g. allergies.
    Bullets { items: Vec<String> },
    /// Ordered list, used for the treatment plan where step order matters.
    Numbered { items: Vec<String> },
    /// Key/value block, e.g. vital signs.
    Fields { entries: Vec<LabeledValue> },
}

/// A labeled key/value entry inside a `Fields` block.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LabeledValue {
    pub label: String,
    pub value: String,
}

/// Result of rendering one raw payload.
///
/// Every payload renders to something: structured when it parses as the
/// recognized schema, verbatim text otherwise. There is no error variant.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Rendering {
    Structured { document: ClinicalDocument },
    Freeform { text: String },
}

impl Rendering {
    pub fn is_structured(&self) -> bool {
        matches!(self, Rendering::Structured { .. })
    }

    pub fn is_freeform(&self) -> bool {
        matches!(self, Rendering::Freeform { .. })
    }
}
