use super::document::{ClinicalDocument, LabeledValue, Rendering, Section};
use super::schema::{
    is_documented, ClinicalNote, PatientInfo, PhysicalExam, PreviousHistory, ReviewOfSystems,
    VitalSigns,
};

/// Render one raw note payload into a displayable form.
///
/// A payload that parses as the recognized clinical schema becomes a
/// structured document, walked in fixed section order with undocumented
/// fields omitted. Everything else (malformed JSON, plain dictation text,
/// a wrong-shaped field inside otherwise valid JSON, or a note with nothing
/// documented at all) renders verbatim. There is no failure path: every
/// input string has a renderable output.
///
/// The transformation is pure and deterministic: no I/O, no shared state,
/// identical input always yields an identical document.
pub fn render(raw: &str) -> Rendering {
    match serde_json::from_str::<ClinicalNote>(raw) {
        Ok(note) => {
            let document = build_document(&note);
            if document.sections.is_empty() {
                // Nothing documented: verbatim beats a blank note view.
                Rendering::Freeform {
                    text: raw.to_string(),
                }
            } else {
                Rendering::Structured { document }
            }
        }
        Err(_) => Rendering::Freeform {
            text: raw.to_string(),
        },
    }
}

/// Display label for a schema key: separators become spaces, each word is
/// capitalized ("blood_pressure" → "Blood Pressure").
pub fn humanize_key(key: &str) -> String {
    key.split(|c: char| c == '_' || c == '-' || c.is_whitespace())
        .filter(|word| !word.is_empty())
        .map(|word| {
            let mut chars = word.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().collect::<String>() + chars.as_str(),
                None => String::new(),
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}

/// Walk the schema in the fixed charting order. Sections with nothing
/// documented are skipped, never emitted as placeholders.
fn build_document(note: &ClinicalNote) -> ClinicalDocument {
    let mut sections = Vec::new();

    push_patient_info(&mut sections, &note.patient_info);
    push_paragraph(
        &mut sections,
        "History of Present Illness",
        &note.history_of_present_illness,
    );
    push_bullets(&mut sections, "Allergies", &note.allergies);
    push_bullets(&mut sections, "Medications", &note.medications);
    push_previous_history(&mut sections, &note.previous_history);
    push_review_of_systems(&mut sections, &note.review_of_systems);
    push_physical_exam(&mut sections, &note.physical_exam);
    push_paragraph(&mut sections, "Assessment", &note.assessment);
    push_bullets(&mut sections, "ICD-10 Codes", &note.icd10_codes);
    // The plan is the one ordered list: steps are sequential instructions.
    push_numbered(&mut sections, "Plan", &note.plan);
    push_paragraph(
        &mut sections,
        "Medical Decision Making",
        &note.medical_decision_making,
    );

    ClinicalDocument { sections }
}

fn push_patient_info(sections: &mut Vec<Section>, info: &PatientInfo) {
    let entries = labeled_entries(&[
        ("patient_name", &info.patient_name),
        ("date_of_birth", &info.date_of_birth),
        ("age", &info.age),
        ("sex", &info.sex),
        ("medical_record_number", &info.medical_record_number),
        ("date_of_clinic_visit", &info.date_of_clinic_visit),
        ("primary_care_provider", &info.primary_care_provider),
        ("personal_note", &info.personal_note),
    ]);

    if !entries.is_empty() {
        sections.push(Section::fields("Patient Information", entries));
    }
}

fn push_previous_history(sections: &mut Vec<Section>, history: &PreviousHistory) {
    push_bullets(
        sections,
        "Past Medical History",
        &history.past_medical_history,
    );
    push_bullets(
        sections,
        "Past Surgical History",
        &history.past_surgical_history,
    );
    push_bullets(sections, "Family History", &history.family_history);
    push_paragraph(sections, "Social History", &history.social_history);
}

fn push_review_of_systems(sections: &mut Vec<Section>, review: &ReviewOfSystems) {
    push_bullets(sections, "Positive Findings", &review.positive_findings);
    push_bullets(sections, "Negative Findings", &review.negative_findings);
}

fn push_physical_exam(sections: &mut Vec<Section>, exam: &PhysicalExam) {
    push_paragraph(sections, "General Appearance", &exam.general_appearance);
    push_vital_signs(sections, &exam.vital_signs);
    push_paragraph(sections, "Examination Findings", &exam.examination_findings);
}

fn push_vital_signs(sections: &mut Vec<Section>, vitals: &VitalSigns) {
    let entries = labeled_entries(&[
        ("temperature", &vitals.temperature),
        ("blood_pressure", &vitals.blood_pressure),
        ("heart_rate", &vitals.heart_rate),
        ("respiratory_rate", &vitals.respiratory_rate),
        ("oxygen_saturation", &vitals.oxygen_saturation),
    ]);

    if !entries.is_empty() {
        sections.push(Section::fields("Vital Signs", entries));
    }
}

fn push_paragraph(sections: &mut Vec<Section>, heading: &str, value: &Option<String>) {
    if let Some(text) = value.as_deref().filter(|v| is_documented(v)) {
        sections.push(Section::paragraph(heading, text));
    }
}

fn push_bullets(sections: &mut Vec<Section>, heading: &str, items: &[String]) {
    let items = documented_items(items);
    if !items.is_empty() {
        sections.push(Section::bullets(heading, items));
    }
}

fn push_numbered(sections: &mut Vec<Section>, heading: &str, items: &[String]) {
    let items = documented_items(items);
    if !items.is_empty() {
        sections.push(Section::numbered(heading, items));
    }
}

fn documented_items(items: &[String]) -> Vec<String> {
    items
        .iter()
        .filter(|item| is_documented(item))
        .cloned()
        .collect()
}

/// Labeled entries for a fields block: schema keys become display labels,
/// undocumented values are dropped, input order is preserved.
fn labeled_entries(pairs: &[(&str, &Option<String>)]) -> Vec<LabeledValue> {
    pairs
        .iter()
        .filter_map(|(key, value)| {
            value
                .as_deref()
                .filter(|v| is_documented(v))
                .map(|v| LabeledValue {
                    label: humanize_key(key),
                    value: v.to_string(),
                })
        })
        .collect()
}
