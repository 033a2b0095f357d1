// Unit tests for the note renderer
//
// These tests verify the two rendering branches (structured document vs
// verbatim text), the fixed charting order, sentinel omission, and the
// guarantee that no input ever produces an empty or failed view.

use clinic_scribe::note::{humanize_key, NotePayload};
use clinic_scribe::{render, Rendering, SectionBody};
use serde_json::json;

fn freeform_text(rendering: &Rendering) -> &str {
    match rendering {
        Rendering::Freeform { text } => text,
        Rendering::Structured { .. } => panic!("expected verbatim rendering"),
    }
}

#[test]
fn test_plain_dictation_renders_verbatim() {
    let raw = "Patient reports mild cough.";
    let rendering = render(raw);

    assert!(rendering.is_freeform());
    assert_eq!(freeform_text(&rendering), raw, "dictation text must pass through unchanged");
}

#[test]
fn test_malformed_json_renders_verbatim() {
    let raw = r#"{"assessment": "unterminated"#;
    let rendering = render(raw);

    assert!(rendering.is_freeform());
    assert_eq!(freeform_text(&rendering), raw);
}

#[test]
fn test_wrong_shape_falls_back_to_verbatim() {
    // Valid JSON, but allergies should be a list. The whole payload
    // renders verbatim rather than half-parsed.
    let raw = r#"{"allergies": "penicillin", "assessment": "URI"}"#;
    let rendering = render(raw);

    assert!(rendering.is_freeform());
    assert_eq!(freeform_text(&rendering), raw);
}

#[test]
fn test_unrelated_json_renders_verbatim() {
    // Parses as a note with nothing documented; showing an empty
    // structured document would hide the payload from the clinician.
    let raw = r#"{"totally": "unrelated", "count": 3}"#;
    let rendering = render(raw);

    assert!(rendering.is_freeform());
    assert_eq!(freeform_text(&rendering), raw);
}

#[test]
fn test_nothing_documented_renders_verbatim() {
    let raw = json!({
        "assessment": "Not stated",
        "allergies": [],
        "plan": [],
        "physical_exam": { "general_appearance": "Not stated" }
    })
    .to_string();

    let rendering = render(&raw);
    assert!(rendering.is_freeform(), "a fully-sentinel note has nothing to chart");
    assert_eq!(freeform_text(&rendering), raw);
}

#[test]
fn test_full_note_renders_in_charting_order() {
    let raw = json!({
        "patient_info": {
            "patient_name": "Jordan Alvarez",
            "age": "54",
            "medical_record_number": "MRN-20331"
        },
        "history_of_present_illness": "Three days of productive cough and fever.",
        "allergies": ["Penicillin"],
        "medications": ["Lisinopril 10 mg daily"],
        "previous_history": {
            "past_medical_history": ["Hypertension"],
            "past_surgical_history": ["Appendectomy 2009"],
            "family_history": ["Father: coronary artery disease"],
            "social_history": "Non-smoker, social alcohol use."
        },
        "review_of_systems": {
            "positive_findings": ["Cough", "Fever"],
            "negative_findings": ["No chest pain", "No dyspnea at rest"]
        },
        "physical_exam": {
            "general_appearance": "Alert, mildly fatigued.",
            "vital_signs": {
                "temperature": "100.8 F",
                "blood_pressure": "128/82",
                "heart_rate": "92 bpm",
                "respiratory_rate": "18",
                "oxygen_saturation": "97% on room air"
            },
            "examination_findings": "Rhonchi over the right lower lobe."
        },
        "assessment": "Community-acquired pneumonia, mild.",
        "icd10_codes": ["J18.9 - Pneumonia, unspecified organism"],
        "plan": ["Order chest X-ray", "Start amoxicillin", "Follow up in 48 hours"],
        "medical_decision_making": "Outpatient management appropriate given stable vitals."
    })
    .to_string();

    let document = match render(&raw) {
        Rendering::Structured { document } => document,
        Rendering::Freeform { .. } => panic!("a complete note must render structured"),
    };

    assert_eq!(
        document.headings(),
        vec![
            "Patient Information",
            "History of Present Illness",
            "Allergies",
            "Medications",
            "Past Medical History",
            "Past Surgical History",
            "Family History",
            "Social History",
            "Positive Findings",
            "Negative Findings",
            "General Appearance",
            "Vital Signs",
            "Examination Findings",
            "Assessment",
            "ICD-10 Codes",
            "Plan",
            "Medical Decision Making",
        ],
        "sections must follow the fixed charting order"
    );
}

#[test]
fn test_sentinel_fields_are_omitted() {
    let raw = json!({
        "history_of_present_illness": "Intermittent headaches for two weeks.",
        "allergies": ["Not stated"],
        "assessment": "  not stated  ",
        "physical_exam": {
            "general_appearance": "Well appearing.",
            "vital_signs": {
                "temperature": "Not stated",
                "blood_pressure": "118/76"
            }
        },
        "plan": ["Trial of ibuprofen"]
    })
    .to_string();

    let document = match render(&raw) {
        Rendering::Structured { document } => document,
        Rendering::Freeform { .. } => panic!("documented fields remain, so the note is structured"),
    };

    // Sentinel-only sections disappear entirely; case and padding drift
    // in the sentinel must not leak placeholders into the chart.
    assert!(document.section("Allergies").is_none());
    assert!(document.section("Assessment").is_none());

    let vitals = document.section("Vital Signs").expect("documented vitals must render");
    match &vitals.body {
        SectionBody::Fields { entries } => {
            assert_eq!(entries.len(), 1);
            assert_eq!(entries[0].label, "Blood Pressure");
            assert_eq!(entries[0].value, "118/76");
        }
        other => panic!("vital signs must render as fields, got {:?}", other),
    }
}

#[test]
fn test_plan_preserves_step_order() {
    let raw = json!({
        "allergies": [],
        "plan": ["Order chest X-ray", "Start antibiotic"]
    })
    .to_string();

    let document = match render(&raw) {
        Rendering::Structured { document } => document,
        Rendering::Freeform { .. } => panic!("a note with a plan must render structured"),
    };

    // Empty allergies list: omitted, not rendered as an empty section.
    assert!(document.section("Allergies").is_none());
    assert_eq!(document.headings(), vec!["Plan"]);

    let plan = document.section("Plan").expect("plan must render");
    match &plan.body {
        SectionBody::Numbered { items } => {
            assert_eq!(
                items,
                &vec!["Order chest X-ray".to_string(), "Start antibiotic".to_string()],
                "plan steps are sequential instructions; order must survive rendering"
            );
        }
        other => panic!("the plan must be an ordered list, got {:?}", other),
    }
}

#[test]
fn test_patient_info_labels_are_humanized() {
    let raw = json!({
        "patient_info": {
            "patient_name": "Casey Lin",
            "date_of_clinic_visit": "2026-03-14"
        }
    })
    .to_string();

    let document = match render(&raw) {
        Rendering::Structured { document } => document,
        Rendering::Freeform { .. } => panic!("patient info alone is still a structured note"),
    };

    let info = document.section("Patient Information").expect("patient info must render");
    match &info.body {
        SectionBody::Fields { entries } => {
            let labels: Vec<&str> = entries.iter().map(|e| e.label.as_str()).collect();
            assert_eq!(labels, vec!["Patient Name", "Date Of Clinic Visit"]);
            assert_eq!(entries[0].value, "Casey Lin");
        }
        other => panic!("patient info must render as fields, got {:?}", other),
    }
}

#[test]
fn test_humanize_key_formats() {
    assert_eq!(humanize_key("blood_pressure"), "Blood Pressure");
    assert_eq!(humanize_key("age"), "Age");
    assert_eq!(humanize_key("date_of_clinic_visit"), "Date Of Clinic Visit");
    assert_eq!(humanize_key("oxygen-saturation"), "Oxygen Saturation");
    assert_eq!(humanize_key("already Spaced"), "Already Spaced");
    assert_eq!(humanize_key("__edge__case__"), "Edge Case");
}

#[test]
fn test_rendering_is_deterministic() {
    let raw = json!({
        "assessment": "Stable.",
        "plan": ["Continue current medications", "Recheck in three months"]
    })
    .to_string();

    let first = render(&raw);
    let second = render(&raw);
    assert_eq!(first, second, "same payload must always produce the same view");
}

#[test]
fn test_freeform_preserves_exact_bytes() {
    let raw = "Line one.  \n\n  Line two with  spacing.\n\tTabbed.";
    let rendering = render(raw);

    assert!(rendering.is_freeform());
    assert_eq!(freeform_text(&rendering), raw, "verbatim means byte-for-byte");
}

#[test]
fn test_edit_path_rerenders_from_replaced_text() {
    let structured = json!({
        "assessment": "Acute pharyngitis.",
        "plan": ["Supportive care"]
    })
    .to_string();

    let mut payload = NotePayload::new(structured);
    assert!(payload.render().is_structured());

    // Clinician rewrites the note as plain text; the next view follows
    // the stored text, no caching.
    payload.replace("Pharyngitis resolved. No further follow-up needed.");
    let rendering = payload.render();
    assert!(rendering.is_freeform());
    assert_eq!(
        freeform_text(&rendering),
        "Pharyngitis resolved. No further follow-up needed."
    );
    assert_eq!(payload.raw(), "Pharyngitis resolved. No further follow-up needed.");
}
