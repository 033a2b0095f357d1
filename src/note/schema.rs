use serde::Deserialize;

/// Sentinel emitted by the transcription service for fields it could not
/// extract from the dictation. Rendered output omits these entirely.
pub const NOT_DOCUMENTED: &str = "Not stated";

/// Whether a string value carries real content (not empty, not the
/// "not documented" sentinel). Comparison is trimmed and case-insensitive
/// so minor producer drift does not leak placeholder text into notes.
pub fn is_documented(value: &str) -> bool {
    let v = value.trim();
    !v.is_empty() && !v.eq_ignore_ascii_case(NOT_DOCUMENTED)
}

/// The structured note schema produced by the transcription service.
///
/// Every field is optional on the wire: the parse stays lenient about
/// missing keys but strict about shapes, so a payload with a string where
/// a list belongs fails to parse and falls back to verbatim rendering.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ClinicalNote {
    #[serde(default)]
    pub patient_info: PatientInfo,
    pub history_of_present_illness: Option<String>,
    #[serde(default)]
    pub allergies: Vec<String>,
    #[serde(default)]
    pub medications: Vec<String>,
    #[serde(default)]
    pub previous_history: PreviousHistory,
    #[serde(default)]
    pub review_of_systems: ReviewOfSystems,
    #[serde(default)]
    pub physical_exam: PhysicalExam,
    pub assessment: Option<String>,
    /// Diagnosis codes, e.g. "J06.9 - Acute upper respiratory infection".
    #[serde(default)]
    pub icd10_codes: Vec<String>,
    /// Sequential treatment steps. Order is clinically meaningful and must
    /// be preserved through rendering.
    #[serde(default)]
    pub plan: Vec<String>,
    pub medical_decision_making: Option<String>,
}

/// Patient demographics and visit header fields.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct PatientInfo {
    pub patient_name: Option<String>,
    pub date_of_birth: Option<String>,
    pub age: Option<String>,
    pub sex: Option<String>,
    pub medical_record_number: Option<String>,
    pub date_of_clinic_visit: Option<String>,
    pub primary_care_provider: Option<String>,
    pub personal_note: Option<String>,
}

/// Prior medical background, split the way clinicians chart it.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct PreviousHistory {
    #[serde(default)]
    pub past_medical_history: Vec<String>,
    #[serde(default)]
    pub past_surgical_history: Vec<String>,
    #[serde(default)]
    pub family_history: Vec<String>,
    pub social_history: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ReviewOfSystems {
    #[serde(default)]
    pub positive_findings: Vec<String>,
    #[serde(default)]
    pub negative_findings: Vec<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct PhysicalExam {
    pub general_appearance: Option<String>,
    #[serde(default)]
    pub vital_signs: VitalSigns,
    pub examination_findings: Option<String>,
}

/// Vital signs block. Values stay strings ("98.6 F", "120/80"); the
/// service reports them as dictated, units included.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct VitalSigns {
    pub temperature: Option<String>,
    pub blood_pressure: Option<String>,
    pub heart_rate: Option<String>,
    pub respiratory_rate: Option<String>,
    pub oxygen_saturation: Option<String>,
}
