//! Symptom questionnaire: the UI-side draft and the strict, validated value
//! consumed by the triage engines.
//!
//! The draft mirrors the multi-step form (every answer optional except the
//! symptom list). `QuestionnaireDraft::resolve` fills in the form defaults and
//! validates, producing a `Questionnaire` whose fields are all present and in
//! range. Nothing downstream of `resolve` re-checks these bounds.

use std::collections::HashSet;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::enums::{Answer, DurationUnit, Sex};

/// Maximum number of distinct symptoms per questionnaire.
pub const MAX_SYMPTOMS: usize = 10;

/// Maximum length of one symptom description (characters).
pub const MAX_SYMPTOM_CHARS: usize = 200;

/// Maximum free-text notes length (characters).
pub const MAX_NOTES_CHARS: usize = 2_000;

pub const MAX_AGE_YEARS: i64 = 120;
pub const MAX_DURATION_VALUE: i64 = 999;
pub const MIN_SEVERITY: i64 = 1;
pub const MAX_SEVERITY: i64 = 5;

// Form defaults applied by `resolve()` when the draft leaves a field unset.
const DEFAULT_SEX: Sex = Sex::PreferNotToSay;
const DEFAULT_DURATION_UNIT: DurationUnit = DurationUnit::Days;
const DEFAULT_DURATION_VALUE: i64 = 2;
const DEFAULT_SEVERITY: i64 = 3;

// ═══════════════════════════════════════════
// Red flags
// ═══════════════════════════════════════════

/// One of the eight independent red-flag indicators.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum RedFlag {
    ChestPain,
    TroubleBreathing,
    FaintingOrConfusion,
    SevereBleeding,
    SevereAllergicReaction,
    OneSidedWeaknessOrFaceDroop,
    SevereHeadacheSudden,
    SuicidalThoughts,
}

impl RedFlag {
    /// Canonical order used for rationale and watch lists.
    pub const ALL: [RedFlag; 8] = [
        RedFlag::ChestPain,
        RedFlag::TroubleBreathing,
        RedFlag::FaintingOrConfusion,
        RedFlag::SevereBleeding,
        RedFlag::SevereAllergicReaction,
        RedFlag::OneSidedWeaknessOrFaceDroop,
        RedFlag::SevereHeadacheSudden,
        RedFlag::SuicidalThoughts,
    ];

    /// Wire key inside the `redFlags` object.
    pub fn key(&self) -> &'static str {
        match self {
            Self::ChestPain => "chestPain",
            Self::TroubleBreathing => "troubleBreathing",
            Self::FaintingOrConfusion => "faintingOrConfusion",
            Self::SevereBleeding => "severeBleeding",
            Self::SevereAllergicReaction => "severeAllergicReaction",
            Self::OneSidedWeaknessOrFaceDroop => "oneSidedWeaknessOrFaceDroop",
            Self::SevereHeadacheSudden => "severeHeadacheSudden",
            Self::SuicidalThoughts => "suicidalThoughts",
        }
    }

    /// Patient-facing description of the warning sign.
    pub fn description(&self) -> &'static str {
        match self {
            Self::ChestPain => "Chest pain, pressure or tightness",
            Self::TroubleBreathing => "Trouble breathing or shortness of breath at rest",
            Self::FaintingOrConfusion => "Fainting, new confusion or difficulty staying awake",
            Self::SevereBleeding => "Severe or uncontrolled bleeding",
            Self::SevereAllergicReaction => {
                "Severe allergic reaction (swelling of face, lips or tongue, hives with breathing difficulty)"
            }
            Self::OneSidedWeaknessOrFaceDroop => {
                "Weakness or numbness on one side of the body, face droop or slurred speech"
            }
            Self::SevereHeadacheSudden => "Sudden, severe headache (worst headache of your life)",
            Self::SuicidalThoughts => "Thoughts of suicide or harming yourself",
        }
    }
}

/// The eight red-flag answers. Missing keys deserialize as `false`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct RedFlags {
    pub chest_pain: bool,
    pub trouble_breathing: bool,
    pub fainting_or_confusion: bool,
    pub severe_bleeding: bool,
    pub severe_allergic_reaction: bool,
    pub one_sided_weakness_or_face_droop: bool,
    pub severe_headache_sudden: bool,
    pub suicidal_thoughts: bool,
}

impl RedFlags {
    pub fn is_set(&self, flag: RedFlag) -> bool {
        match flag {
            RedFlag::ChestPain => self.chest_pain,
            RedFlag::TroubleBreathing => self.trouble_breathing,
            RedFlag::FaintingOrConfusion => self.fainting_or_confusion,
            RedFlag::SevereBleeding => self.severe_bleeding,
            RedFlag::SevereAllergicReaction => self.severe_allergic_reaction,
            RedFlag::OneSidedWeaknessOrFaceDroop => self.one_sided_weakness_or_face_droop,
            RedFlag::SevereHeadacheSudden => self.severe_headache_sudden,
            RedFlag::SuicidalThoughts => self.suicidal_thoughts,
        }
    }

    pub fn set(&mut self, flag: RedFlag, value: bool) {
        let slot = match flag {
            RedFlag::ChestPain => &mut self.chest_pain,
            RedFlag::TroubleBreathing => &mut self.trouble_breathing,
            RedFlag::FaintingOrConfusion => &mut self.fainting_or_confusion,
            RedFlag::SevereBleeding => &mut self.severe_bleeding,
            RedFlag::SevereAllergicReaction => &mut self.severe_allergic_reaction,
            RedFlag::OneSidedWeaknessOrFaceDroop => &mut self.one_sided_weakness_or_face_droop,
            RedFlag::SevereHeadacheSudden => &mut self.severe_headache_sudden,
            RedFlag::SuicidalThoughts => &mut self.suicidal_thoughts,
        };
        *slot = value;
    }

    /// Set flags, in canonical order.
    pub fn active(&self) -> Vec<RedFlag> {
        RedFlag::ALL
            .into_iter()
            .filter(|f| self.is_set(*f))
            .collect()
    }

    /// Set physical red flags (everything except suicidal thoughts).
    pub fn active_physical(&self) -> Vec<RedFlag> {
        RedFlag::ALL
            .into_iter()
            .filter(|f| *f != RedFlag::SuicidalThoughts && self.is_set(*f))
            .collect()
    }

    pub fn any_physical(&self) -> bool {
        !self.active_physical().is_empty()
    }
}

// ═══════════════════════════════════════════
// Strict questionnaire
// ═══════════════════════════════════════════

/// Validated questionnaire. Construct through `QuestionnaireDraft::resolve`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Questionnaire {
    symptoms: Vec<String>,
    age_years: Option<u8>,
    sex: Sex,
    duration: DurationUnit,
    duration_value: u16,
    severity: u8,
    fever: Answer,
    pregnancy: Answer,
    red_flags: RedFlags,
    notes: String,
}

impl Questionnaire {
    /// Distinct, trimmed, non-empty symptom descriptions (1 to 10).
    pub fn symptoms(&self) -> &[String] {
        &self.symptoms
    }

    pub fn age_years(&self) -> Option<u8> {
        self.age_years
    }

    pub fn sex(&self) -> Sex {
        self.sex
    }

    pub fn duration(&self) -> DurationUnit {
        self.duration
    }

    pub fn duration_value(&self) -> u16 {
        self.duration_value
    }

    /// 1 (mild) to 5 (severe).
    pub fn severity(&self) -> u8 {
        self.severity
    }

    pub fn fever(&self) -> Answer {
        self.fever
    }

    pub fn pregnancy(&self) -> Answer {
        self.pregnancy
    }

    pub fn red_flags(&self) -> &RedFlags {
        &self.red_flags
    }

    pub fn notes(&self) -> &str {
        &self.notes
    }

    /// Time since onset, in hours.
    pub fn elapsed_hours(&self) -> u32 {
        u32::from(self.duration_value) * self.duration.hours()
    }
}

// ═══════════════════════════════════════════
// Draft (form-side) representation
// ═══════════════════════════════════════════

/// Partially filled questionnaire as submitted by the form layer.
///
/// Numbers are kept wide so that out-of-range answers surface as
/// `QuestionnaireError` rather than as opaque deserialization failures.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QuestionnaireDraft {
    pub symptoms: Vec<String>,
    #[serde(default)]
    pub age_years: Option<i64>,
    #[serde(default)]
    pub sex: Option<Sex>,
    #[serde(default)]
    pub duration: Option<DurationUnit>,
    #[serde(default)]
    pub duration_value: Option<i64>,
    #[serde(default)]
    pub severity: Option<i64>,
    #[serde(default)]
    pub fever: Option<Answer>,
    #[serde(default)]
    pub pregnancy: Option<Answer>,
    #[serde(default)]
    pub red_flags: RedFlags,
    #[serde(default)]
    pub notes: Option<String>,
}

/// Input-contract violations. No triage is attempted when one is raised.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum QuestionnaireError {
    #[error("At least one symptom is required")]
    NoSymptoms,

    #[error("Too many symptoms ({0}); at most {max} are accepted", max = MAX_SYMPTOMS)]
    TooManySymptoms(usize),

    #[error("Symptom descriptions must be at most {max} characters", max = MAX_SYMPTOM_CHARS)]
    SymptomTooLong,

    #[error("Age must be between 0 and {max} years (got {0})", max = MAX_AGE_YEARS)]
    AgeOutOfRange(i64),

    #[error("Duration must be between 1 and {max} (got {0})", max = MAX_DURATION_VALUE)]
    DurationOutOfRange(i64),

    #[error("Severity must be between 1 and 5 (got {0})")]
    SeverityOutOfRange(i64),

    #[error("Notes must be at most {max} characters (got {0})", max = MAX_NOTES_CHARS)]
    NotesTooLong(usize),
}

impl QuestionnaireDraft {
    /// Start a draft with the given symptoms and every other answer unset.
    pub fn with_symptoms<I, S>(symptoms: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            symptoms: symptoms.into_iter().map(Into::into).collect(),
            ..Self::default()
        }
    }

    /// Apply form defaults and validate into a strict `Questionnaire`.
    pub fn resolve(&self) -> Result<Questionnaire, QuestionnaireError> {
        let symptoms = normalize_symptoms(&self.symptoms)?;

        let age_years = match self.age_years {
            None => None,
            Some(age) if (0..=MAX_AGE_YEARS).contains(&age) => Some(age as u8),
            Some(age) => return Err(QuestionnaireError::AgeOutOfRange(age)),
        };

        let duration_value = self.duration_value.unwrap_or(DEFAULT_DURATION_VALUE);
        if !(1..=MAX_DURATION_VALUE).contains(&duration_value) {
            return Err(QuestionnaireError::DurationOutOfRange(duration_value));
        }

        let severity = self.severity.unwrap_or(DEFAULT_SEVERITY);
        if !(MIN_SEVERITY..=MAX_SEVERITY).contains(&severity) {
            return Err(QuestionnaireError::SeverityOutOfRange(severity));
        }

        let notes = self.notes.as_deref().map(str::trim).unwrap_or_default();
        let notes_len = notes.chars().count();
        if notes_len > MAX_NOTES_CHARS {
            return Err(QuestionnaireError::NotesTooLong(notes_len));
        }

        Ok(Questionnaire {
            symptoms,
            age_years,
            sex: self.sex.unwrap_or(DEFAULT_SEX),
            duration: self.duration.unwrap_or(DEFAULT_DURATION_UNIT),
            duration_value: duration_value as u16,
            severity: severity as u8,
            fever: self.fever.unwrap_or(Answer::Unknown),
            pregnancy: self.pregnancy.unwrap_or(Answer::Unknown),
            red_flags: self.red_flags,
            notes: notes.to_string(),
        })
    }
}

/// Trim, drop blanks and de-duplicate (case-insensitive, first spelling kept).
fn normalize_symptoms(raw: &[String]) -> Result<Vec<String>, QuestionnaireError> {
    let mut seen = HashSet::new();
    let mut symptoms = Vec::new();

    for entry in raw {
        let trimmed = entry.trim();
        if trimmed.is_empty() {
            continue;
        }
        if trimmed.chars().count() > MAX_SYMPTOM_CHARS {
            return Err(QuestionnaireError::SymptomTooLong);
        }
        if seen.insert(trimmed.to_lowercase()) {
            symptoms.push(trimmed.to_string());
        }
    }

    match symptoms.len() {
        0 => Err(QuestionnaireError::NoSymptoms),
        n if n > MAX_SYMPTOMS => Err(QuestionnaireError::TooManySymptoms(n)),
        _ => Ok(symptoms),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn resolve_applies_form_defaults() {
        let q = QuestionnaireDraft::with_symptoms(["headache"]).resolve().unwrap();
        assert_eq!(q.symptoms(), ["headache"]);
        assert_eq!(q.age_years(), None);
        assert_eq!(q.sex(), Sex::PreferNotToSay);
        assert_eq!(q.duration(), DurationUnit::Days);
        assert_eq!(q.duration_value(), 2);
        assert_eq!(q.severity(), 3);
        assert_eq!(q.fever(), Answer::Unknown);
        assert_eq!(q.pregnancy(), Answer::Unknown);
        assert!(q.red_flags().active().is_empty());
        assert_eq!(q.notes(), "");
    }

    #[test]
    fn empty_symptoms_rejected() {
        let err = QuestionnaireDraft::with_symptoms(Vec::<String>::new())
            .resolve()
            .unwrap_err();
        assert_eq!(err, QuestionnaireError::NoSymptoms);
    }

    #[test]
    fn blank_symptoms_count_as_empty() {
        let err = QuestionnaireDraft::with_symptoms(["  ", ""]).resolve().unwrap_err();
        assert_eq!(err, QuestionnaireError::NoSymptoms);
    }

    #[test]
    fn symptoms_trimmed_and_deduplicated() {
        let q = QuestionnaireDraft::with_symptoms([" Cough ", "cough", "fever", "Fever "])
            .resolve()
            .unwrap();
        assert_eq!(q.symptoms(), ["Cough", "fever"]);
    }

    #[test]
    fn duplicates_do_not_count_toward_limit() {
        let mut symptoms: Vec<String> = (0..10).map(|i| format!("symptom {i}")).collect();
        symptoms.push("symptom 0".into());
        let q = QuestionnaireDraft::with_symptoms(symptoms).resolve().unwrap();
        assert_eq!(q.symptoms().len(), 10);
    }

    #[test]
    fn too_many_symptoms_rejected() {
        let symptoms: Vec<String> = (0..11).map(|i| format!("symptom {i}")).collect();
        let err = QuestionnaireDraft::with_symptoms(symptoms).resolve().unwrap_err();
        assert_eq!(err, QuestionnaireError::TooManySymptoms(11));
    }

    #[test]
    fn overlong_symptom_rejected() {
        let err = QuestionnaireDraft::with_symptoms(["x".repeat(201)])
            .resolve()
            .unwrap_err();
        assert_eq!(err, QuestionnaireError::SymptomTooLong);
    }

    #[test]
    fn age_bounds_inclusive() {
        for age in [0, 120] {
            let draft = QuestionnaireDraft {
                age_years: Some(age),
                ..QuestionnaireDraft::with_symptoms(["cough"])
            };
            assert_eq!(draft.resolve().unwrap().age_years(), Some(age as u8));
        }
        for age in [-1, 121] {
            let draft = QuestionnaireDraft {
                age_years: Some(age),
                ..QuestionnaireDraft::with_symptoms(["cough"])
            };
            assert_eq!(draft.resolve().unwrap_err(), QuestionnaireError::AgeOutOfRange(age));
        }
    }

    #[test]
    fn severity_and_duration_bounds() {
        let draft = QuestionnaireDraft {
            severity: Some(6),
            ..QuestionnaireDraft::with_symptoms(["cough"])
        };
        assert_eq!(draft.resolve().unwrap_err(), QuestionnaireError::SeverityOutOfRange(6));

        let draft = QuestionnaireDraft {
            severity: Some(0),
            ..QuestionnaireDraft::with_symptoms(["cough"])
        };
        assert_eq!(draft.resolve().unwrap_err(), QuestionnaireError::SeverityOutOfRange(0));

        let draft = QuestionnaireDraft {
            duration_value: Some(1000),
            ..QuestionnaireDraft::with_symptoms(["cough"])
        };
        assert_eq!(draft.resolve().unwrap_err(), QuestionnaireError::DurationOutOfRange(1000));

        let draft = QuestionnaireDraft {
            duration_value: Some(0),
            ..QuestionnaireDraft::with_symptoms(["cough"])
        };
        assert_eq!(draft.resolve().unwrap_err(), QuestionnaireError::DurationOutOfRange(0));
    }

    #[test]
    fn notes_length_checked() {
        let draft = QuestionnaireDraft {
            notes: Some("a".repeat(MAX_NOTES_CHARS + 1)),
            ..QuestionnaireDraft::with_symptoms(["cough"])
        };
        assert_eq!(
            draft.resolve().unwrap_err(),
            QuestionnaireError::NotesTooLong(MAX_NOTES_CHARS + 1)
        );
    }

    #[test]
    fn elapsed_hours_uses_unit() {
        let draft = QuestionnaireDraft {
            duration: Some(DurationUnit::Weeks),
            duration_value: Some(2),
            ..QuestionnaireDraft::with_symptoms(["cough"])
        };
        assert_eq!(draft.resolve().unwrap().elapsed_hours(), 336);
    }

    #[test]
    fn draft_deserializes_camel_case_wire_format() {
        let json = r#"{
            "symptoms": ["sore throat"],
            "ageYears": null,
            "sex": "female",
            "duration": "hours",
            "durationValue": 6,
            "severity": 2,
            "fever": "yes",
            "pregnancy": "no",
            "redFlags": {"chestPain": true, "suicidalThoughts": false},
            "notes": "started after a cold"
        }"#;
        let draft: QuestionnaireDraft = serde_json::from_str(json).unwrap();
        let q = draft.resolve().unwrap();
        assert_eq!(q.sex(), Sex::Female);
        assert_eq!(q.duration(), DurationUnit::Hours);
        assert_eq!(q.fever(), Answer::Yes);
        assert!(q.red_flags().chest_pain);
        assert!(!q.red_flags().trouble_breathing);
        assert_eq!(q.notes(), "started after a cold");
    }

    #[test]
    fn draft_rejects_non_sequence_symptoms() {
        let json = r#"{"symptoms": "headache"}"#;
        assert!(serde_json::from_str::<QuestionnaireDraft>(json).is_err());
    }

    #[test]
    fn red_flags_active_in_canonical_order() {
        let mut flags = RedFlags::default();
        flags.set(RedFlag::SuicidalThoughts, true);
        flags.set(RedFlag::ChestPain, true);
        assert_eq!(flags.active(), vec![RedFlag::ChestPain, RedFlag::SuicidalThoughts]);
        assert_eq!(flags.active_physical(), vec![RedFlag::ChestPain]);
        assert!(flags.any_physical());

        flags.set(RedFlag::ChestPain, false);
        assert!(!flags.any_physical());
    }

    #[test]
    fn red_flag_keys_match_serde_names() {
        for flag in RedFlag::ALL {
            let json = serde_json::to_string(&flag).unwrap();
            assert_eq!(json, format!("\"{}\"", flag.key()));

            let mut flags = RedFlags::default();
            flags.set(flag, true);
            let value = serde_json::to_value(flags).unwrap();
            assert_eq!(value[flag.key()], true);
        }
    }
}
