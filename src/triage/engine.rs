//! Deterministic triage rules.
//!
//! Priority-ordered; a higher rule short-circuits the ones below it and the
//! verdict only ever moves upward:
//!
//! 1. Self-harm flag → emergency with crisis guidance.
//! 2. Any physical red flag → emergency, listing the flags that fired.
//! 3. Severity 5, or severity ≥ 4 with fever that began within
//!    `ACUTE_ONSET_HOURS` hours → urgent.
//! 4. Composite score (severity, onset, fever, pregnancy, age) mapped by
//!    `NON_URGENT_THRESHOLD` to non_urgent or self_care, with a non_urgent
//!    floor once symptoms have lasted `PERSISTENT_HOURS`.
//!
//! `decide` is total over a validated `Questionnaire`, performs no I/O and is
//! fully deterministic.

use crate::models::{Answer, DurationUnit, Questionnaire, TriageLevel, TriageResult};

use super::guidance;

/// Fever onset (in hours, unit = hours) that counts as acute for rule 3.
pub const ACUTE_ONSET_HOURS: u16 = 48;

/// Severity points per step on the 1–5 scale.
pub const SEVERITY_WEIGHT: u32 = 2;

/// Onset within this many hours adds `RECENT_ONSET_POINTS`.
pub const RECENT_ONSET_HOURS: u32 = 24;
pub const RECENT_ONSET_POINTS: u32 = 2;

/// Onset within this many hours (but after `RECENT_ONSET_HOURS`) adds `EARLY_ONSET_POINTS`.
pub const EARLY_ONSET_HOURS: u32 = 72;
pub const EARLY_ONSET_POINTS: u32 = 1;

pub const FEVER_POINTS: u32 = 2;
pub const PREGNANCY_POINTS: u32 = 2;

/// Ages below `YOUNG_CHILD_YEARS` or from `OLDER_ADULT_YEARS` add `AGE_POINTS`.
pub const YOUNG_CHILD_YEARS: u8 = 2;
pub const OLDER_ADULT_YEARS: u8 = 70;
pub const AGE_POINTS: u32 = 1;

/// Scores at or above this map to non_urgent; below it, self_care.
pub const NON_URGENT_THRESHOLD: u32 = 7;

/// Symptoms lasting at least this long (14 days) always warrant clinician review.
pub const PERSISTENT_HOURS: u32 = 14 * 24;

/// Rule identifiers for the audit log.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Rule {
    SelfHarm,
    RedFlag,
    HighSeverity,
    Score,
}

impl Rule {
    pub fn id(&self) -> &'static str {
        match self {
            Self::SelfHarm => "TRI-001",
            Self::RedFlag => "TRI-002",
            Self::HighSeverity => "TRI-003",
            Self::Score => "TRI-004",
        }
    }
}

/// Verdict plus the reasons that produced it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Assessment {
    pub level: TriageLevel,
    pub rule: Rule,
    pub rationale: Vec<String>,
}

/// Stateless rule engine; also usable as a `TriageAdvisor`.
#[derive(Debug, Clone, Copy, Default)]
pub struct RuleEngine;

impl RuleEngine {
    pub fn decide(&self, questionnaire: &Questionnaire) -> TriageResult {
        decide(questionnaire)
    }
}

/// Produce a complete, contract-valid triage result.
pub fn decide(questionnaire: &Questionnaire) -> TriageResult {
    let assessment = assess(questionnaire);
    let level = assessment.level;

    tracing::debug!(
        rule_id = assessment.rule.id(),
        level = level.as_str(),
        "Rule engine verdict"
    );

    let emergency_actions = match assessment.rule {
        Rule::SelfHarm => guidance::crisis_actions(),
        _ => guidance::emergency_actions(level),
    };

    let result = TriageResult {
        triage_level: level,
        summary: guidance::summary(level, questionnaire),
        rationale: assessment.rationale,
        possible_conditions: guidance::possible_conditions(questionnaire),
        self_care: guidance::self_care(level),
        pharmacy_advice: guidance::pharmacy_advice(level, questionnaire),
        see_doctor: guidance::see_doctor(level),
        emergency_actions,
        red_flags_to_watch: guidance::red_flags_to_watch(questionnaire),
        disclaimer: guidance::DISCLAIMER.to_string(),
    };

    debug_assert!(
        result.validate_for(questionnaire).is_ok(),
        "rule engine produced an invalid result: {:?}",
        result.validate_for(questionnaire)
    );

    result
}

/// Run the rules in priority order.
pub fn assess(questionnaire: &Questionnaire) -> Assessment {
    let flags = questionnaire.red_flags();

    // Rule 1: hard override
    if flags.suicidal_thoughts {
        return Assessment {
            level: TriageLevel::Emergency,
            rule: Rule::SelfHarm,
            rationale: vec![
                "You reported thoughts of suicide or self-harm, which always needs immediate crisis support"
                    .to_string(),
            ],
        };
    }

    // Rule 2: physical red flags
    let fired = flags.active_physical();
    if !fired.is_empty() {
        let mut rationale: Vec<String> = fired
            .iter()
            .map(|flag| format!("Red flag reported: {}", flag.description()))
            .collect();
        rationale.push("Any one of these warning signs needs emergency assessment".to_string());
        return Assessment {
            level: TriageLevel::Emergency,
            rule: Rule::RedFlag,
            rationale,
        };
    }

    // Rule 3: high severity
    if let Some(reason) = high_severity_reason(questionnaire) {
        return Assessment {
            level: TriageLevel::Urgent,
            rule: Rule::HighSeverity,
            rationale: vec![reason, "No emergency warning signs were reported".to_string()],
        };
    }

    // Rule 4: composite score
    score_assessment(questionnaire)
}

fn high_severity_reason(questionnaire: &Questionnaire) -> Option<String> {
    let severity = questionnaire.severity();
    if severity == 5 {
        return Some("Severity rated 5 out of 5".to_string());
    }
    let acute_fever = questionnaire.fever() == Answer::Yes
        && questionnaire.duration() == DurationUnit::Hours
        && questionnaire.duration_value() <= ACUTE_ONSET_HOURS;
    if severity >= 4 && acute_fever {
        return Some(format!(
            "Severity rated {severity} out of 5 with fever that started {} hours ago",
            questionnaire.duration_value()
        ));
    }
    None
}

/// Composite concern score and its contributing factors.
pub fn concern_score(questionnaire: &Questionnaire) -> (u32, Vec<String>) {
    let mut factors = Vec::new();
    let severity = u32::from(questionnaire.severity());
    let mut score = severity * SEVERITY_WEIGHT;
    factors.push(format!("Severity rated {severity} out of 5"));

    let elapsed = questionnaire.elapsed_hours();
    let onset_label = format!(
        "{} {}",
        questionnaire.duration_value(),
        questionnaire.duration().as_str()
    );
    if elapsed <= RECENT_ONSET_HOURS {
        score += RECENT_ONSET_POINTS;
        factors.push(format!("Symptoms started recently ({onset_label} ago)"));
    } else if elapsed <= EARLY_ONSET_HOURS {
        score += EARLY_ONSET_POINTS;
        factors.push(format!("Symptoms started within the last few days ({onset_label} ago)"));
    }

    if questionnaire.fever() == Answer::Yes {
        score += FEVER_POINTS;
        factors.push("Fever reported".to_string());
    }
    if questionnaire.pregnancy() == Answer::Yes {
        score += PREGNANCY_POINTS;
        factors.push("Possible pregnancy reported".to_string());
    }
    if let Some(age) = questionnaire.age_years() {
        if age < YOUNG_CHILD_YEARS || age >= OLDER_ADULT_YEARS {
            score += AGE_POINTS;
            factors.push(format!("Age {age} is in a higher-risk group"));
        }
    }

    (score, factors)
}

fn score_assessment(questionnaire: &Questionnaire) -> Assessment {
    let (score, mut rationale) = concern_score(questionnaire);

    let mut level = if score >= NON_URGENT_THRESHOLD {
        rationale.push("Overall picture warrants a clinician review".to_string());
        TriageLevel::NonUrgent
    } else {
        rationale.push("No warning signs and a low overall level of concern".to_string());
        TriageLevel::SelfCare
    };

    if questionnaire.elapsed_hours() >= PERSISTENT_HOURS && level < TriageLevel::NonUrgent {
        level = TriageLevel::NonUrgent;
        rationale.push("Symptoms lasting two weeks or more should be checked by a clinician".to_string());
    }

    Assessment {
        level,
        rule: Rule::Score,
        rationale,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{QuestionnaireDraft, RedFlag, RedFlags, Sex};

    fn base_draft() -> QuestionnaireDraft {
        QuestionnaireDraft {
            sex: Some(Sex::Female),
            age_years: Some(35),
            duration: Some(DurationUnit::Days),
            duration_value: Some(3),
            severity: Some(1),
            fever: Some(Answer::No),
            pregnancy: Some(Answer::No),
            ..QuestionnaireDraft::with_symptoms(["sore throat"])
        }
    }

    fn with_flag(flag: RedFlag) -> QuestionnaireDraft {
        let mut flags = RedFlags::default();
        flags.set(flag, true);
        QuestionnaireDraft {
            red_flags: flags,
            ..base_draft()
        }
    }

    fn level_of(draft: &QuestionnaireDraft) -> TriageLevel {
        decide(&draft.resolve().unwrap()).triage_level
    }

    fn all_drafts() -> Vec<QuestionnaireDraft> {
        let mut drafts = Vec::new();
        for unit in DurationUnit::ALL {
            for value in [1, 2, 3, 12, 24, 48, 49, 72, 999] {
                for fever in Answer::ALL {
                    for pregnancy in Answer::ALL {
                        for age in [None, Some(0), Some(1), Some(30), Some(70), Some(120)] {
                            drafts.push(QuestionnaireDraft {
                                duration: Some(*unit),
                                duration_value: Some(value),
                                fever: Some(*fever),
                                pregnancy: Some(*pregnancy),
                                age_years: age,
                                ..base_draft()
                            });
                        }
                    }
                }
            }
        }
        drafts
    }

    #[test]
    fn self_harm_always_emergency() {
        for mut draft in all_drafts() {
            draft.red_flags.set(RedFlag::SuicidalThoughts, true);
            for severity in 1..=5 {
                draft.severity = Some(severity);
                let q = draft.resolve().unwrap();
                let result = decide(&q);
                assert_eq!(result.triage_level, TriageLevel::Emergency);
                assert!(result
                    .emergency_actions
                    .iter()
                    .any(|a| a.contains("crisis line")));
            }
        }
    }

    #[test]
    fn every_physical_red_flag_is_emergency() {
        for flag in RedFlag::ALL {
            for severity in 1..=5 {
                let draft = QuestionnaireDraft {
                    severity: Some(severity),
                    ..with_flag(flag)
                };
                assert_eq!(level_of(&draft), TriageLevel::Emergency, "{flag:?}");
            }
        }
    }

    #[test]
    fn red_flag_rationale_lists_exactly_fired_flags() {
        let mut flags = RedFlags::default();
        flags.set(RedFlag::ChestPain, true);
        flags.set(RedFlag::SevereBleeding, true);
        let q = QuestionnaireDraft {
            red_flags: flags,
            ..base_draft()
        }
        .resolve()
        .unwrap();
        let assessment = assess(&q);
        assert_eq!(assessment.rule, Rule::RedFlag);
        let flagged: Vec<&String> = assessment
            .rationale
            .iter()
            .filter(|r| r.starts_with("Red flag reported"))
            .collect();
        assert_eq!(flagged.len(), 2);
        assert!(flagged[0].contains(RedFlag::ChestPain.description()));
        assert!(flagged[1].contains(RedFlag::SevereBleeding.description()));
    }

    #[test]
    fn all_lists_populated_for_every_input() {
        for draft in all_drafts() {
            for severity in 1..=5 {
                let q = QuestionnaireDraft {
                    severity: Some(severity),
                    ..draft.clone()
                }
                .resolve()
                .unwrap();
                let result = decide(&q);
                assert_eq!(result.validate_for(&q), Ok(()));
                assert!(!result.possible_conditions.is_empty());
                assert!(!result.self_care.is_empty());
                assert!(!result.pharmacy_advice.is_empty());
                assert!(!result.see_doctor.is_empty());
                assert!(!result.emergency_actions.is_empty());
                assert!(!result.red_flags_to_watch.is_empty());
            }
        }
    }

    #[test]
    fn severity_is_monotonic() {
        for draft in all_drafts() {
            let mut previous = 0;
            for severity in 1..=5 {
                let q = QuestionnaireDraft {
                    severity: Some(severity),
                    ..draft.clone()
                };
                let rank = level_of(&q).rank();
                assert!(rank >= previous, "severity {severity} lowered the verdict for {q:?}");
                previous = rank;
            }
        }
    }

    #[test]
    fn decide_is_deterministic() {
        let q = QuestionnaireDraft {
            severity: Some(3),
            fever: Some(Answer::Yes),
            ..base_draft()
        }
        .resolve()
        .unwrap();
        assert_eq!(decide(&q), decide(&q));
    }

    #[test]
    fn chest_pain_scenario_is_emergency() {
        let draft = QuestionnaireDraft {
            severity: Some(4),
            ..with_flag(RedFlag::ChestPain)
        };
        let draft = QuestionnaireDraft {
            symptoms: vec!["chest pain".into()],
            ..draft
        };
        assert_eq!(level_of(&draft), TriageLevel::Emergency);
    }

    #[test]
    fn mild_sore_throat_scenario_is_low_acuity() {
        let draft = QuestionnaireDraft {
            fever: None,
            pregnancy: None,
            age_years: None,
            ..base_draft()
        };
        let level = level_of(&draft);
        assert!(matches!(level, TriageLevel::SelfCare | TriageLevel::NonUrgent));
        assert_eq!(level, TriageLevel::SelfCare);
    }

    #[test]
    fn severity_five_is_urgent() {
        let draft = QuestionnaireDraft {
            severity: Some(5),
            ..base_draft()
        };
        assert_eq!(level_of(&draft), TriageLevel::Urgent);
    }

    #[test]
    fn severe_acute_fever_is_urgent() {
        let draft = QuestionnaireDraft {
            severity: Some(4),
            fever: Some(Answer::Yes),
            duration: Some(DurationUnit::Hours),
            duration_value: Some(ACUTE_ONSET_HOURS as i64),
            ..base_draft()
        };
        assert_eq!(level_of(&draft), TriageLevel::Urgent);

        let later = QuestionnaireDraft {
            duration_value: Some(ACUTE_ONSET_HOURS as i64 + 1),
            ..draft.clone()
        };
        assert_eq!(level_of(&later), TriageLevel::NonUrgent);

        let no_fever = QuestionnaireDraft {
            fever: Some(Answer::Unknown),
            ..draft
        };
        assert_ne!(level_of(&no_fever), TriageLevel::Urgent);
    }

    #[test]
    fn moderate_severity_crosses_threshold() {
        // 3 * 2 + 1 (onset ≤ 72h) = 7
        let draft = QuestionnaireDraft {
            severity: Some(3),
            ..base_draft()
        };
        let q = draft.resolve().unwrap();
        assert_eq!(concern_score(&q).0, NON_URGENT_THRESHOLD);
        assert_eq!(decide(&q).triage_level, TriageLevel::NonUrgent);
    }

    #[test]
    fn fever_and_pregnancy_raise_concern() {
        let mild = QuestionnaireDraft {
            severity: Some(2),
            duration_value: Some(5),
            ..base_draft()
        };
        assert_eq!(level_of(&mild), TriageLevel::SelfCare);

        let pregnant = QuestionnaireDraft {
            pregnancy: Some(Answer::Yes),
            fever: Some(Answer::Yes),
            ..mild
        };
        assert_eq!(level_of(&pregnant), TriageLevel::NonUrgent);
    }

    #[test]
    fn persistent_symptoms_need_review() {
        let draft = QuestionnaireDraft {
            severity: Some(1),
            duration: Some(DurationUnit::Weeks),
            duration_value: Some(2),
            ..base_draft()
        };
        let q = draft.resolve().unwrap();
        let assessment = assess(&q);
        assert_eq!(assessment.level, TriageLevel::NonUrgent);
        assert!(assessment.rationale.iter().any(|r| r.contains("two weeks")));
    }

    #[test]
    fn rule_ids_are_distinct() {
        let ids = [Rule::SelfHarm, Rule::RedFlag, Rule::HighSeverity, Rule::Score].map(|r| r.id());
        let unique: std::collections::HashSet<_> = ids.iter().collect();
        assert_eq!(unique.len(), ids.len());
    }
}
