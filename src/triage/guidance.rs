//! Fixed guidance text used by the rule engine.
//!
//! Every list here is non-empty and within the output contract bounds so the
//! engine can copy them without further checks.

use crate::models::{Answer, Likelihood, PossibleCondition, Questionnaire, RedFlag, TriageLevel};

/// Non-diagnostic notice attached to every result.
pub const DISCLAIMER: &str = "This tool provides general health information, not a medical diagnosis. \
It cannot examine you or check vital signs. If you are worried, or symptoms get worse, \
contact a healthcare professional. In an emergency, call your local emergency number.";

/// Maximum hypotheses the engine reports.
const MAX_CONDITIONS: usize = 6;

// ── Per-level guidance ──────────────────────────────────────

pub fn summary(level: TriageLevel, questionnaire: &Questionnaire) -> String {
    let symptoms = symptom_phrase(questionnaire);
    match level {
        TriageLevel::Emergency => format!(
            "Your answers include warning signs alongside {symptoms} that need emergency care now."
        ),
        TriageLevel::Urgent => format!(
            "Your {symptoms} sound severe enough that you should be seen by a clinician today."
        ),
        TriageLevel::NonUrgent => format!(
            "Your {symptoms} should be reviewed by a clinician within the next few days."
        ),
        TriageLevel::SelfCare => format!(
            "Your {symptoms} can likely be managed at home with self-care and monitoring."
        ),
    }
}

pub fn self_care(level: TriageLevel) -> Vec<String> {
    let items: &[&str] = match level {
        TriageLevel::Emergency => &[
            "Do not drive yourself; stay still and keep someone with you while help is on the way",
            "Do not eat or drink until you have been assessed",
        ],
        TriageLevel::Urgent => &[
            "Rest and avoid strenuous activity until you have been seen",
            "Keep drinking small amounts of fluid regularly",
            "Have someone stay with you or check on you",
        ],
        TriageLevel::NonUrgent | TriageLevel::SelfCare => &[
            "Rest and get enough sleep",
            "Drink plenty of fluids",
            "Keep a short diary of your symptoms, including when they change",
            "Avoid alcohol and smoking while you recover",
        ],
    };
    to_owned(items)
}

pub fn pharmacy_advice(level: TriageLevel, questionnaire: &Questionnaire) -> Vec<String> {
    let mut items = match level {
        TriageLevel::Emergency => vec![
            "Do not delay emergency care to visit a pharmacy".to_string(),
        ],
        TriageLevel::Urgent => vec![
            "Do not rely on over-the-counter medicines in place of being seen today".to_string(),
            "Bring a list of any medicines you have already taken".to_string(),
        ],
        TriageLevel::NonUrgent | TriageLevel::SelfCare => vec![
            "A pharmacist can recommend over-the-counter options suited to your symptoms".to_string(),
            "Follow the dosing instructions on the label and do not combine products with the same active ingredient".to_string(),
            "Tell the pharmacist about any long-term conditions, allergies or other medicines".to_string(),
        ],
    };
    if questionnaire.pregnancy() == Answer::Yes && level != TriageLevel::Emergency {
        items.push(
            "You may be pregnant: check with a pharmacist or clinician before taking any medicine"
                .to_string(),
        );
    }
    items
}

pub fn see_doctor(level: TriageLevel) -> Vec<String> {
    let items: &[&str] = match level {
        TriageLevel::Emergency => &[
            "Go to the nearest emergency department or call an ambulance",
        ],
        TriageLevel::Urgent => &[
            "Get an appointment with a doctor or urgent care clinic today",
            "If you cannot be seen today, contact an out-of-hours service",
        ],
        TriageLevel::NonUrgent => &[
            "Book an appointment with your doctor within the next few days",
            "Seek care sooner if symptoms get worse",
        ],
        TriageLevel::SelfCare => &[
            "See a doctor if symptoms last longer than a week or keep coming back",
            "See a doctor sooner if symptoms get worse or new symptoms appear",
        ],
    };
    to_owned(items)
}

pub fn emergency_actions(level: TriageLevel) -> Vec<String> {
    let items: &[&str] = match level {
        TriageLevel::Emergency => &[
            "Call your local emergency number now (for example 911, 112 or 999)",
            "If you are alone, unlock the door and tell someone nearby",
            "Follow the instructions of the emergency operator",
        ],
        TriageLevel::Urgent | TriageLevel::NonUrgent | TriageLevel::SelfCare => &[
            "Call your local emergency number if any warning sign listed below appears",
        ],
    };
    to_owned(items)
}

/// Crisis guidance used when the self-harm flag is set.
pub fn crisis_actions() -> Vec<String> {
    to_owned(&[
        "If you might act on thoughts of harming yourself, call your local emergency number now",
        "Contact a crisis line right away (in the US call or text 988; elsewhere use your local crisis service)",
        "Stay with someone you trust and tell them how you are feeling",
        "Move away from anything you could use to harm yourself",
    ])
}

fn to_owned(items: &[&str]) -> Vec<String> {
    items.iter().map(|s| s.to_string()).collect()
}

fn symptom_phrase(questionnaire: &Questionnaire) -> String {
    match questionnaire.symptoms() {
        [only] => format!("symptom ({only})"),
        symptoms => format!("symptoms ({})", symptoms.join(", ")),
    }
}

// ── Red flags to watch ──────────────────────────────────────

/// Canonical warning signs not already reported, plus general escalation cues.
pub fn red_flags_to_watch(questionnaire: &Questionnaire) -> Vec<String> {
    let flags = questionnaire.red_flags();
    let mut items: Vec<String> = RedFlag::ALL
        .into_iter()
        .filter(|flag| !flags.is_set(*flag))
        .map(|flag| flag.description().to_string())
        .collect();

    if questionnaire.fever() == Answer::Yes {
        items.push("Fever above 39.5°C (103°F) or fever lasting more than 3 days".to_string());
    }
    items.push("Symptoms that get rapidly worse or do not improve as expected".to_string());
    items
}

// ── Possible conditions ─────────────────────────────────────

/// Keyword-matched hypothesis classes. Kept deliberately broad.
struct ConditionHint {
    keywords: &'static [&'static str],
    name: &'static str,
    why: &'static str,
}

static CONDITION_HINTS: &[ConditionHint] = &[
    ConditionHint {
        keywords: &["sore throat", "throat", "cough", "runny nose", "congestion", "sneez", "cold"],
        name: "Viral upper respiratory infection (such as a common cold)",
        why: "Throat, nose or cough symptoms are most often caused by common viral infections",
    },
    ConditionHint {
        keywords: &["flu", "body ache", "aches", "chills", "fatigue", "tired"],
        name: "Influenza-like illness",
        why: "Aches, chills and tiredness often accompany seasonal viral illnesses",
    },
    ConditionHint {
        keywords: &["headache", "migraine", "head pain"],
        name: "Tension-type headache or migraine",
        why: "Most headaches without warning signs are tension-type or migraine",
    },
    ConditionHint {
        keywords: &["nausea", "vomit", "diarrh", "stomach", "abdominal", "belly", "cramp"],
        name: "Gastroenteritis or another digestive upset",
        why: "Stomach and bowel symptoms are commonly caused by short-lived infections or food intolerance",
    },
    ConditionHint {
        keywords: &["rash", "itch", "hives", "skin", "spots"],
        name: "Skin irritation or mild allergic reaction",
        why: "Rashes and itching are frequently caused by irritants, allergies or viral rashes",
    },
    ConditionHint {
        keywords: &["back pain", "joint", "muscle", "sprain", "neck pain", "knee", "shoulder"],
        name: "Musculoskeletal strain",
        why: "Localized muscle or joint pain is often related to strain or overuse",
    },
    ConditionHint {
        keywords: &["urine", "urinat", "burning when", "bladder", "peeing"],
        name: "Urinary tract infection",
        why: "Urinary symptoms such as burning or frequency often point to a urinary infection",
    },
    ConditionHint {
        keywords: &["earache", "ear pain", "ear ache", "blocked ear"],
        name: "Ear infection or blocked ear",
        why: "Ear pain is commonly caused by infection or fluid behind the eardrum",
    },
    ConditionHint {
        keywords: &["eye"],
        name: "Conjunctivitis or eye irritation",
        why: "Red or itchy eyes are often caused by infection, allergy or irritation",
    },
    ConditionHint {
        keywords: &["anxiety", "anxious", "panic", "stress", "low mood", "sad", "sleep"],
        name: "Stress, anxiety or low mood",
        why: "Emotional symptoms and sleep problems often reflect stress or a mood condition",
    },
];

/// Hypotheses matched by the physical red flags.
fn red_flag_condition(flag: RedFlag) -> Option<(&'static str, &'static str)> {
    match flag {
        RedFlag::ChestPain => Some((
            "Heart or lung problem that needs urgent exclusion",
            "Chest pain can have serious cardiac or pulmonary causes that must be ruled out in person",
        )),
        RedFlag::TroubleBreathing => Some((
            "Breathing problem that needs urgent assessment",
            "Difficulty breathing can reflect asthma, infection or a cardiac cause",
        )),
        RedFlag::FaintingOrConfusion => Some((
            "Circulation or neurological problem that needs urgent assessment",
            "Fainting or confusion can signal low blood pressure, infection or a brain problem",
        )),
        RedFlag::SevereBleeding => Some((
            "Significant blood loss",
            "Severe bleeding can lead to shock and needs immediate control",
        )),
        RedFlag::SevereAllergicReaction => Some((
            "Possible anaphylaxis",
            "A severe allergic reaction can rapidly affect breathing and circulation",
        )),
        RedFlag::OneSidedWeaknessOrFaceDroop => Some((
            "Possible stroke",
            "Sudden one-sided weakness or face droop are classic stroke warning signs",
        )),
        RedFlag::SevereHeadacheSudden => Some((
            "Possible bleeding in or around the brain",
            "A sudden, severe headache needs urgent imaging to exclude a bleed",
        )),
        RedFlag::SuicidalThoughts => None,
    }
}

/// Build 1 to 6 non-committal hypotheses from the red flags and symptom text.
pub fn possible_conditions(questionnaire: &Questionnaire) -> Vec<PossibleCondition> {
    let mut conditions: Vec<PossibleCondition> = Vec::new();

    if questionnaire.red_flags().suicidal_thoughts {
        conditions.push(PossibleCondition {
            name: "Emotional crisis needing immediate support".into(),
            likelihood: Likelihood::High,
            why_it_fits: "You reported thoughts of suicide or self-harm".into(),
        });
    }

    for flag in questionnaire.red_flags().active_physical() {
        if let Some((name, why)) = red_flag_condition(flag) {
            conditions.push(PossibleCondition {
                name: name.into(),
                likelihood: Likelihood::Medium,
                why_it_fits: why.into(),
            });
        }
    }

    let text = questionnaire.symptoms().join(" ").to_lowercase();
    for hint in CONDITION_HINTS {
        if hint.keywords.iter().any(|kw| text.contains(kw)) {
            conditions.push(PossibleCondition {
                name: hint.name.into(),
                likelihood: Likelihood::Medium,
                why_it_fits: hint.why.into(),
            });
        }
    }

    if questionnaire.fever() == Answer::Yes {
        conditions.push(PossibleCondition {
            name: "Infection causing fever".into(),
            likelihood: Likelihood::Medium,
            why_it_fits: "Fever usually means the body is fighting an infection".into(),
        });
    }

    conditions.truncate(MAX_CONDITIONS - 1);
    conditions.push(PossibleCondition {
        name: "Non-specific viral or self-limiting illness".into(),
        likelihood: Likelihood::Low,
        why_it_fits: "Many short-lived symptoms settle without a specific cause being found".into(),
    });
    conditions
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{QuestionnaireDraft, RedFlags, GUIDANCE_ITEMS, RED_FLAGS_TO_WATCH};

    fn questionnaire(symptoms: &[&str], flags: RedFlags) -> Questionnaire {
        QuestionnaireDraft {
            red_flags: flags,
            ..QuestionnaireDraft::with_symptoms(symptoms.iter().copied())
        }
        .resolve()
        .unwrap()
    }

    #[test]
    fn guidance_lists_within_bounds_for_every_level() {
        let q = questionnaire(&["cough"], RedFlags::default());
        for level in TriageLevel::ALL {
            for list in [
                self_care(*level),
                pharmacy_advice(*level, &q),
                see_doctor(*level),
                emergency_actions(*level),
            ] {
                assert!(GUIDANCE_ITEMS.contains(&list.len()), "{level}: {}", list.len());
            }
        }
        assert!(GUIDANCE_ITEMS.contains(&crisis_actions().len()));
    }

    #[test]
    fn watch_list_excludes_triggered_flags() {
        let mut flags = RedFlags::default();
        flags.set(RedFlag::ChestPain, true);
        let q = questionnaire(&["chest pain"], flags);
        let watch = red_flags_to_watch(&q);
        assert!(!watch.contains(&RedFlag::ChestPain.description().to_string()));
        assert!(watch.contains(&RedFlag::TroubleBreathing.description().to_string()));
    }

    #[test]
    fn watch_list_never_empty_even_with_all_flags() {
        let mut flags = RedFlags::default();
        for flag in RedFlag::ALL {
            flags.set(flag, true);
        }
        let q = questionnaire(&["everything"], flags);
        let watch = red_flags_to_watch(&q);
        assert!(RED_FLAGS_TO_WATCH.contains(&watch.len()));
    }

    #[test]
    fn conditions_match_symptom_keywords() {
        let q = questionnaire(&["Sore throat", "headache"], RedFlags::default());
        let names: Vec<String> = possible_conditions(&q).into_iter().map(|c| c.name).collect();
        assert!(names.iter().any(|n| n.contains("upper respiratory")));
        assert!(names.iter().any(|n| n.contains("headache")));
        assert_eq!(names.last().unwrap(), "Non-specific viral or self-limiting illness");
    }

    #[test]
    fn conditions_fall_back_to_generic_hedge() {
        let q = questionnaire(&["something odd"], RedFlags::default());
        let conditions = possible_conditions(&q);
        assert_eq!(conditions.len(), 1);
        assert_eq!(conditions[0].likelihood, Likelihood::Low);
    }

    #[test]
    fn conditions_capped_at_six() {
        let mut flags = RedFlags::default();
        for flag in RedFlag::ALL {
            flags.set(flag, true);
        }
        let q = questionnaire(&["cough", "rash", "headache", "nausea"], flags);
        assert_eq!(possible_conditions(&q).len(), 6);
    }

    #[test]
    fn summary_mentions_symptoms() {
        let q = questionnaire(&["sore throat"], RedFlags::default());
        let text = summary(TriageLevel::SelfCare, &q);
        assert!(text.contains("sore throat"));
    }
}
