use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Raised when a wire string does not name a known variant.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("Invalid value '{value}' for {field}")]
pub struct InvalidEnum {
    pub field: String,
    pub value: String,
}

/// Macro to generate a closed enum with as_str + std::str::FromStr pattern.
/// Variant order is the ordering used by `Ord`.
macro_rules! str_enum {
    ($(#[$meta:meta])* $name:ident { $($variant:ident => $s:literal),+ $(,)? }) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        pub enum $name {
            $(#[serde(rename = $s)] $variant),+
        }

        impl $name {
            pub const ALL: &'static [$name] = &[$(Self::$variant),+];

            pub fn as_str(&self) -> &'static str {
                match self {
                    $(Self::$variant => $s),+
                }
            }
        }

        impl std::str::FromStr for $name {
            type Err = InvalidEnum;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                match s {
                    $($s => Ok(Self::$variant)),+,
                    _ => Err(InvalidEnum {
                        field: stringify!($name).into(),
                        value: s.into(),
                    }),
                }
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                f.write_str(self.as_str())
            }
        }
    };
}

str_enum!(Sex {
    Female => "female",
    Male => "male",
    Intersex => "intersex",
    PreferNotToSay => "prefer_not_to_say",
});

str_enum!(DurationUnit {
    Hours => "hours",
    Days => "days",
    Weeks => "weeks",
    Months => "months",
});

str_enum!(
    /// Three-way answer used for fever and pregnancy.
    Answer {
        Yes => "yes",
        No => "no",
        Unknown => "unknown",
    }
);

str_enum!(
    /// Triage verdict, ordered from least to most escalated.
    TriageLevel {
        SelfCare => "self_care",
        NonUrgent => "non_urgent",
        Urgent => "urgent",
        Emergency => "emergency",
    }
);

str_enum!(Likelihood {
    Low => "low",
    Medium => "medium",
    High => "high",
});

impl DurationUnit {
    /// Hours represented by one unit. Months count as 30 days.
    pub fn hours(&self) -> u32 {
        match self {
            Self::Hours => 1,
            Self::Days => 24,
            Self::Weeks => 24 * 7,
            Self::Months => 24 * 30,
        }
    }
}

impl TriageLevel {
    /// Escalation rank: self_care = 0 … emergency = 3.
    pub fn rank(&self) -> u8 {
        match self {
            Self::SelfCare => 0,
            Self::NonUrgent => 1,
            Self::Urgent => 2,
            Self::Emergency => 3,
        }
    }

    /// Short patient-facing label.
    pub fn label(&self) -> &'static str {
        match self {
            Self::SelfCare => "Self-care",
            Self::NonUrgent => "Non-urgent",
            Self::Urgent => "Urgent",
            Self::Emergency => "Emergency",
        }
    }
}
