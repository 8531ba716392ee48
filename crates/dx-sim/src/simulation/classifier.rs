//! Decides, per field and mode, whether a person still has to type the value.

use serde::Serialize;

use crate::dataset::catalog::{Field, FieldSource};

use super::flags::Capabilities;
use super::mode::Mode;

/// Source that filled an automated field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum AutomationChannel {
    Shared,
    Derived,
    MyNumber,
    Ai,
}

impl AutomationChannel {
    pub const fn ordered() -> [Self; 4] {
        [Self::Shared, Self::Derived, Self::MyNumber, Self::Ai]
    }

    pub const fn label(self) -> &'static str {
        match self {
            Self::Shared => "shared data reuse",
            Self::Derived => "derived values",
            Self::MyNumber => "national ID linkage",
            Self::Ai => "AI inference",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase", tag = "kind", content = "channel")]
pub enum Classification {
    Manual,
    Automated(AutomationChannel),
    /// Never counted; optional fields are dropped before classification.
    Excluded,
}

pub fn classify(field: &Field, mode: Mode, capabilities: Capabilities) -> Classification {
    let Some(source) = field.source else {
        return Classification::Manual;
    };

    let automated = match (source, mode) {
        (FieldSource::Optional, _) => return Classification::Excluded,
        (FieldSource::User, _) => None,
        (FieldSource::Shared, Mode::Smart | Mode::Ai) if capabilities.online => {
            Some(AutomationChannel::Shared)
        }
        (FieldSource::Derived, Mode::Smart | Mode::Ai) => Some(AutomationChannel::Derived),
        (FieldSource::MyNumber, Mode::Ai) if capabilities.national_id => {
            Some(AutomationChannel::MyNumber)
        }
        (FieldSource::Ai, Mode::Ai) => Some(AutomationChannel::Ai),
        _ => None,
    };

    automated.map_or(Classification::Manual, Classification::Automated)
}

pub fn is_manual(field: &Field, mode: Mode, capabilities: Capabilities) -> bool {
    classify(field, mode, capabilities) == Classification::Manual
}

#[cfg(test)]
mod tests {
    use super::*;

    const SOURCES: [Option<FieldSource>; 7] = [
        None,
        Some(FieldSource::User),
        Some(FieldSource::Shared),
        Some(FieldSource::Derived),
        Some(FieldSource::MyNumber),
        Some(FieldSource::Ai),
        Some(FieldSource::Optional),
    ];

    fn all_capabilities() -> [Capabilities; 4] {
        [
            Capabilities::new(false, false),
            Capabilities::new(true, false),
            Capabilities::new(false, true),
            Capabilities::new(true, true),
        ]
    }

    #[test]
    fn user_and_unknown_sources_stay_manual() {
        let everything = Capabilities::new(true, true);
        for mode in Mode::ordered() {
            assert!(is_manual(&Field::new("name", Some(FieldSource::User)), mode, everything));
            assert!(is_manual(&Field::new("memo", None), mode, everything));
        }
    }

    #[test]
    fn shared_needs_online_filing() {
        let field = Field::new("address", Some(FieldSource::Shared));
        assert!(is_manual(&field, Mode::Plain, Capabilities::new(false, true)));
        assert!(is_manual(&field, Mode::Smart, Capabilities::default()));
        assert_eq!(
            classify(&field, Mode::Smart, Capabilities::new(false, true)),
            Classification::Automated(AutomationChannel::Shared)
        );
    }

    #[test]
    fn mynumber_needs_ai_and_national_id() {
        let field = Field::new("income", Some(FieldSource::MyNumber));
        let with_card = Capabilities::new(true, false);
        assert!(is_manual(&field, Mode::Smart, with_card));
        assert!(is_manual(&field, Mode::Ai, Capabilities::default()));
        assert!(!is_manual(&field, Mode::Ai, with_card));
    }

    #[test]
    fn optional_is_neither_manual_nor_automated() {
        let field = Field::new("note", Some(FieldSource::Optional));
        for mode in Mode::ordered() {
            assert_eq!(
                classify(&field, mode, Capabilities::new(true, true)),
                Classification::Excluded
            );
            assert!(!is_manual(&field, mode, Capabilities::default()));
        }
    }

    #[test]
    fn automation_never_regresses_with_maturity() {
        for source in SOURCES {
            let field = Field::new("f", source);
            for capabilities in all_capabilities() {
                let automated = Mode::ordered().map(|mode| {
                    matches!(
                        classify(&field, mode, capabilities),
                        Classification::Automated(_)
                    )
                });
                assert!(!automated[0] || automated[1], "{source:?} plain ⊄ smart");
                assert!(!automated[1] || automated[2], "{source:?} smart ⊄ ai");
            }
        }
    }
}
