use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Named boolean answers. Absent flags read as `false`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FlagSet(BTreeMap<String, bool>);

impl FlagSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, flag: impl Into<String>, value: bool) -> Self {
        self.set(flag, value);
        self
    }

    pub fn set(&mut self, flag: impl Into<String>, value: bool) {
        self.0.insert(flag.into(), value);
    }

    pub fn get(&self, flag: &str) -> bool {
        self.0.get(flag).copied().unwrap_or(false)
    }

    pub fn contains(&self, flag: &str) -> bool {
        self.0.contains_key(flag)
    }

    /// Copies every entry of `other` over this set.
    pub fn extend_from(&mut self, other: &FlagSet) {
        for (flag, value) in &other.0 {
            self.0.insert(flag.clone(), *value);
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, bool)> {
        self.0.iter().map(|(flag, value)| (flag.as_str(), *value))
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn clear(&mut self) {
        self.0.clear();
    }
}

impl<K: Into<String>> FromIterator<(K, bool)> for FlagSet {
    fn from_iter<I: IntoIterator<Item = (K, bool)>>(iter: I) -> Self {
        Self(iter.into_iter().map(|(flag, value)| (flag.into(), value)).collect())
    }
}

/// What the citizen can do, independent of the paperwork at hand.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Capabilities {
    /// Holds a national ID (My Number) card usable for data linkage.
    #[serde(default, alias = "myna")]
    pub national_id: bool,
    /// Can file online, which unlocks reuse of shared data.
    #[serde(default)]
    pub online: bool,
}

impl Capabilities {
    pub const fn new(national_id: bool, online: bool) -> Self {
        Self {
            national_id,
            online,
        }
    }
}

/// Everything the classifier and requirement evaluator read.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EvaluationContext {
    /// Checklist answers toggled by the citizen.
    #[serde(default)]
    pub checklist: FlagSet,
    /// Flags inferred from branch-question answers.
    #[serde(default)]
    pub derived: FlagSet,
    #[serde(default)]
    pub capabilities: Capabilities,
}

impl EvaluationContext {
    pub fn new(checklist: FlagSet, derived: FlagSet, capabilities: Capabilities) -> Self {
        Self {
            checklist,
            derived,
            capabilities,
        }
    }

    pub fn with_capabilities(capabilities: Capabilities) -> Self {
        Self {
            capabilities,
            ..Self::default()
        }
    }

    /// Set in either namespace.
    pub fn flag(&self, name: &str) -> bool {
        self.checklist.get(name) || self.derived.get(name)
    }

    /// Unset in both namespaces.
    pub fn flag_cleared(&self, name: &str) -> bool {
        !self.checklist.get(name) && !self.derived.get(name)
    }
}
