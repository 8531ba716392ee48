//! The user's answers and selections, plus their persisted snapshots.

mod snapshot;
mod store;

pub use snapshot::{parse_flag_value, SnapshotError, StateSnapshot, SNAPSHOT_VERSION};
pub use store::{FileSnapshotStore, InMemorySnapshotStore, SnapshotStore, StoreError};

use serde::{Deserialize, Serialize};

use crate::simulation::flags::{Capabilities, EvaluationContext, FlagSet};
use crate::simulation::mode::{DomainModes, Mode, View};
use crate::simulation::strategy::{earned_hidden_points, ViewHistory};

pub const DEFAULT_PERSONA: &str = "citizen";

/// Who the citizen is and what they can do.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Profile {
    #[serde(default)]
    pub myna: bool,
    #[serde(default)]
    pub online: bool,
    #[serde(default)]
    pub consent_unify: bool,
    #[serde(default = "default_persona")]
    pub persona: String,
}

fn default_persona() -> String {
    DEFAULT_PERSONA.to_string()
}

impl Default for Profile {
    fn default() -> Self {
        Self {
            myna: false,
            online: false,
            consent_unify: false,
            persona: default_persona(),
        }
    }
}

/// Partial profile; `None` leaves the underlying value alone.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProfileOverrides {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub myna: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub online: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub consent_unify: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub persona: Option<String>,
}

impl ProfileOverrides {
    /// Reads query-string style pairs (`myna=1`); unknown keys are ignored.
    pub fn from_pairs<'a>(pairs: impl IntoIterator<Item = (&'a str, &'a str)>) -> Self {
        let mut overrides = Self::default();
        for (key, value) in pairs {
            let flag = parse_flag_value(&serde_json::Value::String(value.to_string()));
            match key {
                "myna" => overrides.myna = flag.or(overrides.myna),
                "online" => overrides.online = flag.or(overrides.online),
                "consent_unify" => overrides.consent_unify = flag.or(overrides.consent_unify),
                "persona" if !value.trim().is_empty() => {
                    overrides.persona = Some(value.trim().to_string())
                }
                _ => {}
            }
        }
        overrides
    }

    fn apply_to(&self, profile: &mut Profile) {
        if let Some(myna) = self.myna {
            profile.myna = myna;
        }
        if let Some(online) = self.online {
            profile.online = online;
        }
        if let Some(consent_unify) = self.consent_unify {
            profile.consent_unify = consent_unify;
        }
        if let Some(persona) = &self.persona {
            profile.persona = persona.clone();
        }
    }
}

impl Profile {
    /// Layers `defaults < stored < overrides`.
    pub fn merge(defaults: &Profile, stored: &ProfileOverrides, overrides: &ProfileOverrides) -> Self {
        let mut merged = defaults.clone();
        stored.apply_to(&mut merged);
        overrides.apply_to(&mut merged);
        merged
    }

    pub fn capabilities(&self) -> Capabilities {
        Capabilities::new(self.myna, self.online)
    }
}

/// Single owner of everything the user has chosen.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SimulationState {
    #[serde(default)]
    pub view: View,
    #[serde(default)]
    pub checklist: FlagSet,
    #[serde(default)]
    pub derived: FlagSet,
    #[serde(default)]
    pub profile: Profile,
    #[serde(default)]
    pub domain_modes: DomainModes,
    /// Views opened per domain; feeds the strategy board's hidden points.
    #[serde(default)]
    pub viewed: ViewHistory,
}

impl SimulationState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_flag(&mut self, flag: impl Into<String>, value: bool) {
        self.checklist.set(flag, value);
    }

    pub fn set_derived_flag(&mut self, flag: impl Into<String>, value: bool) {
        self.derived.set(flag, value);
    }

    pub fn set_mode(&mut self, mode: Mode) {
        self.view = View::from(mode);
    }

    pub fn set_view(&mut self, view: View) {
        self.view = view;
    }

    pub fn set_domain_mode(&mut self, domain_id: impl Into<String>, mode: Mode) {
        self.domain_modes.set(domain_id, mode);
    }

    pub fn set_profile(&mut self, profile: Profile) {
        self.profile = profile;
    }

    pub fn record_view(&mut self, domain_id: impl Into<String>, view: View) {
        self.viewed.entry(domain_id.into()).or_default().insert(view);
    }

    /// Clears answers and selections; the profile and earned view history stay.
    pub fn reset(&mut self) {
        self.view = View::default();
        self.checklist.clear();
        self.derived.clear();
        self.domain_modes = DomainModes::default();
    }

    /// Mode to classify with; the summary view falls back to Plain.
    pub fn active_mode(&self) -> Mode {
        self.view.mode().unwrap_or_default()
    }

    pub fn evaluation_context(&self) -> EvaluationContext {
        EvaluationContext::new(
            self.checklist.clone(),
            self.derived.clone(),
            self.profile.capabilities(),
        )
    }

    pub fn hidden_points(&self) -> std::collections::BTreeSet<String> {
        earned_hidden_points(&self.viewed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn merge_layers_overrides_last() {
        let stored = ProfileOverrides {
            myna: Some(true),
            persona: Some("student".to_string()),
            ..ProfileOverrides::default()
        };
        let url = ProfileOverrides::from_pairs([("myna", "0"), ("online", "1"), ("mode", "ai")]);

        let profile = Profile::merge(&Profile::default(), &stored, &url);
        assert!(!profile.myna);
        assert!(profile.online);
        assert!(!profile.consent_unify);
        assert_eq!(profile.persona, "student");
    }

    #[test]
    fn mutations_feed_the_evaluation_context() {
        let mut state = SimulationState::new();
        state.set_flag("surgery", true);
        state.set_derived_flag("proxy", true);
        state.set_profile(Profile {
            online: true,
            ..Profile::default()
        });
        state.set_mode(Mode::Smart);

        let context = state.evaluation_context();
        assert!(context.flag("surgery"));
        assert!(context.flag("proxy"));
        assert!(context.capabilities.online);
        assert_eq!(state.active_mode(), Mode::Smart);
    }

    #[test]
    fn reset_keeps_profile_and_history() {
        let mut state = SimulationState::new();
        state.set_flag("hce", true);
        state.set_domain_mode("medical", Mode::Ai);
        state.set_view(View::Summary);
        state.record_view("disaster", View::Summary);
        state.profile.myna = true;

        state.reset();
        assert!(state.checklist.is_empty());
        assert!(state.domain_modes.is_empty());
        assert_eq!(state.view, View::Plain);
        assert!(state.profile.myna);
        assert!(state.hidden_points().contains("disaster"));
    }

    #[test]
    fn summary_view_classifies_as_plain() {
        let mut state = SimulationState::new();
        state.set_view(View::Summary);
        assert_eq!(state.active_mode(), Mode::Plain);
    }
}
