use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::simulation::mode::View;

use super::{ProfileOverrides, SimulationState};

pub const SNAPSHOT_VERSION: u32 = 2;

#[derive(Debug, thiserror::Error)]
pub enum SnapshotError {
    #[error("snapshot version {0} is newer than supported version {SNAPSHOT_VERSION}")]
    UnsupportedVersion(u64),
    #[error("unrecognized snapshot shape")]
    Unrecognized,
    #[error("invalid snapshot: {0}")]
    Invalid(#[from] serde_json::Error),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StateSnapshot {
    pub version: u32,
    pub state: SimulationState,
    pub saved_at: DateTime<Utc>,
}

impl StateSnapshot {
    pub fn new(state: SimulationState, saved_at: DateTime<Utc>) -> Self {
        Self {
            version: SNAPSHOT_VERSION,
            state,
            saved_at,
        }
    }

    /// Upgrades any stored shape to the current version.
    ///
    /// Accepts current snapshots, the unversioned `{mode, checklist}` blob and
    /// bare profiles whose flags may be booleans or `"0"`/`"1"` strings.
    pub fn migrate(value: Value, now: DateTime<Utc>) -> Result<Self, SnapshotError> {
        let Value::Object(object) = value else {
            return Err(SnapshotError::Unrecognized);
        };

        match object.get("version").and_then(Value::as_u64) {
            Some(version) if version == u64::from(SNAPSHOT_VERSION) => {
                return Ok(serde_json::from_value(Value::Object(object))?);
            }
            Some(version) if version > u64::from(SNAPSHOT_VERSION) => {
                return Err(SnapshotError::UnsupportedVersion(version));
            }
            _ => {}
        }

        if object.contains_key("mode") || object.contains_key("checklist") {
            return Ok(Self::new(legacy_state(&object), now));
        }

        const PROFILE_KEYS: [&str; 4] = ["myna", "online", "consent_unify", "persona"];
        if PROFILE_KEYS.iter().any(|key| object.contains_key(*key)) {
            let mut state = SimulationState::new();
            state.profile = crate::state::Profile::merge(
                &state.profile,
                &legacy_profile(&object),
                &ProfileOverrides::default(),
            );
            return Ok(Self::new(state, now));
        }

        Err(SnapshotError::Unrecognized)
    }
}

fn legacy_state(object: &Map<String, Value>) -> SimulationState {
    let mut state = SimulationState::new();
    if let Some(view) = object.get("mode").and_then(Value::as_str).and_then(View::parse) {
        state.set_view(view);
    }
    if let Some(Value::Object(checklist)) = object.get("checklist") {
        for (flag, value) in checklist {
            if let Some(value) = parse_flag_value(value) {
                state.set_flag(flag.clone(), value);
            }
        }
    }
    if let Some(Value::Object(profile)) = object.get("profile") {
        state.profile = crate::state::Profile::merge(
            &state.profile,
            &legacy_profile(profile),
            &ProfileOverrides::default(),
        );
    }
    state
}

fn legacy_profile(object: &Map<String, Value>) -> ProfileOverrides {
    ProfileOverrides {
        myna: object.get("myna").and_then(parse_flag_value),
        online: object.get("online").and_then(parse_flag_value),
        consent_unify: object.get("consent_unify").and_then(parse_flag_value),
        persona: object
            .get("persona")
            .and_then(Value::as_str)
            .map(str::trim)
            .filter(|persona| !persona.is_empty())
            .map(str::to_string),
    }
}

/// Booleans as stored by older clients: `true`, `1`, `"1"`, `"true"` and their
/// negatives. Anything else is `None`.
pub fn parse_flag_value(value: &Value) -> Option<bool> {
    match value {
        Value::Bool(flag) => Some(*flag),
        Value::Number(number) => match number.as_i64() {
            Some(1) => Some(true),
            Some(0) => Some(false),
            _ => None,
        },
        Value::String(raw) => match raw.trim().to_ascii_lowercase().as_str() {
            "1" | "true" | "yes" | "on" => Some(true),
            "0" | "false" | "no" | "off" => Some(false),
            _ => None,
        },
        _ => None,
    }
}
