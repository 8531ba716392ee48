use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Persona used to narrate which domains a citizen touches and how often.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Character {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default, alias = "pain_points")]
    pub pain_points: Vec<String>,
    #[serde(default)]
    pub domains: BTreeMap<String, CharacterDomain>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CharacterDomain {
    #[serde(default)]
    pub priority: Option<String>,
    #[serde(default)]
    pub frequency: Option<String>,
    #[serde(default)]
    pub documents: Option<u32>,
    #[serde(default)]
    pub fields: Option<u32>,
    #[serde(default)]
    pub tasks: Vec<String>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct CharacterFile {
    #[serde(default)]
    pub(crate) characters: Vec<Character>,
}
