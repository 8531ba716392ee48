//! Dataset shapes exactly as the JSON files and the legacy API serve them.

use serde::{Deserialize, Deserializer};
use std::collections::BTreeMap;

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct RawCatalog {
    #[serde(default)]
    pub(crate) meta: RawMeta,
    #[serde(default)]
    pub(crate) domains: Vec<RawDomain>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct RawMeta {
    #[serde(default)]
    pub(crate) version: Option<String>,
    #[serde(default, deserialize_with = "empty_string_as_none")]
    pub(crate) default_mode: Option<String>,
    #[serde(default)]
    pub(crate) demo_meta_info: Option<RawDemoMetaInfo>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct RawDemoMetaInfo {
    #[serde(default)]
    pub(crate) cost_per_hour: Option<f64>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct RawDomain {
    pub(crate) id: String,
    #[serde(default)]
    pub(crate) name: String,
    #[serde(default)]
    pub(crate) emoji: String,
    #[serde(default)]
    pub(crate) description: String,
    #[serde(default)]
    pub(crate) documents: RawDocuments,
    #[serde(default)]
    pub(crate) modes: BTreeMap<String, RawModeDescriptor>,
    #[serde(default)]
    pub(crate) demo_metrics: Option<RawDemoMetrics>,
}

/// Domains list documents either flat or grouped (`{"base": [...], ...}`).
#[derive(Debug, Deserialize)]
#[serde(untagged)]
pub(crate) enum RawDocuments {
    Flat(Vec<RawDocument>),
    Grouped(BTreeMap<String, Vec<RawDocument>>),
}

impl Default for RawDocuments {
    fn default() -> Self {
        Self::Flat(Vec::new())
    }
}

#[derive(Debug, Default, Deserialize)]
pub(crate) struct RawModeDescriptor {
    #[serde(default)]
    pub(crate) title: String,
    #[serde(default)]
    pub(crate) description: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct RawDocument {
    pub(crate) id: String,
    #[serde(default)]
    pub(crate) name: String,
    #[serde(default)]
    pub(crate) description: String,
    #[serde(default, deserialize_with = "empty_string_as_none")]
    pub(crate) category: Option<String>,
    #[serde(default, rename = "type")]
    pub(crate) kind: Option<String>,
    #[serde(default)]
    pub(crate) input_fields: Option<RawInputFields>,
    #[serde(default)]
    pub(crate) field_details: Option<Vec<RawField>>,
    #[serde(default)]
    pub(crate) conditions: Vec<String>,
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
pub(crate) enum RawInputFields {
    Detailed(Vec<RawField>),
    Counts(BTreeMap<String, u32>),
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct RawField {
    #[serde(default)]
    pub(crate) id: String,
    #[serde(default)]
    pub(crate) label: String,
    #[serde(default, deserialize_with = "empty_string_as_none")]
    pub(crate) source: Option<String>,
    #[serde(default, deserialize_with = "empty_string_as_none")]
    pub(crate) required_if: Option<String>,
    #[serde(default, rename = "type")]
    pub(crate) kind: Option<String>,
    #[serde(default)]
    pub(crate) required: Option<bool>,
    #[serde(default)]
    pub(crate) field_details: Option<RawFieldDetails>,
}

#[derive(Debug, Default, Deserialize)]
pub(crate) struct RawFieldDetails {
    #[serde(default, deserialize_with = "empty_string_as_none")]
    pub(crate) source: Option<String>,
    #[serde(default, rename = "type")]
    pub(crate) kind: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct RawDemoMetrics {
    #[serde(default)]
    pub(crate) daily_volume: f64,
    #[serde(default)]
    pub(crate) average_time_per_case: f64,
    #[serde(default)]
    pub(crate) reduction_rates: BTreeMap<String, f64>,
    #[serde(default)]
    pub(crate) time_reduction_rates: BTreeMap<String, f64>,
    #[serde(default)]
    pub(crate) cost_reduction_percentage: BTreeMap<String, f64>,
    #[serde(default)]
    pub(crate) administrative_dependency: f64,
    #[serde(default)]
    pub(crate) implementation_cost: BTreeMap<String, f64>,
    #[serde(default)]
    pub(crate) annual_maintenance_cost: BTreeMap<String, f64>,
    #[serde(default)]
    pub(crate) impact_on_other_domains: BTreeMap<String, f64>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct RawFlows {
    #[serde(default)]
    pub(crate) base_questions: Vec<RawQuestion>,
    #[serde(default)]
    pub(crate) checklist: Vec<RawChecklistItem>,
    #[serde(default)]
    pub(crate) documents: BTreeMap<String, Vec<RawDocument>>,
    #[serde(default)]
    pub(crate) modes: BTreeMap<String, RawModeDescriptor>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct RawQuestion {
    pub(crate) id: String,
    #[serde(default)]
    pub(crate) label: String,
    #[serde(default, rename = "type")]
    pub(crate) kind: Option<String>,
    #[serde(default)]
    pub(crate) required: bool,
    #[serde(default)]
    pub(crate) placeholder: Option<String>,
    #[serde(default)]
    pub(crate) options: Vec<RawQuestionOption>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct RawQuestionOption {
    pub(crate) value: String,
    #[serde(default)]
    pub(crate) label: String,
}

#[derive(Debug, Deserialize)]
pub(crate) struct RawChecklistItem {
    pub(crate) id: String,
    #[serde(default)]
    pub(crate) label: String,
    #[serde(default)]
    pub(crate) key: Option<String>,
}

fn empty_string_as_none<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let opt = Option::<String>::deserialize(deserializer)?;
    Ok(opt.filter(|value| !value.trim().is_empty()))
}
