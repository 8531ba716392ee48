use serde::{Serialize, Serializer};
use std::collections::BTreeMap;
use std::fmt;

use crate::simulation::mode::{Mode, ModeTable};

use super::characters::Character;

/// Domain id whose maturity every other domain partially depends on.
pub const ADMINISTRATION_DOMAIN_ID: &str = "administration";

/// Field count assumed for documents that carry no per-field metadata.
pub const DEFAULT_LEGACY_FIELD_COUNT: u32 = 8;

/// Declared origin of a field's value; decides when it can be filled automatically.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum FieldSource {
    /// Typed by the citizen every time.
    User,
    /// Reusable from another filing; needs online filing to reuse.
    Shared,
    /// Computable from other answers.
    Derived,
    /// Pulled from the national ID (My Number) system.
    MyNumber,
    /// Inferred by the assistant.
    Ai,
    /// Never required.
    Optional,
}

impl FieldSource {
    pub fn parse(raw: &str) -> Option<Self> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "user" => Some(Self::User),
            "shared" => Some(Self::Shared),
            "derived" => Some(Self::Derived),
            "mynumber" => Some(Self::MyNumber),
            "ai" => Some(Self::Ai),
            "optional" => Some(Self::Optional),
            _ => None,
        }
    }

    pub const fn key(self) -> &'static str {
        match self {
            Self::User => "user",
            Self::Shared => "shared",
            Self::Derived => "derived",
            Self::MyNumber => "mynumber",
            Self::Ai => "ai",
            Self::Optional => "optional",
        }
    }
}

/// Input widget kind; uploads and signatures cost extra time in the flow summary.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum FieldKind {
    #[default]
    Input,
    Upload,
    Signature,
}

impl FieldKind {
    pub fn parse(raw: Option<&str>) -> Self {
        match raw.map(|value| value.trim().to_ascii_lowercase()) {
            Some(value) if value == "upload" => Self::Upload,
            Some(value) if value == "signature" => Self::Signature,
            _ => Self::Input,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Field {
    pub id: String,
    pub label: String,
    /// `None` when the dataset omitted the tag or used an unknown one.
    pub source: Option<FieldSource>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub required_if: Option<String>,
    #[serde(rename = "type")]
    pub kind: FieldKind,
    /// Explicit `required: false` marker used by the admission flows.
    pub required: bool,
}

impl Field {
    pub fn new(id: impl Into<String>, source: Option<FieldSource>) -> Self {
        let id = id.into();
        Self {
            label: id.clone(),
            id,
            source,
            required_if: None,
            kind: FieldKind::Input,
            required: true,
        }
    }

    pub fn required_if(mut self, flag: impl Into<String>) -> Self {
        self.required_if = Some(flag.into());
        self
    }

    pub fn with_kind(mut self, kind: FieldKind) -> Self {
        self.kind = kind;
        self
    }
}

/// A flag gate on a whole document; `!flag` negates.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Condition {
    pub flag: String,
    pub negated: bool,
}

impl Condition {
    pub fn parse(raw: &str) -> Option<Self> {
        let trimmed = raw.trim();
        let (negated, flag) = match trimmed.strip_prefix('!') {
            Some(rest) => (true, rest.trim()),
            None => (false, trimmed),
        };
        if flag.is_empty() {
            return None;
        }
        Some(Self {
            flag: flag.to_string(),
            negated,
        })
    }
}

impl fmt::Display for Condition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.negated {
            write!(f, "!{}", self.flag)
        } else {
            f.write_str(&self.flag)
        }
    }
}

impl Serialize for Condition {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum DocumentFields {
    Detailed(Vec<Field>),
    /// Manual field count per mode; missing modes use [`DEFAULT_LEGACY_FIELD_COUNT`].
    Legacy(ModeTable<Option<u32>>),
}

impl DocumentFields {
    pub fn legacy_count(counts: &ModeTable<Option<u32>>, mode: Mode) -> u32 {
        counts.get(mode).unwrap_or(DEFAULT_LEGACY_FIELD_COUNT)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Document {
    pub id: String,
    pub name: String,
    pub description: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
    /// Group the document was listed under (`base` for unconditional documents).
    pub group: String,
    #[serde(rename = "type")]
    pub kind: FieldKind,
    #[serde(rename = "inputFields")]
    pub fields: DocumentFields,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub conditions: Vec<Condition>,
}

impl Document {
    pub fn detailed(id: impl Into<String>, name: impl Into<String>, fields: Vec<Field>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            description: String::new(),
            category: None,
            group: "base".to_string(),
            kind: FieldKind::Input,
            fields: DocumentFields::Detailed(fields),
            conditions: Vec::new(),
        }
    }

    pub fn with_conditions(mut self, conditions: &[&str]) -> Self {
        self.conditions = conditions
            .iter()
            .filter_map(|raw| Condition::parse(raw))
            .collect();
        self
    }

    pub fn declared_field_count(&self) -> usize {
        match &self.fields {
            DocumentFields::Detailed(fields) => fields.len(),
            DocumentFields::Legacy(_) => 0,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ModeDescriptor {
    pub title: String,
    pub description: String,
}

/// Society-scale figures used by the demo analysis.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DemoMetrics {
    pub daily_volume: f64,
    /// Minutes of staff time per case.
    pub average_time_per_case: f64,
    pub reduction_rates: ModeTable<f64>,
    pub time_reduction_rates: ModeTable<f64>,
    #[serde(rename = "costReductionPercentage")]
    pub cost_reduction_rates: ModeTable<f64>,
    pub administrative_dependency: f64,
    pub implementation_cost: ModeTable<f64>,
    pub annual_maintenance_cost: ModeTable<f64>,
    /// Domain id → weight this domain's maturity carries in that domain's realized rates.
    pub impact_on_other_domains: BTreeMap<String, f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Domain {
    pub id: String,
    pub name: String,
    pub emoji: String,
    pub description: String,
    pub documents: Vec<Document>,
    pub modes: ModeTable<ModeDescriptor>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub demo_metrics: Option<DemoMetrics>,
}

impl Domain {
    /// Trimmed variant for the short "game" experience.
    ///
    /// Keeps five documents and, for long documents, at most two fields per source
    /// and five overall.
    pub fn simplified(&self) -> Domain {
        let mut simplified = self.clone();
        simplified.documents.truncate(5);
        for document in &mut simplified.documents {
            if let DocumentFields::Detailed(fields) = &mut document.fields {
                if fields.len() > 5 {
                    *fields = balanced_fields(fields);
                }
            }
        }
        simplified
    }
}

fn balanced_fields(fields: &[Field]) -> Vec<Field> {
    let mut buckets: Vec<(Option<FieldSource>, Vec<Field>)> = Vec::new();
    for field in fields {
        match buckets.iter_mut().find(|(source, _)| *source == field.source) {
            Some((_, bucket)) => bucket.push(field.clone()),
            None => buckets.push((field.source, vec![field.clone()])),
        }
    }

    buckets
        .into_iter()
        .flat_map(|(_, bucket)| bucket.into_iter().take(2))
        .take(5)
        .collect()
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CatalogMeta {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub version: Option<String>,
    pub default_mode: Mode,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cost_per_hour: Option<f64>,
}

impl Default for CatalogMeta {
    fn default() -> Self {
        Self {
            version: None,
            default_mode: Mode::Plain,
            cost_per_hour: None,
        }
    }
}

/// Canonical, normalized domain dataset.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Catalog {
    pub meta: CatalogMeta,
    pub domains: Vec<Domain>,
    #[serde(skip)]
    pub characters: Vec<Character>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct CatalogStatistics {
    pub domains: usize,
    pub documents: usize,
    pub fields: usize,
    pub characters: usize,
}

impl Catalog {
    pub fn domain(&self, id: &str) -> Option<&Domain> {
        self.domains.iter().find(|domain| domain.id == id)
    }

    pub fn character(&self, id: &str) -> Option<&Character> {
        self.characters.iter().find(|character| character.id == id)
    }

    pub fn with_characters(mut self, characters: Vec<Character>) -> Self {
        self.characters = characters;
        self
    }

    pub fn statistics(&self) -> CatalogStatistics {
        let documents = self.domains.iter().map(|domain| domain.documents.len()).sum();
        let fields = self
            .domains
            .iter()
            .flat_map(|domain| domain.documents.iter())
            .map(Document::declared_field_count)
            .sum();

        CatalogStatistics {
            domains: self.domains.len(),
            documents,
            fields,
            characters: self.characters.len(),
        }
    }
}
