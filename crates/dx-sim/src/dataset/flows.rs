use serde::Serialize;
use std::collections::BTreeMap;

use crate::simulation::mode::ModeTable;

use super::catalog::{Document, ModeDescriptor};

/// Group key for documents every admission needs.
pub const BASE_GROUP: &str = "base";

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct QuestionOption {
    pub value: String,
    pub label: String,
}

/// Base question asked before any branch (name, insurance type, ...).
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Question {
    pub id: String,
    pub label: String,
    #[serde(rename = "type")]
    pub kind: String,
    pub required: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub placeholder: Option<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub options: Vec<QuestionOption>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChecklistItem {
    pub id: String,
    pub label: String,
    /// Flag the item toggles; defaults to the item id.
    pub key: String,
}

/// Hospital admission dataset: base questions plus flag-gated document groups.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FlowCatalog {
    pub base_questions: Vec<Question>,
    pub checklist: Vec<ChecklistItem>,
    pub documents: BTreeMap<String, Vec<Document>>,
    pub modes: ModeTable<ModeDescriptor>,
}

impl FlowCatalog {
    pub fn group(&self, key: &str) -> &[Document] {
        self.documents
            .get(key)
            .map(Vec::as_slice)
            .unwrap_or_default()
    }

    pub fn base_documents(&self) -> &[Document] {
        self.group(BASE_GROUP)
    }

    /// Every document in every group, base first.
    pub fn all_documents(&self) -> Vec<&Document> {
        let base = self.base_documents().iter();
        let rest = self
            .documents
            .iter()
            .filter(|(key, _)| key.as_str() != BASE_GROUP)
            .flat_map(|(_, documents)| documents.iter());
        base.chain(rest).collect()
    }
}
