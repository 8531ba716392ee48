use serde::Serialize;

use crate::dataset::catalog::Document;
use crate::dataset::flows::{FlowCatalog, BASE_GROUP};

use super::flags::FlagSet;
use super::mode::ModeTable;

/// Checklist answers that pull a document group into an admission.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ScenarioFlag {
    Surgery,
    /// High-cost care (limit certificate) application.
    Hce,
    Claim,
    Proxy,
    Expensive,
    Transfer,
}

impl ScenarioFlag {
    pub const fn ordered() -> [Self; 6] {
        [
            Self::Surgery,
            Self::Hce,
            Self::Claim,
            Self::Proxy,
            Self::Expensive,
            Self::Transfer,
        ]
    }

    pub const fn key(self) -> &'static str {
        match self {
            Self::Surgery => "surgery",
            Self::Hce => "hce",
            Self::Claim => "claim",
            Self::Proxy => "proxy",
            Self::Expensive => "expensive",
            Self::Transfer => "transfer",
        }
    }

    pub fn parse(raw: &str) -> Option<Self> {
        Self::ordered()
            .into_iter()
            .find(|flag| flag.key() == raw.trim())
    }

    /// Smart-mode reminder that someone still has to decide this branch.
    pub const fn warning(self) -> &'static str {
        match self {
            Self::Surgery => "Surgery performed: decide via checklist",
            Self::Hce => "High-cost care application: decide via checklist",
            Self::Claim => "Insurance claim: decide via checklist",
            Self::Proxy => "Filing by proxy: decide via checklist",
            Self::Expensive => "Expensive treatment pre-approval: decide via checklist",
            Self::Transfer => "Hospital transfer planned: decide via checklist",
        }
    }

    /// AI-mode explanation of what the answer added.
    pub const fn judgment(self) -> &'static str {
        match self {
            Self::Surgery => "Surgery → add surgery and anesthesia consent forms",
            Self::Hce => "High-cost care application → add application forms",
            Self::Claim => "Insurance claim → add medical certificate",
            Self::Proxy => "Proxy filing → add letter of attorney",
            Self::Expensive => "Expensive treatment → add pre-approval request",
            Self::Transfer => "Transfer → add referral letter",
        }
    }
}

pub const MAX_JUDGMENT_LINES: usize = 3;
pub const BASE_ONLY_JUDGMENT: &str = "No branch applies → base documents only";

/// Base documents plus every group whose flag is set, in flag order.
pub fn select_documents<'a>(flows: &'a FlowCatalog, flags: &FlagSet) -> Vec<&'a Document> {
    let mut documents: Vec<&Document> = flows.base_documents().iter().collect();
    for flag in ScenarioFlag::ordered() {
        if flags.get(flag.key()) {
            documents.extend(flows.group(flag.key()));
        }
    }
    documents
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SmartSelection<'a> {
    pub base_documents: Vec<&'a Document>,
    pub conditional_documents: Vec<&'a Document>,
    pub warnings: Vec<&'static str>,
}

impl SmartSelection<'_> {
    pub fn document_count(&self) -> usize {
        self.base_documents.len() + self.conditional_documents.len()
    }
}

/// Smart view: selected groups plus one warning for every unanswered branch.
pub fn smart_selection<'a>(flows: &'a FlowCatalog, flags: &FlagSet) -> SmartSelection<'a> {
    let mut conditional_documents = Vec::new();
    let mut warnings = Vec::new();
    for flag in ScenarioFlag::ordered() {
        if flags.get(flag.key()) {
            conditional_documents.extend(flows.group(flag.key()));
        } else {
            warnings.push(flag.warning());
        }
    }

    SmartSelection {
        base_documents: flows.base_documents().iter().collect(),
        conditional_documents,
        warnings,
    }
}

/// Plain view: every document of every group, flag groups in flag order and
/// any other groups after them.
pub fn plain_documents(flows: &FlowCatalog) -> Vec<&Document> {
    let mut documents: Vec<&Document> = flows.base_documents().iter().collect();
    for flag in ScenarioFlag::ordered() {
        documents.extend(flows.group(flag.key()));
    }
    let known = |key: &str| key == BASE_GROUP || ScenarioFlag::parse(key).is_some();
    for (key, group) in &flows.documents {
        if !known(key.as_str()) {
            documents.extend(group);
        }
    }
    documents
}

/// AI view: exactly what the answers select.
pub fn ai_documents<'a>(flows: &'a FlowCatalog, flags: &FlagSet) -> Vec<&'a Document> {
    select_documents(flows, flags)
}

pub fn ai_judgment_lines(flags: &FlagSet) -> Vec<&'static str> {
    let lines: Vec<&'static str> = ScenarioFlag::ordered()
        .into_iter()
        .filter(|flag| flags.get(flag.key()))
        .map(ScenarioFlag::judgment)
        .take(MAX_JUDGMENT_LINES)
        .collect();

    if lines.is_empty() {
        vec![BASE_ONLY_JUDGMENT]
    } else {
        lines
    }
}

/// Headline counts of the mode comparison bars.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FlowMetrics {
    pub documents: ModeTable<usize>,
    pub inputs: ModeTable<usize>,
    /// Branches left for a human to decide in Smart mode.
    pub warnings: usize,
}

pub fn flow_metrics(flows: &FlowCatalog, flags: &FlagSet) -> FlowMetrics {
    let smart = smart_selection(flows, flags);
    let inputs = flows.base_questions.len();
    let scaled = |share: f64, floor: usize| {
        ((inputs as f64 * share).round() as usize).max(floor)
    };

    FlowMetrics {
        documents: ModeTable::new(
            plain_documents(flows).len(),
            smart.document_count(),
            ai_documents(flows, flags).len(),
        ),
        inputs: ModeTable::new(inputs, scaled(0.6, 3), scaled(0.3, 2)),
        warnings: smart.warnings.len(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dataset::fallback::fallback_flows;

    #[test]
    fn selection_appends_flagged_groups_in_order() {
        let flows = fallback_flows();
        let flags = FlagSet::new().with("hce", true).with("surgery", true);
        let ids: Vec<&str> = select_documents(&flows, &flags)
            .into_iter()
            .map(|document| document.id.as_str())
            .collect();
        assert_eq!(
            ids,
            vec!["discharge_certificate", "surgery_consent", "hce_application"]
        );
    }

    #[test]
    fn smart_selection_warns_for_each_unset_flag() {
        let flows = fallback_flows();
        let selection = smart_selection(&flows, &FlagSet::new().with("surgery", true));
        assert_eq!(selection.document_count(), 2);
        assert_eq!(selection.warnings.len(), 5);
        assert_eq!(selection.warnings[0], ScenarioFlag::Hce.warning());
    }

    #[test]
    fn judgment_lines_are_capped() {
        let all: FlagSet = ScenarioFlag::ordered()
            .into_iter()
            .map(|flag| (flag.key(), true))
            .collect();
        assert_eq!(ai_judgment_lines(&all).len(), MAX_JUDGMENT_LINES);
        assert_eq!(ai_judgment_lines(&FlagSet::new()), vec![BASE_ONLY_JUDGMENT]);
    }

    #[test]
    fn metrics_scale_inputs_with_floors() {
        let flows = fallback_flows();
        let metrics = flow_metrics(&flows, &FlagSet::new().with("surgery", true));
        assert_eq!(metrics.documents, ModeTable::new(3, 2, 2));
        // two base questions: round(1.2) and round(0.6) fall below the floors
        assert_eq!(metrics.inputs, ModeTable::new(2, 3, 2));
        assert_eq!(metrics.warnings, 5);
    }
}
