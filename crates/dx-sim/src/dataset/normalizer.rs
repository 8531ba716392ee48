use std::collections::BTreeMap;

use tracing::debug;

use crate::simulation::mode::{Mode, ModeTable};

use super::catalog::{
    Catalog, CatalogMeta, Condition, DemoMetrics, Document, DocumentFields, Domain, Field,
    FieldKind, FieldSource, ModeDescriptor,
};
use super::flows::{ChecklistItem, FlowCatalog, Question, QuestionOption, BASE_GROUP};
use super::parser::{
    RawCatalog, RawDemoMetrics, RawDocument, RawDocuments, RawDomain, RawField, RawFlows,
    RawInputFields, RawModeDescriptor,
};

pub(crate) fn normalize_catalog(raw: RawCatalog) -> Catalog {
    let default_mode = raw
        .meta
        .default_mode
        .as_deref()
        .map(Mode::parse_lenient)
        .unwrap_or_default();

    let meta = CatalogMeta {
        version: raw.meta.version,
        default_mode,
        cost_per_hour: raw.meta.demo_meta_info.and_then(|info| info.cost_per_hour),
    };

    Catalog {
        meta,
        domains: raw.domains.into_iter().map(normalize_domain).collect(),
        characters: Vec::new(),
    }
}

pub(crate) fn normalize_flows(raw: RawFlows) -> FlowCatalog {
    let base_questions = raw
        .base_questions
        .into_iter()
        .map(|question| Question {
            id: question.id,
            label: question.label,
            kind: question.kind.unwrap_or_else(|| "text".to_string()),
            required: question.required,
            placeholder: question.placeholder,
            options: question
                .options
                .into_iter()
                .map(|option| QuestionOption {
                    value: option.value,
                    label: option.label,
                })
                .collect(),
        })
        .collect();

    let checklist = raw
        .checklist
        .into_iter()
        .map(|item| ChecklistItem {
            key: item.key.unwrap_or_else(|| item.id.clone()),
            id: item.id,
            label: item.label,
        })
        .collect();

    let documents = raw
        .documents
        .into_iter()
        .map(|(group, documents)| {
            let normalized = documents
                .into_iter()
                .map(|document| normalize_document(document, &group))
                .collect();
            (group, normalized)
        })
        .collect();

    FlowCatalog {
        base_questions,
        checklist,
        documents,
        modes: normalize_modes(raw.modes),
    }
}

fn normalize_domain(raw: RawDomain) -> Domain {
    let documents = match raw.documents {
        RawDocuments::Flat(documents) => documents
            .into_iter()
            .map(|document| normalize_document(document, BASE_GROUP))
            .collect(),
        RawDocuments::Grouped(mut groups) => {
            let mut documents: Vec<Document> = groups
                .remove(BASE_GROUP)
                .unwrap_or_default()
                .into_iter()
                .map(|document| normalize_document(document, BASE_GROUP))
                .collect();
            for (group, raw_documents) in groups {
                documents.extend(
                    raw_documents
                        .into_iter()
                        .map(|document| normalize_document(document, &group)),
                );
            }
            documents
        }
    };

    Domain {
        id: raw.id,
        name: raw.name,
        emoji: raw.emoji,
        description: raw.description,
        documents,
        modes: normalize_modes(raw.modes),
        demo_metrics: raw.demo_metrics.map(normalize_demo_metrics),
    }
}

fn normalize_modes(mut raw: BTreeMap<String, RawModeDescriptor>) -> ModeTable<ModeDescriptor> {
    ModeTable::from_fn(|mode| {
        raw.remove(mode.key())
            .map(|descriptor| ModeDescriptor {
                title: descriptor.title,
                description: descriptor.description,
            })
            .unwrap_or_default()
    })
}

pub(crate) fn normalize_document(raw: RawDocument, group: &str) -> Document {
    let fields = match (raw.field_details, raw.input_fields) {
        (Some(details), _) if !details.is_empty() => {
            DocumentFields::Detailed(details.into_iter().map(normalize_field).collect())
        }
        (_, Some(RawInputFields::Detailed(fields))) => {
            DocumentFields::Detailed(fields.into_iter().map(normalize_field).collect())
        }
        (_, Some(RawInputFields::Counts(counts))) => DocumentFields::Legacy(counts_table(&counts)),
        (_, None) => DocumentFields::Legacy(ModeTable::default()),
    };

    let conditions = raw
        .conditions
        .iter()
        .filter_map(|condition| Condition::parse(condition))
        .collect();

    Document {
        id: raw.id,
        name: raw.name,
        description: raw.description,
        category: raw.category,
        group: group.to_string(),
        kind: FieldKind::parse(raw.kind.as_deref()),
        fields,
        conditions,
    }
}

fn counts_table(counts: &BTreeMap<String, u32>) -> ModeTable<Option<u32>> {
    ModeTable::from_fn(|mode| counts.get(mode.key()).copied())
}

/// Collapses the direct and `fieldDetails`-nested shapes into one [`Field`].
pub(crate) fn normalize_field(raw: RawField) -> Field {
    let (nested_source, nested_kind) = match raw.field_details {
        Some(details) => (details.source, details.kind),
        None => (None, None),
    };

    let source_tag = raw.source.or(nested_source);
    let source = source_tag.as_deref().and_then(|tag| {
        let parsed = FieldSource::parse(tag);
        if parsed.is_none() {
            debug!(field = %raw.id, tag, "unrecognized field source; counting as manual");
        }
        parsed
    });

    let kind = FieldKind::parse(raw.kind.as_deref().or(nested_kind.as_deref()));
    let label = if raw.label.is_empty() {
        raw.id.clone()
    } else {
        raw.label
    };

    Field {
        id: raw.id,
        label,
        source,
        required_if: raw.required_if,
        kind,
        required: raw.required.unwrap_or(true),
    }
}

fn normalize_demo_metrics(raw: RawDemoMetrics) -> DemoMetrics {
    DemoMetrics {
        daily_volume: raw.daily_volume.max(0.0),
        average_time_per_case: raw.average_time_per_case.max(0.0),
        reduction_rates: rate_table(&raw.reduction_rates),
        time_reduction_rates: rate_table(&raw.time_reduction_rates),
        cost_reduction_rates: rate_table(&raw.cost_reduction_percentage),
        administrative_dependency: raw.administrative_dependency.clamp(0.0, 1.0),
        implementation_cost: amount_table(&raw.implementation_cost),
        annual_maintenance_cost: amount_table(&raw.annual_maintenance_cost),
        impact_on_other_domains: raw
            .impact_on_other_domains
            .into_iter()
            .map(|(domain, weight)| (domain, weight.clamp(0.0, 1.0)))
            .collect(),
    }
}

fn rate_table(raw: &BTreeMap<String, f64>) -> ModeTable<f64> {
    ModeTable::from_fn(|mode| {
        raw.get(mode.key())
            .copied()
            .filter(|value| value.is_finite())
            .map(|value| value.clamp(0.0, 1.0))
            .unwrap_or(0.0)
    })
}

fn amount_table(raw: &BTreeMap<String, f64>) -> ModeTable<f64> {
    ModeTable::from_fn(|mode| {
        raw.get(mode.key())
            .copied()
            .filter(|value| value.is_finite())
            .map(|value| value.max(0.0))
            .unwrap_or(0.0)
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn raw_field(json: &str) -> RawField {
        serde_json::from_str(json).expect("raw field parses")
    }

    #[test]
    fn nested_field_details_source_is_lifted() {
        let field = normalize_field(raw_field(
            r#"{"id": "address", "fieldDetails": {"source": "mynumber"}}"#,
        ));
        assert_eq!(field.source, Some(FieldSource::MyNumber));
        assert_eq!(field.label, "address");
    }

    #[test]
    fn direct_source_wins_over_nested() {
        let field = normalize_field(raw_field(
            r#"{"id": "x", "source": "shared", "fieldDetails": {"source": "ai"}}"#,
        ));
        assert_eq!(field.source, Some(FieldSource::Shared));
    }

    #[test]
    fn unknown_source_and_blank_condition_are_neutralized() {
        let field = normalize_field(raw_field(
            r#"{"id": "x", "source": "telepathy", "requiredIf": "  "}"#,
        ));
        assert_eq!(field.source, None);
        assert_eq!(field.required_if, None);
        assert!(field.required);
    }

    #[test]
    fn legacy_counts_become_mode_table() {
        let raw: RawDocument = serde_json::from_str(
            r#"{"id": "claim", "name": "Claim", "inputFields": {"plain": 12, "ai": 2}}"#,
        )
        .expect("raw document parses");
        let document = normalize_document(raw, "claim");
        assert_eq!(document.group, "claim");
        assert_eq!(
            document.fields,
            DocumentFields::Legacy(ModeTable::new(Some(12), None, Some(2)))
        );
    }

    #[test]
    fn grouped_documents_put_base_first() {
        let raw: RawCatalog = serde_json::from_str(
            r#"{"domains": [{"id": "medical", "documents": {
                "emergency": [{"id": "e1", "inputFields": []}],
                "base": [{"id": "b1", "inputFields": []}]
            }}]}"#,
        )
        .expect("raw catalog parses");
        let catalog = normalize_catalog(raw);
        let ids: Vec<&str> = catalog.domains[0]
            .documents
            .iter()
            .map(|document| document.id.as_str())
            .collect();
        assert_eq!(ids, vec!["b1", "e1"]);
    }

    #[test]
    fn demo_rates_are_clamped() {
        let raw: RawDemoMetrics = serde_json::from_str(
            r#"{"dailyVolume": 100, "reductionRates": {"ai": 1.4, "smart": -0.2},
                "administrativeDependency": 2.0}"#,
        )
        .expect("raw metrics parse");
        let metrics = normalize_demo_metrics(raw);
        assert_eq!(metrics.reduction_rates.ai, 1.0);
        assert_eq!(metrics.reduction_rates.smart, 0.0);
        assert_eq!(metrics.administrative_dependency, 1.0);
    }
}
