use serde::Serialize;

use crate::dataset::catalog::{Document, DocumentFields};

use super::classifier::{classify, Classification};
use super::flags::EvaluationContext;
use super::mode::{Mode, ModeTable};
use super::requirement::{document_applies, is_field_required};

/// Handwriting, lookup and correction overhead per field on paper.
pub const PAPER_SECONDS_PER_FIELD: u32 = 45;
/// Typed entry per manual field; automated fields cost nothing.
pub const ELECTRONIC_SECONDS_PER_FIELD: u32 = 20;

/// Field partition for one document: `manual + auto + removed` equals the
/// declared field count.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct FieldTally {
    pub manual: u32,
    pub auto: u32,
    pub removed: u32,
}

impl FieldTally {
    pub fn required(&self) -> u32 {
        self.manual + self.auto
    }

    pub fn total(&self) -> u32 {
        self.required() + self.removed
    }
}

pub fn tally_document(document: &Document, mode: Mode, context: &EvaluationContext) -> FieldTally {
    let mut tally = FieldTally::default();
    match &document.fields {
        DocumentFields::Legacy(counts) => {
            tally.manual = DocumentFields::legacy_count(counts, mode);
        }
        DocumentFields::Detailed(fields) => {
            for field in fields {
                if !is_field_required(field, context) {
                    tally.removed += 1;
                    continue;
                }
                match classify(field, mode, context.capabilities) {
                    Classification::Manual => tally.manual += 1,
                    Classification::Automated(_) => tally.auto += 1,
                    Classification::Excluded => tally.removed += 1,
                }
            }
        }
    }
    tally
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ModeStats {
    pub mode: Mode,
    pub total_docs: u32,
    pub manual: u32,
    pub auto: u32,
    pub removed: u32,
    pub paper_time_minutes: u32,
    pub electronic_time_minutes: u32,
    pub time_saved_minutes: u32,
    pub reduction_rate_percent: u32,
}

impl ModeStats {
    pub fn required_fields(&self) -> u32 {
        self.manual + self.auto
    }
}

pub fn aggregate<'a, I>(documents: I, mode: Mode, context: &EvaluationContext) -> ModeStats
where
    I: IntoIterator<Item = &'a Document>,
{
    let mut total_docs = 0;
    let mut totals = FieldTally::default();

    for document in documents {
        let tally = tally_document(document, mode, context);
        if tally.required() > 0 {
            total_docs += 1;
        }
        totals.manual += tally.manual;
        totals.auto += tally.auto;
        totals.removed += tally.removed;
    }

    let required = totals.required();
    let paper_time_minutes = seconds_to_minutes(required * PAPER_SECONDS_PER_FIELD);
    let electronic_time_minutes = seconds_to_minutes(totals.manual * ELECTRONIC_SECONDS_PER_FIELD);

    ModeStats {
        mode,
        total_docs,
        manual: totals.manual,
        auto: totals.auto,
        removed: totals.removed,
        paper_time_minutes,
        electronic_time_minutes,
        time_saved_minutes: paper_time_minutes.saturating_sub(electronic_time_minutes),
        reduction_rate_percent: rounded_percent(totals.auto, required),
    }
}

/// Runs [`aggregate`] once per mode over the documents that apply; the modes
/// classify differently so no result is derived from another.
pub fn compare_modes(documents: &[Document], context: &EvaluationContext) -> ModeTable<ModeStats> {
    let applicable = applicable_documents(documents, context);
    ModeTable::from_fn(|mode| aggregate(applicable.iter().copied(), mode, context))
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DocumentBreakdown {
    pub id: String,
    pub name: String,
    pub manual: u32,
    pub auto: u32,
    pub removed: u32,
}

pub fn document_breakdown(
    documents: &[Document],
    mode: Mode,
    context: &EvaluationContext,
) -> Vec<DocumentBreakdown> {
    applicable_documents(documents, context)
        .into_iter()
        .map(|document| {
            let tally = tally_document(document, mode, context);
            DocumentBreakdown {
                id: document.id.clone(),
                name: document.name.clone(),
                manual: tally.manual,
                auto: tally.auto,
                removed: tally.removed,
            }
        })
        .collect()
}

/// Base documents plus the grouped and conditional ones the answers select.
pub fn applicable_documents<'a>(
    documents: &'a [Document],
    context: &EvaluationContext,
) -> Vec<&'a Document> {
    documents
        .iter()
        .filter(|document| document_applies(document, context))
        .collect()
}

pub(crate) fn seconds_to_minutes(seconds: u32) -> u32 {
    (f64::from(seconds) / 60.0).round() as u32
}

pub(crate) fn rounded_percent(part: u32, whole: u32) -> u32 {
    if whole == 0 {
        return 0;
    }
    (f64::from(part) / f64::from(whole) * 100.0).round() as u32
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dataset::catalog::{Field, FieldSource};
    use crate::simulation::flags::{Capabilities, FlagSet};

    fn admission_documents() -> Vec<Document> {
        let mut consent = Document::detailed(
            "surgery_consent",
            "Surgery consent",
            vec![
                Field::new("signature", Some(FieldSource::User)),
                Field::new("address", Some(FieldSource::Shared)),
            ],
        );
        consent.group = "surgery".to_string();
        vec![
            Document::detailed(
                "discharge_certificate",
                "Discharge certificate",
                vec![
                    Field::new("patient_name", Some(FieldSource::User)),
                    Field::new("ward", Some(FieldSource::User)),
                ],
            ),
            consent,
        ]
    }

    fn after_surgery(capabilities: Capabilities) -> EvaluationContext {
        EvaluationContext::new(
            FlagSet::new().with("surgery", true),
            FlagSet::new(),
            capabilities,
        )
    }

    #[test]
    fn admission_example_per_mode() {
        let plain = compare_modes(&admission_documents(), &after_surgery(Capabilities::default()));
        let plain = plain.plain;
        assert_eq!((plain.manual, plain.auto, plain.total_docs), (4, 0, 2));

        let online = after_surgery(Capabilities::new(false, true));
        let stats = compare_modes(&admission_documents(), &online);
        assert_eq!((stats.smart.manual, stats.smart.auto), (3, 1));
        assert_eq!((stats.ai.manual, stats.ai.auto), (3, 1));
        assert_eq!(stats.ai.reduction_rate_percent, 25);
    }

    #[test]
    fn unselected_groups_stay_out_of_the_totals() {
        let documents = admission_documents();
        let context = EvaluationContext::with_capabilities(Capabilities::new(false, true));

        let stats = compare_modes(&documents, &context);
        for mode in Mode::ordered() {
            let stats = stats.get(mode);
            assert_eq!((stats.total_docs, stats.manual, stats.auto), (1, 2, 0));
        }

        let ids: Vec<String> = document_breakdown(&documents, Mode::Ai, &context)
            .into_iter()
            .map(|document| document.id)
            .collect();
        assert_eq!(ids, vec!["discharge_certificate".to_string()]);
    }

    #[test]
    fn times_round_to_minutes() {
        let stats = aggregate(
            &admission_documents(),
            Mode::Plain,
            &EvaluationContext::default(),
        );
        // 4 fields * 45 s = 3 min; 4 * 20 s = 80 s ≈ 1 min
        assert_eq!(stats.paper_time_minutes, 3);
        assert_eq!(stats.electronic_time_minutes, 1);
        assert_eq!(stats.time_saved_minutes, 2);
    }

    #[test]
    fn unmet_required_if_counts_as_removed() {
        let documents = vec![Document::detailed(
            "er",
            "Emergency intake",
            vec![
                Field::new("triage", Some(FieldSource::User)).required_if("emergency"),
                Field::new("note", Some(FieldSource::Optional)),
            ],
        )];
        let context = EvaluationContext::new(
            FlagSet::new().with("emergency", false),
            FlagSet::new(),
            Capabilities::new(true, true),
        );

        for mode in Mode::ordered() {
            let stats = aggregate(&documents, mode, &context);
            assert_eq!((stats.manual, stats.auto, stats.removed), (0, 0, 2));
            assert_eq!(stats.total_docs, 0);
            assert_eq!(stats.reduction_rate_percent, 0);
        }
    }

    #[test]
    fn legacy_documents_count_as_manual() {
        let mut document = Document::detailed("claim", "Claim", Vec::new());
        document.fields = DocumentFields::Legacy(ModeTable::new(Some(12), Some(6), None));

        let context = EvaluationContext::default();
        assert_eq!(tally_document(&document, Mode::Smart, &context).manual, 6);
        assert_eq!(tally_document(&document, Mode::Ai, &context).manual, 8);
    }

    #[test]
    fn partition_holds_for_every_document() {
        let mut documents = admission_documents();
        documents.push(Document::detailed(
            "mixed",
            "Mixed",
            vec![
                Field::new("a", Some(FieldSource::Ai)),
                Field::new("b", Some(FieldSource::MyNumber)),
                Field::new("c", Some(FieldSource::Optional)),
                Field::new("d", Some(FieldSource::Derived)).required_if("surgery"),
                Field::new("e", None),
            ],
        ));
        let context = EvaluationContext::with_capabilities(Capabilities::new(true, true));

        for mode in Mode::ordered() {
            for document in &documents {
                let tally = tally_document(document, mode, &context);
                assert_eq!(tally.total() as usize, document.declared_field_count());
            }
        }
    }

    #[test]
    fn applicable_documents_respect_conditions() {
        let documents = vec![
            Document::detailed("base", "Base", Vec::new()),
            Document::detailed("proxy_letter", "Proxy letter", Vec::new())
                .with_conditions(&["proxy"]),
        ];
        let context = EvaluationContext::default();
        let ids: Vec<&str> = applicable_documents(&documents, &context)
            .into_iter()
            .map(|document| document.id.as_str())
            .collect();
        assert_eq!(ids, vec!["base"]);
    }
}
