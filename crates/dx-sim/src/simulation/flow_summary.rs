//! Field-level summary of an admission flow, per mode, with a rough
//! completion-time estimate.

use serde::Serialize;

use crate::dataset::catalog::{Document, DocumentFields, FieldKind};
use crate::dataset::flows::FlowCatalog;

use super::classifier::{classify, AutomationChannel, Classification};
use super::flags::{Capabilities, EvaluationContext, FlagSet};
use super::mode::{Mode, ModeTable};
use super::requirement::is_field_required;
use super::scenario::select_documents;

pub const MANUAL_FIELD_SECONDS: u32 = 8;
pub const UPLOAD_SECONDS: u32 = 25;
pub const SIGNATURE_SECONDS: u32 = 10;
pub const AI_QUESTION_SECONDS: u32 = 4;
/// Share of automated fields the assistant confirms with a question.
pub const AI_QUESTION_SHARE: f64 = 0.25;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct ChannelCounts {
    pub shared: u32,
    pub derived: u32,
    pub mynumber: u32,
    pub ai: u32,
}

impl ChannelCounts {
    pub fn record(&mut self, channel: AutomationChannel) {
        match channel {
            AutomationChannel::Shared => self.shared += 1,
            AutomationChannel::Derived => self.derived += 1,
            AutomationChannel::MyNumber => self.mynumber += 1,
            AutomationChannel::Ai => self.ai += 1,
        }
    }

    pub fn get(&self, channel: AutomationChannel) -> u32 {
        match channel {
            AutomationChannel::Shared => self.shared,
            AutomationChannel::Derived => self.derived,
            AutomationChannel::MyNumber => self.mynumber,
            AutomationChannel::Ai => self.ai,
        }
    }

    pub fn total(&self) -> u32 {
        self.shared + self.derived + self.mynumber + self.ai
    }

    fn absorb(&mut self, other: &ChannelCounts) {
        self.shared += other.shared;
        self.derived += other.derived;
        self.mynumber += other.mynumber;
        self.ai += other.ai;
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FormSummary {
    pub id: String,
    pub name: String,
    pub total: u32,
    pub manual: u32,
    pub automated: ChannelCounts,
    pub uploads: u32,
    pub signatures: u32,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FlowSummary {
    pub mode: Mode,
    pub total: u32,
    pub manual: u32,
    pub auto: u32,
    pub uploads: u32,
    pub signatures: u32,
    pub forms: Vec<FormSummary>,
}

pub fn summarize_flow(
    flows: &FlowCatalog,
    flags: &FlagSet,
    mode: Mode,
    capabilities: Capabilities,
) -> FlowSummary {
    let context = EvaluationContext::new(flags.clone(), FlagSet::new(), capabilities);
    let forms: Vec<FormSummary> = select_documents(flows, flags)
        .into_iter()
        .map(|document| summarize_form(document, mode, &context))
        .collect();

    let mut summary = FlowSummary {
        mode,
        total: 0,
        manual: 0,
        auto: 0,
        uploads: 0,
        signatures: 0,
        forms: Vec::new(),
    };
    for form in &forms {
        summary.total += form.total;
        summary.manual += form.manual;
        summary.auto += form.total - form.manual;
        summary.uploads += form.uploads;
        summary.signatures += form.signatures;
    }
    summary.forms = forms;
    summary
}

fn summarize_form(document: &Document, mode: Mode, context: &EvaluationContext) -> FormSummary {
    let mut form = FormSummary {
        id: document.id.clone(),
        name: document.name.clone(),
        total: 0,
        manual: 0,
        automated: ChannelCounts::default(),
        uploads: 0,
        signatures: 0,
    };

    match &document.fields {
        DocumentFields::Detailed(fields) if !fields.is_empty() => {
            for field in fields {
                if !is_field_required(field, context) {
                    continue;
                }
                match classify(field, mode, context.capabilities) {
                    Classification::Manual => {
                        form.total += 1;
                        form.manual += 1;
                        match field.kind {
                            FieldKind::Upload => form.uploads += 1,
                            FieldKind::Signature => form.signatures += 1,
                            FieldKind::Input => {}
                        }
                    }
                    Classification::Automated(channel) => {
                        form.total += 1;
                        form.automated.record(channel);
                    }
                    Classification::Excluded => {}
                }
            }
        }
        DocumentFields::Legacy(counts) => {
            let count = DocumentFields::legacy_count(counts, mode);
            form.total = count;
            form.manual = count;
            legacy_attachments(&mut form, document.kind);
        }
        DocumentFields::Detailed(_) => {
            let count = DocumentFields::legacy_count(&ModeTable::default(), mode);
            form.total = count;
            form.manual = count;
            legacy_attachments(&mut form, document.kind);
        }
    }

    form
}

/// Without field details a document's own type stands in for one attachment.
fn legacy_attachments(form: &mut FormSummary, kind: FieldKind) {
    match kind {
        FieldKind::Upload => form.uploads = 1,
        FieldKind::Signature => form.signatures = 1,
        FieldKind::Input => {}
    }
}

pub fn estimate_flow_seconds(summary: &FlowSummary) -> u32 {
    let mut seconds = summary.manual * MANUAL_FIELD_SECONDS
        + summary.uploads * UPLOAD_SECONDS
        + summary.signatures * SIGNATURE_SECONDS;
    if summary.mode == Mode::Ai {
        let questions = (f64::from(summary.auto) * AI_QUESTION_SHARE).ceil() as u32;
        seconds += questions * AI_QUESTION_SECONDS;
    }
    seconds
}

/// `round((from - to) / from * 100)`; zero when there is nothing to reduce.
pub fn percent_reduction(from: u32, to: u32) -> i32 {
    if from == 0 {
        return 0;
    }
    let from = f64::from(from);
    ((from - f64::from(to)) / from * 100.0).round() as i32
}

pub fn automation_channels(summary: &FlowSummary) -> ChannelCounts {
    let mut channels = ChannelCounts::default();
    for form in &summary.forms {
        channels.absorb(&form.automated);
    }
    channels
}

/// Plain-versus-AI comparison shown on the summary page.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FlowComparison {
    pub summaries: ModeTable<FlowSummary>,
    pub seconds: ModeTable<u32>,
    pub manual_reduction_percent: i32,
    pub time_reduction_percent: i32,
    pub channels: ChannelCounts,
}

pub fn compare_flow(
    flows: &FlowCatalog,
    flags: &FlagSet,
    capabilities: Capabilities,
) -> FlowComparison {
    let summaries = ModeTable::from_fn(|mode| summarize_flow(flows, flags, mode, capabilities));
    let seconds = summaries.map(estimate_flow_seconds);

    FlowComparison {
        manual_reduction_percent: percent_reduction(summaries.plain.manual, summaries.ai.manual),
        time_reduction_percent: percent_reduction(seconds.plain, seconds.ai),
        channels: automation_channels(&summaries.ai),
        summaries,
        seconds,
    }
}
