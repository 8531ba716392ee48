//! Pure metrics engine. Every function recomputes from its inputs; nothing
//! here performs I/O or keeps state between calls.

pub mod aggregate;
pub mod classifier;
pub mod dependency;
pub mod flags;
pub mod flow_summary;
pub mod mode;
pub mod requirement;
pub mod roi;
pub mod scenario;
pub mod society;
pub mod strategy;

pub use aggregate::{
    aggregate, applicable_documents, compare_modes, document_breakdown, DocumentBreakdown,
    ModeStats, ELECTRONIC_SECONDS_PER_FIELD, PAPER_SECONDS_PER_FIELD,
};
pub use classifier::{classify, is_manual, AutomationChannel, Classification};
pub use dependency::{adjust_for_dependencies, AdjustedRates, MAX_PEER_PENALTY};
pub use flags::{Capabilities, EvaluationContext, FlagSet};
pub use flow_summary::{compare_flow, summarize_flow, FlowComparison, FlowSummary};
pub use mode::{DomainModes, Mode, ModeTable, View};
pub use requirement::{conditions_satisfied, document_applies, is_field_required};
pub use roi::{project_roi, RoiProjection, DEFAULT_HORIZON_YEARS};
pub use scenario::{select_documents, smart_selection, ScenarioFlag};
pub use society::{analyze_society, precompute, SocietyAnalysis};
pub use strategy::{evaluate_strategy, StrategyOutcome, StrategyPlan};
