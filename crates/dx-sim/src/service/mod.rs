//! Request-level operations over the loaded datasets and the snapshot store.

mod router;
#[cfg(test)]
mod tests;

pub use router::simulation_router;

use std::collections::{BTreeSet, HashMap};
use std::sync::{Arc, Mutex, MutexGuard};

use chrono::Utc;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::config::SimulationConfig;
use crate::dataset::{Catalog, Document, FlowCatalog};
use crate::simulation::aggregate::{
    applicable_documents, compare_modes, document_breakdown, DocumentBreakdown, ModeStats,
};
use crate::simulation::flags::{EvaluationContext, FlagSet};
use crate::simulation::flow_summary::{compare_flow, summarize_flow, FlowComparison, FlowSummary};
use crate::simulation::mode::{DomainModes, Mode, ModeTable};
use crate::simulation::roi::{project_roi, RoiProjection, MAX_HORIZON_YEARS};
use crate::simulation::scenario::{
    ai_judgment_lines, flow_metrics, plain_documents, select_documents, smart_selection,
    FlowMetrics, SmartSelection,
};
use crate::simulation::society::{analyze_society, resolve_cost_per_hour, SocietyAnalysis};
use crate::simulation::strategy::{
    baselines, evaluate_strategy, StrategyOutcome, StrategyPlan, CHALLENGES, COMPLETION_BONUS_KEY,
};
use crate::state::{
    Profile, ProfileOverrides, SimulationState, SnapshotStore, StateSnapshot, StoreError,
};

/// Flags and profile a domain comparison is evaluated under.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ComparisonRequest {
    #[serde(default)]
    pub checklist: FlagSet,
    #[serde(default)]
    pub derived: FlagSet,
    #[serde(default)]
    pub profile: ProfileOverrides,
    /// Use the trimmed "game" variant of the domain.
    #[serde(default)]
    pub simplified: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DomainComparison {
    pub domain_id: String,
    pub name: String,
    pub profile: Profile,
    pub modes: ModeTable<ModeStats>,
    pub documents: ModeTable<Vec<DocumentBreakdown>>,
    /// Documents whose conditions hold, as listed by the AI view.
    pub applicable_documents: Vec<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalysisRequest {
    #[serde(default)]
    pub domain_modes: DomainModes,
    /// Mode for every domain `domain_modes` leaves out.
    #[serde(default)]
    pub default_mode: Option<Mode>,
    #[serde(default)]
    pub cost_per_hour: Option<f64>,
    #[serde(default)]
    pub horizon_years: Option<u32>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RoiRequest {
    pub annual_saving: f64,
    #[serde(default)]
    pub implementation_cost: f64,
    #[serde(default)]
    pub annual_maintenance: f64,
    #[serde(default)]
    pub horizon_years: Option<u32>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FlowSelectionRequest {
    #[serde(default)]
    pub flags: FlagSet,
    #[serde(default)]
    pub profile: ProfileOverrides,
    #[serde(default)]
    pub mode: Mode,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FlowSelection<'a> {
    pub mode: Mode,
    /// Documents the chosen mode shows.
    pub documents: Vec<&'a Document>,
    pub smart: SmartSelection<'a>,
    pub judgment: Vec<&'static str>,
    pub metrics: FlowMetrics,
    pub summary: FlowSummary,
    pub comparison: FlowComparison,
}

/// Operations behind the `/api/v1` routes and the CLI.
pub struct SimulationService<S> {
    catalog: Arc<Catalog>,
    flows: Arc<FlowCatalog>,
    store: Arc<S>,
    settings: SimulationConfig,
    warnings: Vec<String>,
    key_locks: KeyLocks,
}

/// One mutex per store key; writes to the same key run one at a time.
#[derive(Default)]
struct KeyLocks {
    locks: Mutex<HashMap<String, Arc<Mutex<()>>>>,
}

impl KeyLocks {
    fn for_key(&self, key: &str) -> Result<Arc<Mutex<()>>, StoreError> {
        let mut locks = self.locks.lock().map_err(|_| poisoned())?;
        Ok(locks.entry(key.to_string()).or_default().clone())
    }
}

fn poisoned() -> StoreError {
    StoreError::Unavailable("state lock poisoned".to_string())
}

fn hold(lock: &Mutex<()>) -> Result<MutexGuard<'_, ()>, StoreError> {
    lock.lock().map_err(|_| poisoned())
}

impl<S> SimulationService<S>
where
    S: SnapshotStore + 'static,
{
    pub fn new(
        catalog: Arc<Catalog>,
        flows: Arc<FlowCatalog>,
        store: Arc<S>,
        settings: SimulationConfig,
    ) -> Self {
        Self {
            catalog,
            flows,
            store,
            settings,
            warnings: Vec::new(),
            key_locks: KeyLocks::default(),
        }
    }

    /// Attaches the fallback warnings produced while loading the datasets.
    pub fn with_warnings(mut self, warnings: Vec<String>) -> Self {
        self.warnings = warnings;
        self
    }

    pub fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    pub fn flows(&self) -> &FlowCatalog {
        &self.flows
    }

    pub fn warnings(&self) -> &[String] {
        &self.warnings
    }

    pub fn degraded(&self) -> bool {
        !self.warnings.is_empty()
    }

    /// Per-mode statistics of one domain under the request's flags and profile.
    pub fn domain_comparison(
        &self,
        domain_id: &str,
        request: &ComparisonRequest,
    ) -> Result<DomainComparison, SimulationServiceError> {
        let domain = self
            .catalog
            .domain(domain_id)
            .ok_or_else(|| SimulationServiceError::UnknownDomain(domain_id.to_string()))?;
        let domain = if request.simplified {
            domain.simplified()
        } else {
            domain.clone()
        };

        let profile = Profile::merge(
            &Profile::default(),
            &ProfileOverrides::default(),
            &request.profile,
        );
        let context = EvaluationContext::new(
            request.checklist.clone(),
            request.derived.clone(),
            profile.capabilities(),
        );

        let modes = compare_modes(&domain.documents, &context);
        debug!(
            domain = %domain.id,
            plain_manual = modes.plain.manual,
            smart_manual = modes.smart.manual,
            ai_manual = modes.ai.manual,
            "domain comparison computed"
        );

        Ok(DomainComparison {
            documents: ModeTable::from_fn(|mode| {
                document_breakdown(&domain.documents, mode, &context)
            }),
            applicable_documents: applicable_documents(&domain.documents, &context)
                .into_iter()
                .map(|document| document.id.clone())
                .collect(),
            domain_id: domain.id,
            name: domain.name,
            profile,
            modes,
        })
    }

    pub fn analysis(
        &self,
        request: &AnalysisRequest,
    ) -> Result<SocietyAnalysis, SimulationServiceError> {
        let horizon = self.horizon(request.horizon_years)?;
        let cost_per_hour = match request.cost_per_hour {
            Some(cost) if !cost.is_finite() || cost < 0.0 => {
                return Err(SimulationServiceError::InvalidInput(format!(
                    "costPerHour must be a non-negative number (got {cost})"
                )));
            }
            Some(cost) => cost,
            None => resolve_cost_per_hour(self.settings.cost_per_hour, &self.catalog),
        };

        let mut domain_modes = match request.default_mode {
            Some(mode) => DomainModes::uniform(
                self.catalog.domains.iter().map(|domain| domain.id.as_str()),
                mode,
            ),
            None => DomainModes::new(),
        };
        for (domain_id, mode) in request.domain_modes.iter() {
            domain_modes.set(domain_id, mode);
        }

        let analysis = analyze_society(&self.catalog, &domain_modes, cost_per_hour, horizon);
        debug!(
            domains = analysis.domains.len(),
            annual_cost_saving = analysis.annual_cost_saving,
            "society analysis computed"
        );
        Ok(analysis)
    }

    pub fn roi(&self, request: &RoiRequest) -> Result<RoiProjection, SimulationServiceError> {
        let horizon = self.horizon(request.horizon_years)?;
        let amounts = [
            ("annualSaving", request.annual_saving),
            ("implementationCost", request.implementation_cost),
            ("annualMaintenance", request.annual_maintenance),
        ];
        if let Some((name, value)) = amounts
            .iter()
            .find(|(_, value)| !value.is_finite() || *value < 0.0)
        {
            return Err(SimulationServiceError::InvalidInput(format!(
                "{name} must be a non-negative number (got {value})"
            )));
        }

        Ok(project_roi(
            request.annual_saving,
            request.implementation_cost,
            request.annual_maintenance,
            horizon,
        ))
    }

    /// Scenario selection for the admission flow plus its summary figures.
    pub fn flow_selection(&self, request: &FlowSelectionRequest) -> FlowSelection<'_> {
        let profile = Profile::merge(
            &Profile::default(),
            &ProfileOverrides::default(),
            &request.profile,
        );
        let capabilities = profile.capabilities();
        let flows = self.flows.as_ref();

        let documents = match request.mode {
            Mode::Plain => plain_documents(flows),
            Mode::Smart | Mode::Ai => select_documents(flows, &request.flags),
        };

        FlowSelection {
            mode: request.mode,
            documents,
            smart: smart_selection(flows, &request.flags),
            judgment: ai_judgment_lines(&request.flags),
            metrics: flow_metrics(flows, &request.flags),
            summary: summarize_flow(flows, &request.flags, request.mode, capabilities),
            comparison: compare_flow(flows, &request.flags, capabilities),
        }
    }

    /// Strategy board evaluation; hidden points outside the known challenges are ignored.
    pub fn strategy(&self, plan: &StrategyPlan) -> StrategyOutcome {
        let known: BTreeSet<&str> = CHALLENGES
            .iter()
            .map(|challenge| challenge.domain_id)
            .chain(std::iter::once(COMPLETION_BONUS_KEY))
            .collect();
        let mut plan = plan.clone();
        plan.hidden_points
            .retain(|point| known.contains(point.as_str()));

        evaluate_strategy(&baselines(&self.catalog), &plan)
    }

    pub fn load_state(&self, key: &str) -> Result<StateSnapshot, SimulationServiceError> {
        Ok(self.store.get(key)?.ok_or(StoreError::NotFound)?)
    }

    pub fn save_state(
        &self,
        key: &str,
        state: SimulationState,
    ) -> Result<StateSnapshot, SimulationServiceError> {
        let lock = self.key_locks.for_key(key)?;
        let _guard = hold(&lock)?;
        self.persist(key, state)
    }

    pub fn delete_state(&self, key: &str) -> Result<(), SimulationServiceError> {
        let lock = self.key_locks.for_key(key)?;
        let _guard = hold(&lock)?;
        self.store.remove(key)?;
        Ok(())
    }

    /// Toggles one flag on a stored state, starting from a fresh state when the
    /// key has none yet.
    pub fn set_flag(
        &self,
        key: &str,
        flag: &str,
        value: bool,
        derived: bool,
    ) -> Result<StateSnapshot, SimulationServiceError> {
        let flag = flag.trim();
        if flag.is_empty() {
            return Err(SimulationServiceError::InvalidInput(
                "flag name must not be empty".to_string(),
            ));
        }

        // held from the read to the write so concurrent toggles all land
        let lock = self.key_locks.for_key(key)?;
        let _guard = hold(&lock)?;
        let mut state = self
            .store
            .get(key)?
            .map(|snapshot| snapshot.state)
            .unwrap_or_default();
        if derived {
            state.set_derived_flag(flag, value);
        } else {
            state.set_flag(flag, value);
        }
        self.persist(key, state)
    }

    fn persist(
        &self,
        key: &str,
        state: SimulationState,
    ) -> Result<StateSnapshot, SimulationServiceError> {
        let snapshot = StateSnapshot::new(state, Utc::now());
        self.store.put(key, &snapshot)?;
        debug!(key, "state saved");
        Ok(snapshot)
    }

    fn horizon(&self, requested: Option<u32>) -> Result<u32, SimulationServiceError> {
        match requested {
            None => Ok(self.settings.roi_horizon_years),
            Some(years) if (1..=MAX_HORIZON_YEARS).contains(&years) => Ok(years),
            Some(years) => Err(SimulationServiceError::InvalidInput(format!(
                "horizonYears must be between 1 and {MAX_HORIZON_YEARS} (got {years})"
            ))),
        }
    }
}

/// Error raised by the simulation service.
#[derive(Debug, thiserror::Error)]
pub enum SimulationServiceError {
    #[error("domain '{0}' not found")]
    UnknownDomain(String),
    #[error("invalid request: {0}")]
    InvalidInput(String),
    #[error(transparent)]
    Store(#[from] StoreError),
}
