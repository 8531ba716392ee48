use std::sync::Arc;

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use serde::Deserialize;

use super::{
    AnalysisRequest, ComparisonRequest, FlowSelectionRequest, RoiRequest, SimulationService,
};
use crate::error::AppError;
use crate::simulation::strategy::StrategyPlan;
use crate::state::{SimulationState, SnapshotStore};

/// Router builder exposing the simulation endpoints.
pub fn simulation_router<S>(service: Arc<SimulationService<S>>) -> Router
where
    S: SnapshotStore + 'static,
{
    Router::new()
        .route(
            "/api/v1/domains/:domain_id/stats",
            post(domain_stats_handler::<S>),
        )
        .route("/api/v1/analysis", post(analysis_handler::<S>))
        .route("/api/v1/roi", post(roi_handler::<S>))
        .route("/api/v1/flows/selection", post(flow_selection_handler::<S>))
        .route("/api/v1/strategy", post(strategy_handler::<S>))
        .route(
            "/api/v1/state/:key",
            get(load_state_handler::<S>)
                .put(save_state_handler::<S>)
                .delete(delete_state_handler::<S>),
        )
        .route("/api/v1/state/:key/flags", post(set_flag_handler::<S>))
        .with_state(service)
}

pub(crate) async fn domain_stats_handler<S>(
    State(service): State<Arc<SimulationService<S>>>,
    Path(domain_id): Path<String>,
    Json(request): Json<ComparisonRequest>,
) -> Result<Response, AppError>
where
    S: SnapshotStore + 'static,
{
    let comparison = service.domain_comparison(&domain_id, &request)?;
    Ok(Json(comparison).into_response())
}

pub(crate) async fn analysis_handler<S>(
    State(service): State<Arc<SimulationService<S>>>,
    Json(request): Json<AnalysisRequest>,
) -> Result<Response, AppError>
where
    S: SnapshotStore + 'static,
{
    let analysis = service.analysis(&request)?;
    Ok(Json(analysis).into_response())
}

pub(crate) async fn roi_handler<S>(
    State(service): State<Arc<SimulationService<S>>>,
    Json(request): Json<RoiRequest>,
) -> Result<Response, AppError>
where
    S: SnapshotStore + 'static,
{
    let projection = service.roi(&request)?;
    Ok(Json(projection).into_response())
}

pub(crate) async fn flow_selection_handler<S>(
    State(service): State<Arc<SimulationService<S>>>,
    Json(request): Json<FlowSelectionRequest>,
) -> Response
where
    S: SnapshotStore + 'static,
{
    let selection = service.flow_selection(&request);
    Json(selection).into_response()
}

pub(crate) async fn strategy_handler<S>(
    State(service): State<Arc<SimulationService<S>>>,
    Json(plan): Json<StrategyPlan>,
) -> Response
where
    S: SnapshotStore + 'static,
{
    Json(service.strategy(&plan)).into_response()
}

pub(crate) async fn load_state_handler<S>(
    State(service): State<Arc<SimulationService<S>>>,
    Path(key): Path<String>,
) -> Result<Response, AppError>
where
    S: SnapshotStore + 'static,
{
    let snapshot = service.load_state(&key)?;
    Ok(Json(snapshot).into_response())
}

pub(crate) async fn save_state_handler<S>(
    State(service): State<Arc<SimulationService<S>>>,
    Path(key): Path<String>,
    Json(state): Json<SimulationState>,
) -> Result<Response, AppError>
where
    S: SnapshotStore + 'static,
{
    let snapshot = service.save_state(&key, state)?;
    Ok(Json(snapshot).into_response())
}

pub(crate) async fn delete_state_handler<S>(
    State(service): State<Arc<SimulationService<S>>>,
    Path(key): Path<String>,
) -> Result<Response, AppError>
where
    S: SnapshotStore + 'static,
{
    service.delete_state(&key)?;
    Ok(StatusCode::NO_CONTENT.into_response())
}

#[derive(Debug, Deserialize)]
pub(crate) struct FlagUpdate {
    flag: String,
    value: bool,
    #[serde(default)]
    derived: bool,
}

pub(crate) async fn set_flag_handler<S>(
    State(service): State<Arc<SimulationService<S>>>,
    Path(key): Path<String>,
    Json(update): Json<FlagUpdate>,
) -> Result<Response, AppError>
where
    S: SnapshotStore + 'static,
{
    let snapshot = service.set_flag(&key, &update.flag, update.value, update.derived)?;
    Ok(Json(snapshot).into_response())
}
