use crate::infra::AppState;
use axum::extract::Path;
use axum::http::{header, HeaderName, HeaderValue, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::Extension;
use axum::Json;
use dx_sim::error::AppError;
use dx_sim::service::{simulation_router, SimulationService};
use dx_sim::simulation::society::resolve_cost_per_hour;
use dx_sim::state::SnapshotStore;
use serde_json::json;
use std::sync::Arc;

pub(crate) const DATASET_DEGRADED_HEADER: HeaderName = HeaderName::from_static("x-dataset-degraded");

pub(crate) fn with_catalog_routes<S>(service: Arc<SimulationService<S>>) -> axum::Router
where
    S: SnapshotStore + 'static,
{
    simulation_router(service)
        .route("/health", axum::routing::get(healthcheck))
        .route("/ready", axum::routing::get(readiness_endpoint))
        .route("/metrics", axum::routing::get(metrics_endpoint))
        .route("/api/health", axum::routing::get(api_health))
        .route("/api/domains", axum::routing::get(domains_endpoint))
        .route("/api/domains/:domain_id", axum::routing::get(domain_endpoint))
        .route(
            "/api/domains/:domain_id/documents",
            axum::routing::get(domain_documents_endpoint),
        )
        .route("/api/characters", axum::routing::get(characters_endpoint))
        .route(
            "/api/characters/:character_id",
            axum::routing::get(character_endpoint),
        )
        .route("/api/flows/questions", axum::routing::get(questions_endpoint))
        .route(
            "/api/statistics/summary",
            axum::routing::get(statistics_endpoint),
        )
}

pub(crate) async fn healthcheck() -> Json<serde_json::Value> {
    Json(json!({ "status": "ok" }))
}

pub(crate) async fn readiness_endpoint(Extension(state): Extension<AppState>) -> impl IntoResponse {
    let ready = state.readiness.load(std::sync::atomic::Ordering::Relaxed);
    let status = if ready {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    };

    let payload = if ready {
        json!({ "status": "ready" })
    } else {
        json!({ "status": "initializing" })
    };

    (status, Json(payload))
}

pub(crate) async fn metrics_endpoint(Extension(state): Extension<AppState>) -> impl IntoResponse {
    (
        StatusCode::OK,
        [(header::CONTENT_TYPE, "text/plain; version=0.0.4")],
        state.metrics.render(),
    )
}

pub(crate) async fn api_health(Extension(state): Extension<AppState>) -> Json<serde_json::Value> {
    let mut payload = json!({ "status": "ok", "message": "dx-sim API is running" });
    if state.datasets.degraded() {
        payload["warning"] = json!(state.datasets.warnings.join("; "));
    }
    Json(payload)
}

/// Serializes a catalog payload, flagging responses served from fallback data.
fn catalog_response<T: serde::Serialize>(state: &AppState, body: T) -> Response {
    let mut response = Json(body).into_response();
    if state.datasets.degraded() {
        response
            .headers_mut()
            .insert(DATASET_DEGRADED_HEADER, HeaderValue::from_static("true"));
    }
    response
}

pub(crate) async fn domains_endpoint(Extension(state): Extension<AppState>) -> Response {
    let mut catalog = state.datasets.catalog.as_ref().clone();
    catalog.meta.cost_per_hour = Some(resolve_cost_per_hour(None, &catalog));
    catalog_response(&state, catalog)
}

pub(crate) async fn domain_endpoint(
    Extension(state): Extension<AppState>,
    Path(domain_id): Path<String>,
) -> Result<Response, AppError> {
    let domain = state
        .datasets
        .catalog
        .domain(&domain_id)
        .ok_or_else(|| AppError::NotFound(format!("domain '{domain_id}'")))?;
    Ok(catalog_response(&state, domain))
}

pub(crate) async fn domain_documents_endpoint(
    Extension(state): Extension<AppState>,
    Path(domain_id): Path<String>,
) -> Result<Response, AppError> {
    let domain = state
        .datasets
        .catalog
        .domain(&domain_id)
        .ok_or_else(|| AppError::NotFound(format!("domain '{domain_id}'")))?;
    Ok(catalog_response(&state, &domain.documents))
}

pub(crate) async fn characters_endpoint(Extension(state): Extension<AppState>) -> Response {
    let characters = &state.datasets.catalog.characters;
    catalog_response(&state, json!({ "characters": characters }))
}

pub(crate) async fn character_endpoint(
    Extension(state): Extension<AppState>,
    Path(character_id): Path<String>,
) -> Result<Response, AppError> {
    let character = state
        .datasets
        .catalog
        .character(&character_id)
        .ok_or_else(|| AppError::NotFound(format!("character '{character_id}'")))?;
    Ok(catalog_response(&state, character))
}

pub(crate) async fn questions_endpoint(Extension(state): Extension<AppState>) -> Response {
    let questions = &state.datasets.flows.base_questions;
    catalog_response(&state, json!({ "baseQuestions": questions }))
}

pub(crate) async fn statistics_endpoint(Extension(state): Extension<AppState>) -> Response {
    catalog_response(&state, state.datasets.catalog.statistics())
}
