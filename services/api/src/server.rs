use crate::cli::ServeArgs;
use crate::infra::{load_datasets, AppState};
use crate::routes::with_catalog_routes;
use axum::Extension;
use axum_prometheus::PrometheusMetricLayer;
use dx_sim::config::AppConfig;
use dx_sim::error::AppError;
use dx_sim::service::SimulationService;
use dx_sim::state::FileSnapshotStore;
use dx_sim::telemetry;
use std::sync::atomic::Ordering;
use std::sync::Arc;
use tracing::{info, warn};

pub(crate) async fn run(mut args: ServeArgs) -> Result<(), AppError> {
    let mut config = AppConfig::load()?;

    if let Some(host) = args.host.take() {
        config.server.host = host;
    }
    if let Some(port) = args.port.take() {
        config.server.port = port;
    }

    telemetry::init(&config.telemetry)?;

    let datasets = Arc::new(load_datasets(&config.data));
    for warning in &datasets.warnings {
        warn!(%warning, "serving degraded dataset");
    }

    let (prometheus_layer, prometheus_handle) = PrometheusMetricLayer::pair();
    let readiness_flag = Arc::new(std::sync::atomic::AtomicBool::new(false));
    let app_state = AppState {
        readiness: readiness_flag.clone(),
        metrics: Arc::new(prometheus_handle),
        datasets: datasets.clone(),
    };

    let store = Arc::new(FileSnapshotStore::new(config.data.state_dir.clone()));
    let simulation_service = Arc::new(
        SimulationService::new(
            datasets.catalog.clone(),
            datasets.flows.clone(),
            store,
            config.simulation.clone(),
        )
        .with_warnings(datasets.warnings.clone()),
    );

    let app = with_catalog_routes(simulation_service)
        .layer(Extension(app_state))
        .layer(prometheus_layer);

    let addr = config.server.socket_addr()?;
    let listener = tokio::net::TcpListener::bind(addr).await?;
    readiness_flag.store(true, Ordering::Release);

    info!(
        ?config.environment,
        %addr,
        domains = datasets.catalog.domains.len(),
        state_dir = %config.data.state_dir.display(),
        "dx-sim api ready"
    );

    axum::serve(listener, app).await?;
    Ok(())
}
