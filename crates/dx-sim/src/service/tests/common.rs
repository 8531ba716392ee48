use std::sync::Arc;

use axum::response::Response;
use serde_json::Value;

use crate::config::SimulationConfig;
use crate::dataset::fallback::fallback_flows;
use crate::dataset::Catalog;
use crate::service::{simulation_router, SimulationService};
use crate::state::{InMemorySnapshotStore, SnapshotStore, StateSnapshot, StoreError};

pub(super) const CATALOG_JSON: &str = r#"{
  "meta": {"version": "test", "defaultMode": "plain", "demoMetaInfo": {"costPerHour": 2000}},
  "domains": [
    {
      "id": "administration",
      "name": "Administration",
      "documents": [
        {"id": "moving_notice", "name": "Moving notice", "inputFields": [
          {"id": "name", "label": "Name", "source": "user"},
          {"id": "address", "label": "Address", "source": "shared"}
        ]}
      ],
      "demoMetrics": {
        "dailyVolume": 1000,
        "averageTimePerCase": 12,
        "reductionRates": {"plain": 0.1, "smart": 0.3, "ai": 0.6},
        "timeReductionRates": {"plain": 0.1, "smart": 0.4, "ai": 0.7},
        "costReductionPercentage": {"plain": 0.1, "smart": 0.3, "ai": 0.6},
        "implementationCost": {"plain": 0, "smart": 1000000, "ai": 3000000},
        "annualMaintenanceCost": {"plain": 0, "smart": 100000, "ai": 300000}
      }
    },
    {
      "id": "medical",
      "name": "Medical",
      "documents": [
        {"id": "admission_form", "name": "Admission form", "inputFields": [
          {"id": "name", "label": "Name", "source": "user"},
          {"id": "address", "label": "Address", "source": "shared"},
          {"id": "insurance", "label": "Insurance", "source": "derived"},
          {"id": "birth_date", "label": "Birth date", "source": "mynumber"},
          {"id": "symptoms", "label": "Symptoms", "source": "ai"},
          {"id": "phone", "label": "Phone", "source": "optional"},
          {"id": "er_contact", "label": "Emergency contact", "source": "user", "requiredIf": "emergency"}
        ]},
        {"id": "surgery_consent", "name": "Surgery consent", "conditions": ["surgery"], "inputFields": [
          {"id": "signature", "label": "Signature", "source": "user"},
          {"id": "procedure", "label": "Procedure", "source": "ai"}
        ]}
      ],
      "demoMetrics": {
        "dailyVolume": 500,
        "averageTimePerCase": 30,
        "reductionRates": {"plain": 0.05, "smart": 0.4, "ai": 0.7},
        "timeReductionRates": {"plain": 0.05, "smart": 0.4, "ai": 0.7},
        "costReductionPercentage": {"plain": 0.05, "smart": 0.4, "ai": 0.7},
        "administrativeDependency": 0.5,
        "implementationCost": {"plain": 0, "smart": 2000000, "ai": 5000000},
        "annualMaintenanceCost": {"plain": 0, "smart": 200000, "ai": 500000}
      }
    }
  ]
}"#;

pub(super) fn catalog() -> Catalog {
    Catalog::from_json(CATALOG_JSON).expect("test catalog parses")
}

pub(super) fn build_service() -> (
    SimulationService<InMemorySnapshotStore>,
    Arc<InMemorySnapshotStore>,
) {
    let store = Arc::new(InMemorySnapshotStore::new());
    let service = SimulationService::new(
        Arc::new(catalog()),
        Arc::new(fallback_flows()),
        store.clone(),
        SimulationConfig::default(),
    );
    (service, store)
}

pub(super) fn router_with_service(
    service: SimulationService<InMemorySnapshotStore>,
) -> axum::Router {
    simulation_router(Arc::new(service))
}

pub(super) async fn read_json_body(response: Response) -> Value {
    let body = axum::body::to_bytes(response.into_body(), 1 << 20)
        .await
        .expect("read body");
    serde_json::from_slice(&body).expect("json payload")
}

pub(super) fn json_request(method: &str, uri: &str, body: Value) -> axum::http::Request<axum::body::Body> {
    axum::http::Request::builder()
        .method(method)
        .uri(uri)
        .header(axum::http::header::CONTENT_TYPE, "application/json")
        .body(axum::body::Body::from(
            serde_json::to_vec(&body).expect("serialize body"),
        ))
        .expect("request builds")
}

/// Store whose backend is always down.
pub(super) struct UnavailableStore;

impl SnapshotStore for UnavailableStore {
    fn get(&self, _key: &str) -> Result<Option<StateSnapshot>, StoreError> {
        Err(StoreError::Unavailable("offline".to_string()))
    }

    fn put(&self, _key: &str, _snapshot: &StateSnapshot) -> Result<(), StoreError> {
        Err(StoreError::Unavailable("offline".to_string()))
    }

    fn remove(&self, _key: &str) -> Result<(), StoreError> {
        Err(StoreError::Unavailable("offline".to_string()))
    }
}
