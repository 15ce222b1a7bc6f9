//! Operational endpoints and the mock event webhook.

use std::sync::Arc;
use std::time::Instant;

use axum::body::Bytes;
use axum::extract::{Path, State};
use axum::Json;
use drip_journey::SimulationEngine;
use drip_management::{ChainStore, OkResponse};
use serde_json::Value;
use tracing::info;

/// Shared application state for REST handlers.
#[derive(Clone)]
pub struct AppState {
    pub engine: Arc<SimulationEngine>,
    pub store: Arc<ChainStore>,
    pub node_id: String,
    pub start_time: Instant,
}

/// GET /api/health
pub async fn health_check() -> Json<OkResponse> {
    Json(OkResponse::ok())
}

/// POST /api/events/:event_type. Accepts any body, or none, and only logs it.
pub async fn handle_event(
    State(state): State<AppState>,
    Path(event_type): Path<String>,
    body: Bytes,
) -> Json<OkResponse> {
    let payload: Value = serde_json::from_slice(&body).unwrap_or_else(|_| Value::Object(Default::default()));
    info!(
        node_id = %state.node_id,
        event_type = %event_type,
        payload = %payload,
        uptime_secs = state.start_time.elapsed().as_secs(),
        "Webhook event received"
    );
    metrics::counter!("events.received").increment(1);
    Json(OkResponse::ok())
}
