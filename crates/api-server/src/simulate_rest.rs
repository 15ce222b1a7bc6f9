//! POST /api/simulate: run the simulation engine over a posted or stored chain.

use axum::extract::State;
use axum::Json;
use drip_core::types::{Chain, SimulationContext, Trigger};
use drip_journey::SimulationReport;
use drip_management::models::{ApiError, ErrorResponse};
use serde::Deserialize;
use serde_json::Value;
use tracing::{debug, warn};

use crate::rest::AppState;

pub const NO_VALID_CHAIN: &str = "No valid chain provided";

#[derive(Debug, Default, Deserialize)]
pub struct SimulateRequest {
    /// Chain to walk; the stored chain when absent.
    #[serde(default)]
    pub chain: Option<Value>,
    #[serde(default)]
    pub trigger: Option<Trigger>,
    #[serde(default)]
    pub context: Option<SimulationContext>,
}

pub async fn handle_simulate(
    State(state): State<AppState>,
    Json(req): Json<SimulateRequest>,
) -> Result<Json<SimulationReport>, ApiError> {
    let chain = match req.chain {
        Some(raw) => Chain::from_value(raw, NO_VALID_CHAIN).map_err(|e| {
            warn!(error = %e, "Simulation request carried an invalid chain");
            metrics::counter!("chain.validation_errors").increment(1);
            ErrorResponse::from_error(e)
        })?,
        None => {
            debug!("No chain in request, using the stored chain");
            state
                .store
                .load()
                .await
                .map_err(ErrorResponse::from_error)?
                .ok_or_else(|| ErrorResponse::bad_request(NO_VALID_CHAIN))?
        }
    };

    let trigger = req.trigger.unwrap_or_default();
    let context = req.context.unwrap_or_else(SimulationContext::starting_now);

    let report = state.engine.simulate(&chain, &trigger, context).await;
    Ok(Json(report))
}
