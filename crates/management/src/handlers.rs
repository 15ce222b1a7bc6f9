//! Axum handlers for reading and replacing the stored chain.

use std::sync::Arc;

use axum::extract::State;
use axum::Json;
use drip_core::types::Chain;
use tracing::{info, warn};

use crate::models::{ApiError, ChainResponse, ErrorResponse, OkResponse, SaveChainRequest, INVALID_CHAIN};
use crate::store::ChainStore;

#[derive(Clone)]
pub struct ManagementState {
    pub store: Arc<ChainStore>,
}

pub async fn get_chain(
    State(state): State<ManagementState>,
) -> Result<Json<ChainResponse>, ApiError> {
    let chain = state.store.load().await.map_err(ErrorResponse::from_error)?;
    Ok(Json(ChainResponse { chain }))
}

pub async fn save_chain(
    State(state): State<ManagementState>,
    Json(req): Json<SaveChainRequest>,
) -> Result<Json<OkResponse>, ApiError> {
    let Some(raw) = req.chain else {
        metrics::counter!("chain.validation_errors").increment(1);
        return Err(ErrorResponse::bad_request(INVALID_CHAIN));
    };
    let chain = Chain::from_value(raw, INVALID_CHAIN).map_err(|e| {
        warn!(error = %e, "Rejected chain");
        metrics::counter!("chain.validation_errors").increment(1);
        ErrorResponse::from_error(e)
    })?;

    state
        .store
        .save(&chain)
        .await
        .map_err(ErrorResponse::from_error)?;
    info!(nodes = chain.nodes.len(), edges = chain.edges.len(), "Chain replaced via API");
    Ok(Json(OkResponse::ok()))
}
