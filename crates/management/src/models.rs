//! Request and response bodies for the chain endpoints.

use axum::http::StatusCode;
use axum::Json;
use drip_core::error::DripError;
use drip_core::types::Chain;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::error;

pub const INVALID_CHAIN: &str = "Invalid chain: expected { nodes: [], edges: [] }";

/// `POST /api/chain` body. The chain stays untyped until its shape is checked.
#[derive(Debug, Default, Deserialize)]
pub struct SaveChainRequest {
    #[serde(default)]
    pub chain: Option<Value>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ChainResponse {
    pub chain: Option<Chain>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct OkResponse {
    pub ok: bool,
}

impl OkResponse {
    pub fn ok() -> Self {
        Self { ok: true }
    }
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
}

pub type ApiError = (StatusCode, Json<ErrorResponse>);

impl ErrorResponse {
    pub fn bad_request(message: impl Into<String>) -> ApiError {
        (
            StatusCode::BAD_REQUEST,
            Json(Self {
                error: message.into(),
            }),
        )
    }

    /// Validation failures become 400 with their message; everything else is
    /// logged and reported as a generic 500.
    pub fn from_error(err: DripError) -> ApiError {
        if err.is_client_error() {
            return Self::bad_request(err.to_string());
        }
        error!(error = %err, "Request failed");
        (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(Self {
                error: "Internal server error".to_string(),
            }),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validation_errors_keep_their_message() {
        let (status, Json(body)) =
            ErrorResponse::from_error(DripError::Validation(INVALID_CHAIN.to_string()));
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body.error, INVALID_CHAIN);
    }

    #[test]
    fn test_server_errors_are_opaque() {
        let (status, Json(body)) =
            ErrorResponse::from_error(DripError::Storage("disk full at /var/data".to_string()));
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body.error, "Internal server error");
    }
}
