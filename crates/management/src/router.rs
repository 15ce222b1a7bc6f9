//! Chain routes, merged into the main app by the API server.

use std::sync::Arc;

use axum::routing::get;
use axum::Router;

use crate::handlers::{self, ManagementState};
use crate::store::ChainStore;

pub fn management_router(store: Arc<ChainStore>) -> Router {
    let state = ManagementState { store };

    Router::new()
        .route("/api/chain", get(handlers::get_chain).post(handlers::save_chain))
        .with_state(state)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::models::INVALID_CHAIN;
    use axum::body::Body;
    use axum::http::{Request, StatusCode};
    use http_body_util::BodyExt;
    use serde_json::{json, Value};
    use tower::ServiceExt;

    async fn call(app: Router, method: &str, body: Option<Value>) -> (StatusCode, Value) {
        let builder = Request::builder().method(method).uri("/api/chain");
        let request = match body {
            Some(body) => builder
                .header("content-type", "application/json")
                .body(Body::from(body.to_string()))
                .unwrap(),
            None => builder.body(Body::empty()).unwrap(),
        };
        let response = app.oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        (status, serde_json::from_slice(&bytes).unwrap())
    }

    fn app(dir: &tempfile::TempDir) -> Router {
        management_router(Arc::new(ChainStore::new(dir.path().join("storage.json"))))
    }

    #[tokio::test]
    async fn test_get_before_save_returns_null() {
        let dir = tempfile::tempdir().unwrap();
        let (status, body) = call(app(&dir), "GET", None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, json!({"chain": null}));
    }

    #[tokio::test]
    async fn test_save_then_get_round_trips() {
        let dir = tempfile::tempdir().unwrap();
        let chain = json!({
            "nodes": [{"id": "event1", "type": "event", "data": {"eventType": "contact_added"}, "position": {"x": 1, "y": 2}}],
            "edges": []
        });

        let (status, body) = call(app(&dir), "POST", Some(json!({"chain": chain.clone()}))).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, json!({"ok": true}));

        let (_, body) = call(app(&dir), "GET", None).await;
        assert_eq!(body["chain"], chain);
    }

    #[tokio::test]
    async fn test_malformed_chain_is_rejected() {
        let dir = tempfile::tempdir().unwrap();
        for bad in [json!({}), json!({"chain": {"nodes": []}}), json!({"chain": {"nodes": {}, "edges": []}})] {
            let (status, body) = call(app(&dir), "POST", Some(bad)).await;
            assert_eq!(status, StatusCode::BAD_REQUEST);
            assert_eq!(body, json!({"error": INVALID_CHAIN}));
        }
        assert!(!dir.path().join("storage.json").exists());
    }
}
