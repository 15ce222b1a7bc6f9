//! API server: the editor-facing HTTP surface plus an optional Prometheus exporter.

use crate::rest::{self, AppState};
use crate::simulate_rest;
use axum::extract::DefaultBodyLimit;
use axum::routing::{get, post};
use axum::Router;
use drip_core::config::AppConfig;
use drip_journey::SimulationEngine;
use drip_management::{management_router, ChainStore};
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Instant;
use tower::ServiceBuilder;
use tower_http::compression::CompressionLayer;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing::info;

pub struct ApiServer {
    config: AppConfig,
    engine: Arc<SimulationEngine>,
    store: Arc<ChainStore>,
}

impl ApiServer {
    pub fn new(config: AppConfig, engine: Arc<SimulationEngine>, store: Arc<ChainStore>) -> Self {
        Self {
            config,
            engine,
            store,
        }
    }

    /// Full application router with middleware applied.
    pub fn router(&self) -> Router {
        let state = AppState {
            engine: self.engine.clone(),
            store: self.store.clone(),
            node_id: self.config.node_id.clone(),
            start_time: Instant::now(),
        };
        build_router(state, self.config.api.body_limit_bytes)
    }

    /// Start the HTTP REST server.
    pub async fn start_http(&self) -> anyhow::Result<()> {
        let app = self.router();
        let addr = SocketAddr::new(self.config.api.host.parse()?, self.config.api.http_port);

        info!(addr = %addr, storage = %self.store.path().display(), "Starting HTTP server");

        let listener = tokio::net::TcpListener::bind(addr).await?;
        axum::serve(listener, app).await?;

        Ok(())
    }

    /// Start the metrics server on a separate port.
    pub async fn start_metrics(&self) -> anyhow::Result<()> {
        let builder = metrics_exporter_prometheus::PrometheusBuilder::new();
        builder
            .with_http_listener(SocketAddr::new(
                self.config.api.host.parse()?,
                self.config.metrics.port,
            ))
            .install()?;

        info!(port = self.config.metrics.port, "Metrics exporter started");
        Ok(())
    }
}

pub fn build_router(state: AppState, body_limit_bytes: usize) -> Router {
    let store = state.store.clone();

    Router::new()
        .route("/api/health", get(rest::health_check))
        .route("/api/simulate", post(simulate_rest::handle_simulate))
        .route("/api/events/:event_type", post(rest::handle_event))
        .with_state(state)
        .merge(management_router(store))
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(CorsLayer::permissive())
                .layer(CompressionLayer::new())
                .layer(DefaultBodyLimit::max(body_limit_bytes)),
        )
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use axum::body::Body;
    use axum::http::{Request, StatusCode};
    use drip_channels::MockMailer;
    use http_body_util::BodyExt;
    use serde_json::{json, Value};
    use tower::ServiceExt;

    struct Harness {
        _dir: tempfile::TempDir,
        app: Router,
        engine: Arc<SimulationEngine>,
    }

    fn harness() -> Harness {
        let dir = tempfile::tempdir().unwrap();
        let store = Arc::new(ChainStore::new(dir.path().join("storage.json")));
        let engine = Arc::new(SimulationEngine::new(Arc::new(MockMailer::instant())));
        let server = ApiServer::new(AppConfig::default(), engine.clone(), store);
        Harness {
            app: server.router(),
            engine,
            _dir: dir,
        }
    }

    async fn send(app: &Router, method: &str, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
        let builder = Request::builder().method(method).uri(uri);
        let request = match body {
            Some(body) => builder
                .header("content-type", "application/json")
                .body(Body::from(body.to_string()))
                .unwrap(),
            None => builder.body(Body::empty()).unwrap(),
        };
        let response = app.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        let value = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
        (status, value)
    }

    fn stop_chain() -> Value {
        json!({
            "nodes": [
                {"id": "event1", "type": "event", "data": {"eventType": "contact_added"}},
                {"id": "stop1", "type": "action", "data": {"actionType": "stop"}}
            ],
            "edges": [{"id": "e1", "source": "event1", "target": "stop1"}]
        })
    }

    #[tokio::test]
    async fn test_health() {
        let h = harness();
        let (status, body) = send(&h.app, "GET", "/api/health", None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, json!({"ok": true}));
    }

    #[tokio::test]
    async fn test_simulate_posted_chain() {
        let h = harness();
        let (status, body) = send(
            &h.app,
            "POST",
            "/api/simulate",
            Some(json!({
                "chain": stop_chain(),
                "context": {"now": "2025-08-19T00:00:00Z"}
            })),
        )
        .await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["logs"], json!(["Start at event: contact_added", "Chain stopped."]));
        assert_eq!(body["outcome"], "stopped");
        assert_eq!(body["steps"], 2);
        assert_eq!(body["context"]["now"], "2025-08-19T00:00:00Z");
        assert_eq!(body["userMessages"].as_array().unwrap().len(), 2);
    }

    #[tokio::test]
    async fn test_simulate_falls_back_to_stored_chain() {
        let h = harness();
        let (status, _) = send(&h.app, "POST", "/api/chain", Some(json!({"chain": stop_chain()}))).await;
        assert_eq!(status, StatusCode::OK);

        let (status, body) = send(&h.app, "POST", "/api/simulate", Some(json!({}))).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["outcome"], "stopped");
        // Default context starts from the real clock with overrides off.
        assert_eq!(body["context"]["emailOpened"], false);
        assert!(body["context"]["now"].as_str().unwrap().ends_with('Z'));
    }

    #[tokio::test]
    async fn test_simulate_without_any_chain_is_bad_request() {
        let h = harness();
        let (status, body) = send(&h.app, "POST", "/api/simulate", Some(json!({}))).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body, json!({"error": "No valid chain provided"}));

        let (status, body) = send(
            &h.app,
            "POST",
            "/api/simulate",
            Some(json!({"chain": {"nodes": "nope", "edges": []}})),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body, json!({"error": "No valid chain provided"}));
    }

    #[tokio::test]
    async fn test_loose_editor_chain_is_saved_and_simulated() {
        let h = harness();
        let chain = json!({
            "nodes": [
                {"id": "event1", "type": "event", "data": null},
                {"id": "stop1", "type": "action", "data": {"actionType": "stop"}}
            ],
            "edges": [
                {"id": "e0", "source": "event1"},
                {"id": "e1", "source": "event1", "target": "stop1"}
            ]
        });
        let (status, _) = send(&h.app, "POST", "/api/chain", Some(json!({"chain": chain.clone()}))).await;
        assert_eq!(status, StatusCode::OK);

        let (status, body) = send(
            &h.app,
            "POST",
            "/api/simulate",
            Some(json!({"chain": chain, "context": {"now": "2025-08-19T00:00:00Z"}})),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        // The half-drawn edge comes first and leads nowhere.
        assert_eq!(body["outcome"], "missing_node");
        assert_eq!(body["logs"], json!(["Start at event: contact_added"]));
    }

    #[tokio::test]
    async fn test_simulate_sends_through_engine_mailer() {
        let h = harness();
        let chain = json!({
            "nodes": [
                {"id": "event1", "type": "event", "data": {}},
                {"id": "mail", "type": "action", "data": {"actionType": "send_email", "subject": "Hi"}}
            ],
            "edges": [{"id": "e1", "source": "event1", "target": "mail"}]
        });
        let (status, body) = send(
            &h.app,
            "POST",
            "/api/simulate",
            Some(json!({
                "chain": chain,
                "trigger": {"type": "contact_added", "payload": {"email": "ada@example.com"}},
                "context": {"now": "2025-08-19T00:00:00Z"}
            })),
        )
        .await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["outcome"], "dead_end");
        let id = body["context"]["emails"]["mail"]["id"].as_str().unwrap();
        assert_eq!(h.engine.mailer().get(id).unwrap().to, "ada@example.com");
    }

    #[tokio::test]
    async fn test_event_webhook_accepts_any_body() {
        let h = harness();
        let (status, body) = send(&h.app, "POST", "/api/events/opened", Some(json!({"id": "x"}))).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, json!({"ok": true}));

        let (status, _) = send(&h.app, "POST", "/api/events/clicked", None).await;
        assert_eq!(status, StatusCode::OK);
    }

    #[tokio::test]
    async fn test_oversized_body_is_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let state = AppState {
            engine: Arc::new(SimulationEngine::new(Arc::new(MockMailer::instant()))),
            store: Arc::new(ChainStore::new(dir.path().join("storage.json"))),
            node_id: "test".into(),
            start_time: Instant::now(),
        };
        let app = build_router(state, 64);
        let big = json!({"chain": {"nodes": [], "edges": [], "pad": "x".repeat(256)}});
        let (status, _) = send(&app, "POST", "/api/chain", Some(big)).await;
        assert_eq!(status, StatusCode::PAYLOAD_TOO_LARGE);
    }
}
