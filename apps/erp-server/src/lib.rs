//! # ERP Server
//!
//! axum HTTP surface over the order engine, the ETL worker and the
//! analytics engine.
//!
//! ## Routes
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                           ERP Server Routes                             │
//! │                                                                         │
//! │  ┌────────────────────┐  ┌────────────────────┐  ┌──────────────────┐  │
//! │  │  order_service     │  │  etl_service       │  │ analytics_service│  │
//! │  │                    │  │                    │  │                  │  │
//! │  │ • POST /orders     │  │ • POST /etl/trigger│  │ • GET segments   │  │
//! │  │ • GET  /orders/{id}│  │ • GET  /etl/status │  │ • GET forecast   │  │
//! │  │ • PUT  .../validate│  │                    │  │ • GET kpis       │  │
//! │  └────────────────────┘  └────────────────────┘  └──────────────────┘  │
//! │                                                                         │
//! │  ┌────────────────────┐  ┌────────────────────┐                        │
//! │  │  health_service    │  │  seed_service      │                        │
//! │  │ • GET /health      │  │ • POST /seed       │                        │
//! │  │                    │  │ • POST /seed/massive│                       │
//! │  └────────────────────┘  └────────────────────┘                        │
//! │                                                                         │
//! │          erp.db (orders, stock, audit)     warehouse.db (star)          │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Configuration
//! See [`config::ServerConfig`].

pub mod config;
pub mod db;
pub mod error;
pub mod services;
pub mod state;

use std::sync::Arc;

use axum::Router;
use tower_http::trace::TraceLayer;

pub use config::ServerConfig;
pub use error::{ApiError, ErrorBody};
pub use state::AppState;

/// Builds the full application router.
pub fn router(state: Arc<AppState>) -> Router {
    Router::new()
        .merge(services::order_service::routes())
        .merge(services::etl_service::routes())
        .merge(services::analytics_service::routes())
        .merge(services::health_service::routes())
        .merge(services::seed_service::routes())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

// =============================================================================
// Route Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    use axum::body::Body;
    use axum::http::{Request, StatusCode};
    use serde_json::{json, Value};
    use tower::ServiceExt;

    use erp_core::{AuditAction, Product};
    use erp_db::{seed, Database, DbConfig, Schema};
    use erp_etl::{EtlConfig, EtlWorker, Pipeline, StatusBoard};

    struct TestApp {
        app: Router,
        erp: Database,
    }

    async fn test_app() -> TestApp {
        let erp = Database::new(DbConfig::in_memory()).await.unwrap();
        let warehouse = Database::new(DbConfig::in_memory().schema(Schema::Warehouse))
            .await
            .unwrap();
        seed::seed_master_data(&erp).await.unwrap();

        let config = EtlConfig {
            enabled: false,
            ..EtlConfig::default()
        };
        let pipeline = Pipeline::new(erp.clone(), warehouse.clone(), config.store(), StatusBoard::new());
        let (worker, handle) = EtlWorker::new(pipeline, &config);
        worker.spawn();

        let state = Arc::new(AppState::new(erp.clone(), warehouse, handle));
        TestApp {
            app: router(state),
            erp,
        }
    }

    async fn send(app: &Router, method: &str, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
        let builder = Request::builder().method(method).uri(uri);
        let request = match body {
            Some(json) => builder
                .header("content-type", "application/json")
                .body(Body::from(json.to_string()))
                .unwrap(),
            None => builder.body(Body::empty()).unwrap(),
        };

        let response = app.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let json = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
        (status, json)
    }

    async fn product(erp: &Database, sku: &str) -> Product {
        erp.products().get_by_sku(sku).await.unwrap().unwrap()
    }

    async fn client_id(erp: &Database, name: &str) -> String {
        erp.clients()
            .list()
            .await
            .unwrap()
            .into_iter()
            .find(|c| c.name == name)
            .unwrap()
            .id
    }

    #[tokio::test]
    async fn test_create_order_applies_vip_price() {
        let t = test_app().await;
        let alpha = client_id(&t.erp, "Alpha Corp").await;
        let laptop = product(&t.erp, "EAN001").await;

        let (status, body) = send(
            &t.app,
            "POST",
            "/orders",
            Some(json!({
                "client_id": alpha,
                "items": [{ "product_id": laptop.id, "quantity": 2 }]
            })),
        )
        .await;

        assert_eq!(status, StatusCode::CREATED);
        assert_eq!(body["status"], "PENDING");
        assert_eq!(body["total"], 216_000);

        let order_id = body["order_id"].as_str().unwrap().to_string();
        let (status, order) = send(&t.app, "GET", &format!("/orders/{}", order_id), None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(order["items"].as_array().unwrap().len(), 1);
        assert_eq!(order["items"][0]["unit_price_cents"], 108_000);
    }

    #[tokio::test]
    async fn test_blocked_client_is_audited() {
        let t = test_app().await;
        let beta = client_id(&t.erp, "Beta Shop").await;
        let mouse = product(&t.erp, "EAN002").await;

        let (status, body) = send(
            &t.app,
            "POST",
            "/orders",
            Some(json!({
                "client_id": beta,
                "items": [{ "product_id": mouse.id, "quantity": 1 }]
            })),
        )
        .await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["code"], "CREDIT_LIMIT_EXCEEDED");
        assert_eq!(t.erp.orders().count().await.unwrap(), 0);
        let blocked = t.erp.audit().list_by_action(AuditAction::BlockedOrder).await.unwrap();
        assert_eq!(blocked.len(), 1);
    }

    #[tokio::test]
    async fn test_unknown_ids_are_404() {
        let t = test_app().await;

        let (status, body) = send(&t.app, "GET", "/orders/no-such-order", None).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body["code"], "NOT_FOUND");

        let mouse = product(&t.erp, "EAN002").await;
        let (status, _) = send(
            &t.app,
            "POST",
            "/orders",
            Some(json!({
                "client_id": "no-such-client",
                "items": [{ "product_id": mouse.id, "quantity": 1 }]
            })),
        )
        .await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_validate_order() {
        let t = test_app().await;
        let alpha = client_id(&t.erp, "Alpha Corp").await;
        let mouse = product(&t.erp, "EAN002").await;

        let (_, receipt) = send(
            &t.app,
            "POST",
            "/orders",
            Some(json!({
                "client_id": alpha,
                "items": [{ "product_id": mouse.id, "quantity": 10 }]
            })),
        )
        .await;
        let order_id = receipt["order_id"].as_str().unwrap();

        let uri = format!("/orders/{}/validate?user_id=clerk-1", order_id);
        let (status, body) = send(&t.app, "PUT", &uri, None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["status"], "VALIDATED");
        assert_eq!(product(&t.erp, "EAN002").await.stock_quantity, 190);

        // second validation hits a non-PENDING order
        let (status, body) = send(&t.app, "PUT", &uri, None).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["code"], "INVALID_STATE");
    }

    #[tokio::test]
    async fn test_insufficient_stock_leaves_stock_alone() {
        let t = test_app().await;
        let alpha = client_id(&t.erp, "Alpha Corp").await;
        let monitor = product(&t.erp, "EAN003").await;

        let (status, receipt) = send(
            &t.app,
            "POST",
            "/orders",
            Some(json!({
                "client_id": alpha,
                "items": [{ "product_id": monitor.id, "quantity": 5 }]
            })),
        )
        .await;
        assert_eq!(status, StatusCode::CREATED);

        let uri = format!("/orders/{}/validate", receipt["order_id"].as_str().unwrap());
        let (status, body) = send(&t.app, "PUT", &uri, None).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["code"], "INSUFFICIENT_STOCK");
        assert_eq!(product(&t.erp, "EAN003").await.stock_quantity, 2);
    }

    #[tokio::test]
    async fn test_malformed_order_is_rejected() {
        let t = test_app().await;
        let alpha = client_id(&t.erp, "Alpha Corp").await;

        let (status, body) = send(
            &t.app,
            "POST",
            "/orders",
            Some(json!({ "client_id": alpha, "items": [] })),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["code"], "VALIDATION");
    }

    #[tokio::test]
    async fn test_etl_trigger_and_status() {
        let t = test_app().await;
        let alpha = client_id(&t.erp, "Alpha Corp").await;
        let mouse = product(&t.erp, "EAN002").await;
        let receipt = t
            .erp
            .orders()
            .create_order(&alpha, &[erp_core::OrderLineRequest { product_id: mouse.id, quantity: 3 }], None)
            .await
            .unwrap();
        t.erp.orders().validate_order(&receipt.order_id, None).await.unwrap();

        let (status, body) = send(&t.app, "GET", "/etl/status", None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["status"], "Waiting");

        let (status, body) = send(&t.app, "POST", "/etl/trigger", None).await;
        assert_eq!(status, StatusCode::ACCEPTED);
        assert!(body["result"] == "accepted" || body["result"] == "coalesced");

        let mut loaded = false;
        for _ in 0..100 {
            let (_, body) = send(&t.app, "GET", "/etl/status", None).await;
            if body["status"] == "Succeeded" {
                assert_eq!(body["rows_loaded"], 1);
                assert!(!body["last_run"].is_null());
                loaded = true;
                break;
            }
            tokio::time::sleep(Duration::from_millis(50)).await;
        }
        assert!(loaded, "ETL run did not finish");

        let (status, kpis) = send(&t.app, "GET", "/analytics/kpis", None).await;
        assert_eq!(status, StatusCode::OK);
        // VIP mouse: 3 × 22.50
        assert_eq!(kpis["total_revenue"], 6_750);
    }

    #[tokio::test]
    async fn test_analytics_degrade_on_empty_warehouse() {
        let t = test_app().await;

        let (status, body) = send(&t.app, "GET", "/analytics/segments", None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["status"], "insufficient_data");

        let (status, body) = send(&t.app, "GET", "/analytics/forecast", None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["status"], "mock");
        assert_eq!(body["data"].as_array().unwrap().len(), 3);

        let (_, body) = send(&t.app, "GET", "/analytics/kpis", None).await;
        assert_eq!(body["total_revenue"], 0);
    }

    #[tokio::test]
    async fn test_health() {
        let t = test_app().await;
        let (status, body) = send(&t.app, "GET", "/health", None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["status"], "serving");
        assert_eq!(body["erp"], true);
        assert_eq!(body["warehouse"], true);
    }

    #[tokio::test]
    async fn test_seed_routes_are_idempotent() {
        let t = test_app().await;

        // master data already loaded by test_app
        let (status, body) = send(&t.app, "POST", "/seed", None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["created"], false);

        let (status, body) = send(&t.app, "POST", "/seed/massive", None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["orders"], 50);

        let (_, body) = send(&t.app, "POST", "/seed/massive", None).await;
        assert_eq!(body["created"], false);
        assert_eq!(t.erp.orders().count().await.unwrap(), 50);
    }
}
