//! Health check route.
//!
//! Probes both stores with `SELECT 1`. Either one down makes the whole
//! service unhealthy (503); a load balancer should stop routing to it.

use std::sync::Arc;

use axum::extract::State;
use axum::http::StatusCode;
use axum::routing::get;
use axum::{Json, Router};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::state::AppState;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ServingStatus {
    Serving,
    NotServing,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: ServingStatus,
    pub erp: bool,
    pub warehouse: bool,
    pub server_time: DateTime<Utc>,
}

pub fn routes() -> Router<Arc<AppState>> {
    Router::new().route("/health", get(health))
}

async fn health(State(state): State<Arc<AppState>>) -> (StatusCode, Json<HealthResponse>) {
    let (erp, warehouse) = tokio::join!(state.erp.health_check(), state.warehouse.health_check());

    let (code, status) = if erp && warehouse {
        (StatusCode::OK, ServingStatus::Serving)
    } else {
        warn!(erp, warehouse, "Health check failed");
        (StatusCode::SERVICE_UNAVAILABLE, ServingStatus::NotServing)
    };

    (
        code,
        Json(HealthResponse {
            status,
            erp,
            warehouse,
            server_time: Utc::now(),
        }),
    )
}
