//! Order routes.
//!
//! ```text
//! POST /orders                        → 201 OrderReceipt
//! GET  /orders/{id}                   → 200 Order (with items) | 404
//! PUT  /orders/{id}/validate?user_id= → 200 ValidatedOrder | 400
//! ```

use std::sync::Arc;

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::routing::{get, post, put};
use axum::{Json, Router};
use serde::{Deserialize, Serialize};
use tracing::info;

use erp_core::{Order, OrderLineRequest, OrderReceipt};
use erp_db::ValidatedOrder;

use crate::error::ApiError;
use crate::state::AppState;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateOrderRequest {
    pub client_id: String,
    pub items: Vec<OrderLineRequest>,
    /// Acting user, recorded in the audit trail.
    #[serde(default)]
    pub user_id: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ActorQuery {
    pub user_id: Option<String>,
}

pub fn routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/orders", post(create_order))
        .route("/orders/{id}", get(get_order))
        .route("/orders/{id}/validate", put(validate_order))
}

async fn create_order(
    State(state): State<Arc<AppState>>,
    Json(req): Json<CreateOrderRequest>,
) -> Result<(StatusCode, Json<OrderReceipt>), ApiError> {
    let receipt = state
        .erp
        .orders()
        .create_order(&req.client_id, &req.items, req.user_id.as_deref())
        .await?;

    info!(order_id = %receipt.order_id, client_id = %req.client_id, "Order accepted");
    Ok((StatusCode::CREATED, Json(receipt)))
}

async fn get_order(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<Json<Order>, ApiError> {
    state
        .erp
        .orders()
        .get_order(&id)
        .await?
        .map(Json)
        .ok_or_else(|| ApiError::NotFound(format!("Order not found: {}", id)))
}

async fn validate_order(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
    Query(actor): Query<ActorQuery>,
) -> Result<Json<ValidatedOrder>, ApiError> {
    let validated = state
        .erp
        .orders()
        .validate_order(&id, actor.user_id.as_deref())
        .await?;
    Ok(Json(validated))
}
