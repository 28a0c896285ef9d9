//! Analytics routes. Each request reads the warehouse fresh.

use std::sync::Arc;

use axum::extract::State;
use axum::routing::get;
use axum::{Json, Router};

use erp_analytics::{ForecastReport, Kpis, SegmentationReport};

use crate::error::ApiError;
use crate::state::AppState;

pub fn routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/analytics/segments", get(segments))
        .route("/analytics/forecast", get(forecast))
        .route("/analytics/kpis", get(kpis))
}

async fn segments(State(state): State<Arc<AppState>>) -> Result<Json<SegmentationReport>, ApiError> {
    Ok(Json(state.analytics.segment_customers().await?))
}

async fn forecast(State(state): State<Arc<AppState>>) -> Result<Json<ForecastReport>, ApiError> {
    Ok(Json(state.analytics.forecast_sales().await?))
}

async fn kpis(State(state): State<Arc<AppState>>) -> Json<Kpis> {
    Json(state.analytics.get_kpis().await)
}
