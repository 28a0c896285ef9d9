//! Demo data routes.
//!
//! `POST /seed` loads the master data, `POST /seed/massive` the bulk
//! history the BI layer needs. Both are safe to call repeatedly.

use std::sync::Arc;

use axum::extract::State;
use axum::routing::post;
use axum::{Json, Router};
use chrono::Utc;
use rand::rngs::StdRng;
use rand::SeedableRng;

use erp_db::seed::{self, SeedReport};

use crate::error::ApiError;
use crate::state::AppState;

pub fn routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/seed", post(seed_master))
        .route("/seed/massive", post(seed_massive))
}

async fn seed_master(State(state): State<Arc<AppState>>) -> Result<Json<SeedReport>, ApiError> {
    Ok(Json(seed::seed_master_data(&state.erp).await?))
}

async fn seed_massive(State(state): State<Arc<AppState>>) -> Result<Json<SeedReport>, ApiError> {
    let mut rng = StdRng::from_entropy();
    Ok(Json(seed::seed_massive_data(&state.erp, Utc::now(), &mut rng).await?))
}
