//! ETL routes. The trigger never waits for the run.

use std::sync::Arc;

use axum::extract::State;
use axum::http::StatusCode;
use axum::routing::{get, post};
use axum::{Json, Router};
use serde::{Deserialize, Serialize};

use erp_etl::{EtlStatus, TriggerAck};

use crate::error::ApiError;
use crate::state::AppState;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TriggerResponse {
    pub result: TriggerAck,
    pub message: String,
}

pub fn routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/etl/trigger", post(trigger))
        .route("/etl/status", get(status))
}

async fn trigger(State(state): State<Arc<AppState>>) -> Result<(StatusCode, Json<TriggerResponse>), ApiError> {
    let result = state.etl.trigger()?;
    let message = match result {
        TriggerAck::Accepted => "ETL run started in background",
        TriggerAck::Coalesced => "ETL run already pending",
    };

    Ok((
        StatusCode::ACCEPTED,
        Json(TriggerResponse {
            result,
            message: message.to_string(),
        }),
    ))
}

async fn status(State(state): State<Arc<AppState>>) -> Json<EtlStatus> {
    Json(state.etl.status())
}
