//! Live status API.

use axum::Json;
use axum::extract::State;
use serde_json::{Value, json};

use super::{ApiError, err_json, ok_json};
use crate::app::SharedState;
use crate::services::badge;

/// GET /api/live
pub async fn get_live_status(State(state): State<SharedState>) -> Result<Json<Value>, ApiError> {
    let snapshot = state
        .store()
        .live_snapshot()
        .map_err(|e| err_json(500, &format!("Failed to read live status: {e}")))?;
    Ok(ok_json(json!({
        "liveCount": badge::live_count(&snapshot),
        "snapshot": snapshot,
    })))
}

/// POST /api/live/refresh – run one cycle now (no-op while another runs)
pub async fn refresh_live_status(
    State(state): State<SharedState>,
) -> Result<Json<Value>, ApiError> {
    let outcome = state
        .sync_live_status()
        .await
        .map_err(|e| err_json(500, &format!("Live status refresh failed: {e}")))?;
    match outcome {
        Some(outcome) => Ok(ok_json(json!(outcome))),
        None => Err(err_json(403, "host permissions not granted")),
    }
}
