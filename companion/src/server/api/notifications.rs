//! Notification history API.

use axum::Json;
use axum::extract::{Path, State};
use serde_json::{Value, json};

use super::{ApiError, ok_json, service_err};
use crate::app::SharedState;
use crate::services::history;

/// GET /api/notifications
pub async fn get_history(State(state): State<SharedState>) -> Result<Json<Value>, ApiError> {
    let view = history::view(state.store()).map_err(service_err)?;
    Ok(ok_json(json!(view)))
}

/// POST /api/notifications/{id}/read
pub async fn mark_read(
    State(state): State<SharedState>,
    Path(id): Path<String>,
) -> Result<Json<Value>, ApiError> {
    history::mark_read(state.store(), &id).map_err(service_err)?;
    Ok(ok_json(json!({ "id": id })))
}

/// POST /api/notifications/read-all
pub async fn mark_all_read(State(state): State<SharedState>) -> Result<Json<Value>, ApiError> {
    let changed = history::mark_all_read(state.store()).map_err(service_err)?;
    Ok(ok_json(json!({ "changed": changed })))
}

/// DELETE /api/notifications/{id}
pub async fn delete_entry(
    State(state): State<SharedState>,
    Path(id): Path<String>,
) -> Result<Json<Value>, ApiError> {
    history::delete(state.store(), &id).map_err(service_err)?;
    Ok(ok_json(json!({ "id": id })))
}

/// DELETE /api/notifications
pub async fn clear_history(State(state): State<SharedState>) -> Result<Json<Value>, ApiError> {
    history::clear(state.store()).map_err(service_err)?;
    Ok(ok_json(json!(null)))
}
