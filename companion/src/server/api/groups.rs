//! Group API.

use axum::Json;
use axum::extract::{Path, State};
use serde::Deserialize;
use serde_json::{Value, json};

use super::{ApiError, ok_json, parse_id, service_err};
use crate::app::SharedState;
use crate::services::groups;

#[derive(Debug, Deserialize)]
pub struct CreateGroupRequest {
    pub name: String,
    pub color: String,
}

#[derive(Debug, Deserialize)]
pub struct UpdateGroupRequest {
    pub name: Option<String>,
    pub color: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct SetEnabledRequest {
    pub enabled: bool,
}

/// GET /api/groups
pub async fn list_groups(State(state): State<SharedState>) -> Result<Json<Value>, ApiError> {
    let all = groups::list(state.store()).map_err(service_err)?;
    Ok(ok_json(json!(all)))
}

/// POST /api/groups
pub async fn create_group(
    State(state): State<SharedState>,
    Json(body): Json<CreateGroupRequest>,
) -> Result<Json<Value>, ApiError> {
    let group = groups::create(state.store(), &body.name, &body.color).map_err(service_err)?;
    Ok(ok_json(json!(group)))
}

/// PUT /api/groups/{id}
pub async fn update_group(
    State(state): State<SharedState>,
    Path(id): Path<String>,
    Json(body): Json<UpdateGroupRequest>,
) -> Result<Json<Value>, ApiError> {
    let group = groups::update(
        state.store(),
        &id,
        body.name.as_deref(),
        body.color.as_deref(),
    )
    .map_err(service_err)?;
    Ok(ok_json(json!(group)))
}

/// DELETE /api/groups/{id}
pub async fn delete_group(
    State(state): State<SharedState>,
    Path(id): Path<String>,
) -> Result<Json<Value>, ApiError> {
    groups::delete(state.store(), &id).map_err(service_err)?;
    Ok(ok_json(json!({ "id": id })))
}

/// POST /api/groups/{id}/enabled
pub async fn set_group_enabled(
    State(state): State<SharedState>,
    Path(id): Path<String>,
    Json(body): Json<SetEnabledRequest>,
) -> Result<Json<Value>, ApiError> {
    let updated = groups::set_enabled(state.store(), &id, body.enabled).map_err(service_err)?;
    Ok(ok_json(json!({ "updated": updated })))
}

/// POST /api/groups/{gid}/members/{sid}
pub async fn add_member(
    State(state): State<SharedState>,
    Path((gid, sid)): Path<(String, String)>,
) -> Result<Json<Value>, ApiError> {
    let id = parse_id(&sid)?;
    let added = groups::add_member(state.store(), &gid, &id).map_err(service_err)?;
    Ok(ok_json(json!({ "changed": added })))
}

/// DELETE /api/groups/{gid}/members/{sid}
pub async fn remove_member(
    State(state): State<SharedState>,
    Path((gid, sid)): Path<(String, String)>,
) -> Result<Json<Value>, ApiError> {
    let id = parse_id(&sid)?;
    let removed = groups::remove_member(state.store(), &gid, &id).map_err(service_err)?;
    Ok(ok_json(json!({ "changed": removed })))
}
