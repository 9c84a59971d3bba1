//! Watch list API:
//!   GET    /api/streamers          – watch list joined with meta, live status, groups
//!   POST   /api/streamers          – add (then a single-entity live check)
//!   PATCH  /api/streamers/{id}     – disabled / nick / notificationEnabled
//!   DELETE /api/streamers/{id}     – remove everywhere
//!   PUT    /api/streamers/order    – replace order
//!   GET    /api/streamers/status   – counts and SOOP warning
//!   GET    /api/streamers/search   – autocomplete
//!   POST   /api/launch             – open multiview with enabled streamers
//!   POST   /api/multiview/open     – open the bare multiview page

use axum::Json;
use axum::extract::{Path, Query, State};
use serde::Deserialize;
use serde_json::{Value, json};
use watch_db::{EntityId, Platform};

use super::{ApiError, err_json, ok_json, parse_id, service_err};
use crate::app::SharedState;
use crate::services::{search, watch_list};

#[derive(Debug, Deserialize)]
pub struct AddStreamerRequest {
    pub platform: Platform,
    pub id: String,
    #[serde(default)]
    pub nick: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateStreamerRequest {
    pub disabled: Option<bool>,
    /// Empty string clears the nickname.
    pub nick: Option<String>,
    pub notification_enabled: Option<bool>,
}

#[derive(Debug, Deserialize)]
pub struct ReorderRequest {
    pub order: Vec<EntityId>,
}

#[derive(Debug, Deserialize)]
pub struct SearchParams {
    #[serde(default)]
    pub q: String,
}

/// GET /api/streamers
pub async fn list_streamers(State(state): State<SharedState>) -> Result<Json<Value>, ApiError> {
    let entries = watch_list::view(state.store()).map_err(service_err)?;
    let status = watch_list::status(state.store()).map_err(service_err)?;
    Ok(ok_json(json!({ "streamers": entries, "summary": status })))
}

/// POST /api/streamers
pub async fn add_streamer(
    State(state): State<SharedState>,
    Json(body): Json<AddStreamerRequest>,
) -> Result<Json<Value>, ApiError> {
    let id = watch_list::add(state.store(), body.platform, &body.id, body.nick.as_deref())
        .map_err(service_err)?;

    let s = state.clone();
    let check_id = id.clone();
    tokio::spawn(async move {
        if let Err(e) = s.check_single(&check_id).await {
            tracing::warn!(id = %check_id, "Post-add live check failed: {e}");
        }
    });

    Ok(ok_json(json!({ "id": id })))
}

/// PATCH /api/streamers/{id}
pub async fn update_streamer(
    State(state): State<SharedState>,
    Path(raw): Path<String>,
    Json(body): Json<UpdateStreamerRequest>,
) -> Result<Json<Value>, ApiError> {
    let id = parse_id(&raw)?;
    let store = state.store();
    if let Some(disabled) = body.disabled {
        watch_list::set_disabled(store, &id, disabled).map_err(service_err)?;
    }
    if let Some(nick) = body.nick.as_deref() {
        watch_list::set_nick(store, &id, Some(nick)).map_err(service_err)?;
    }
    if let Some(enabled) = body.notification_enabled {
        watch_list::set_notification_enabled(store, &id, enabled).map_err(service_err)?;
    }
    Ok(ok_json(json!({ "id": id })))
}

/// DELETE /api/streamers/{id}
pub async fn remove_streamer(
    State(state): State<SharedState>,
    Path(raw): Path<String>,
) -> Result<Json<Value>, ApiError> {
    let id = parse_id(&raw)?;
    watch_list::remove(state.store(), &id).map_err(service_err)?;
    Ok(ok_json(json!({ "id": id })))
}

/// PUT /api/streamers/order
pub async fn reorder_streamers(
    State(state): State<SharedState>,
    Json(body): Json<ReorderRequest>,
) -> Result<Json<Value>, ApiError> {
    watch_list::reorder(state.store(), body.order).map_err(service_err)?;
    Ok(ok_json(json!(null)))
}

/// GET /api/streamers/status
pub async fn watch_status(State(state): State<SharedState>) -> Result<Json<Value>, ApiError> {
    let status = watch_list::status(state.store()).map_err(service_err)?;
    Ok(ok_json(json!(status)))
}

/// GET /api/streamers/search?q=
pub async fn search_streamers(
    State(state): State<SharedState>,
    Query(params): Query<SearchParams>,
) -> Result<Json<Value>, ApiError> {
    let list = state
        .store()
        .watch_list()
        .map_err(|e| err_json(500, &format!("Failed to read watch list: {e}")))?;
    let client = state.client().await;
    let hits = search::search(&client, &list, &params.q).await;
    Ok(ok_json(json!(hits)))
}

/// POST /api/launch
pub async fn launch(State(state): State<SharedState>) -> Result<Json<Value>, ApiError> {
    let site = state.config().await.companion_site.clone();
    let url = watch_list::launch(state.store(), state.host(), &site).map_err(service_err)?;
    Ok(ok_json(json!({ "url": url })))
}

/// POST /api/multiview/open
pub async fn open_multiview(State(state): State<SharedState>) -> Json<Value> {
    let url = state.config().await.multiview_url();
    watch_list::open_multiview(state.host(), &url);
    ok_json(json!({ "url": url }))
}
