//! Settings API:
//!   GET  /api/preferences        – user settings record
//!   PUT  /api/preferences        – partial update of user settings
//!   GET  /api/settings/v2        – runtime configuration
//!   PUT  /api/settings/v2        – update runtime configuration
//!   POST /api/settings/v2/reset  – reset runtime configuration keys

use std::collections::HashMap;

use axum::Json;
use axum::extract::State;
use serde::Deserialize;
use serde_json::{Value, json};

use super::{ApiError, err_json, ok_json, service_err};
use crate::app::SharedState;
use crate::config::SettingsManager;
use crate::config::defaults::DEFAULT_SETTINGS;
use crate::services::preferences::{self, UserSettingsPatch};

#[derive(Debug, Default, Deserialize)]
pub struct ResetRequest {
    #[serde(default)]
    pub keys: Vec<String>,
}

/// GET /api/preferences
pub async fn get_preferences(State(state): State<SharedState>) -> Result<Json<Value>, ApiError> {
    let settings = preferences::get(state.store()).map_err(service_err)?;
    Ok(ok_json(json!(settings)))
}

/// PUT /api/preferences
pub async fn update_preferences(
    State(state): State<SharedState>,
    Json(patch): Json<UserSettingsPatch>,
) -> Result<Json<Value>, ApiError> {
    let settings = preferences::update(state.store(), patch).map_err(service_err)?;
    Ok(ok_json(json!(settings)))
}

/// GET /api/settings/v2
pub async fn get_settings(State(state): State<SharedState>) -> Result<Json<Value>, ApiError> {
    let sm = SettingsManager::new(state.db().clone());
    let all = sm
        .get_all_settings()
        .map_err(|e| err_json(500, &format!("Failed to get settings: {e}")))?;
    Ok(ok_json(json!(all)))
}

/// PUT /api/settings/v2
pub async fn update_settings(
    State(state): State<SharedState>,
    Json(body): Json<HashMap<String, String>>,
) -> Result<Json<Value>, ApiError> {
    let sm = SettingsManager::new(state.db().clone());

    let mut updated = 0u32;
    for (key, value) in &body {
        sm.set_setting(key, value)
            .map_err(|e| err_json(400, &format!("{key}: {e}")))?;
        updated += 1;
    }

    state
        .reload_config()
        .await
        .map_err(|e| err_json(500, &format!("Failed to reload config: {e}")))?;

    let all = sm
        .get_all_settings()
        .map_err(|e| err_json(500, &format!("Failed to get settings: {e}")))?;
    Ok(ok_json(json!({
        "message": format!("Updated {updated} setting(s) successfully"),
        "settings": all,
    })))
}

/// POST /api/settings/v2/reset – empty `keys` resets everything
pub async fn reset_settings(
    State(state): State<SharedState>,
    Json(body): Json<ResetRequest>,
) -> Result<Json<Value>, ApiError> {
    let sm = SettingsManager::new(state.db().clone());
    let targets: Vec<&str> = if body.keys.is_empty() {
        DEFAULT_SETTINGS.keys().copied().collect()
    } else {
        body.keys.iter().map(String::as_str).collect()
    };

    for key in &targets {
        sm.reset_setting(key)
            .map_err(|e| err_json(400, &format!("Failed to reset {key}: {e}")))?;
    }

    state
        .reload_config()
        .await
        .map_err(|e| err_json(500, &format!("Failed to reload config: {e}")))?;
    Ok(ok_json(json!({ "reset": targets.len() })))
}
