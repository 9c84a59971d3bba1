//! Events reported by the extension shim:
//!   POST /api/host/lifecycle             – install/startup/permission change
//!   POST /api/host/cookie-changed        – cookies.onChanged
//!   POST /api/host/notification-clicked – notifications.onClicked
//!   GET  /api/host/permissions           – required origins and gate state

use axum::Json;
use axum::extract::State;
use serde::Deserialize;
use serde_json::{Value, json};

use super::{ApiError, err_json, ok_json};
use crate::app::SharedState;
use crate::host::CookieChange;
use crate::services::lifecycle::{self, LifecycleReport};
use crate::services::permissions::REQUIRED_ORIGINS;
use crate::services::{cookie_repair, notifier};

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NotificationClick {
    pub notification_id: String,
}

/// POST /api/host/lifecycle
pub async fn lifecycle(
    State(state): State<SharedState>,
    Json(report): Json<LifecycleReport>,
) -> Json<Value> {
    let page = state.config().await.permission_page_url.clone();
    let outcome = lifecycle::on_report(state.permissions(), state.host(), &page, &report);

    if let Ok(snapshot) = state.store().live_snapshot() {
        crate::services::badge::paint(state.host(), &snapshot);
    }
    if outcome.poll {
        let s = state.clone();
        tokio::spawn(async move {
            if let Err(e) = s.sync_live_status().await {
                tracing::warn!("Startup live status sync failed: {e}");
            }
        });
    }
    ok_json(json!(outcome))
}

/// POST /api/host/cookie-changed
pub async fn cookie_changed(
    State(state): State<SharedState>,
    Json(change): Json<CookieChange>,
) -> Json<Value> {
    if !state.permissions().is_granted() {
        return ok_json(json!({ "writes": 0, "skipped": "permission" }));
    }
    let writes = cookie_repair::handle_cookie_change(state.host(), &change);
    ok_json(json!({ "writes": writes }))
}

/// POST /api/host/notification-clicked
pub async fn notification_clicked(
    State(state): State<SharedState>,
    Json(body): Json<NotificationClick>,
) -> Result<Json<Value>, ApiError> {
    let handled = notifier::handle_click(state.store(), state.host(), &body.notification_id)
        .map_err(|e| err_json(500, &format!("Failed to update history: {e}")))?;
    Ok(ok_json(json!({ "handled": handled })))
}

/// GET /api/host/permissions
pub async fn permissions(State(state): State<SharedState>) -> Json<Value> {
    let page = state.config().await.permission_page_url.clone();
    ok_json(json!({
        "origins": REQUIRED_ORIGINS,
        "granted": state.permissions().is_granted(),
        "permissionPage": page,
    }))
}
