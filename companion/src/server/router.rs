use axum::{
    Router,
    routing::{delete, get, post, put},
};
use tower_http::cors::CorsLayer;

use super::{api, websocket};
use crate::app::SharedState;

/// Create the axum router with all routes.
pub fn create_router(state: SharedState) -> Router {
    Router::new()
        // --- Core ---
        .route("/status", get(status_handler))
        .route("/ws", get(websocket::ws_handler))
        // --- Watch list ---
        .route("/api/streamers", get(api::streamers::list_streamers).post(api::streamers::add_streamer))
        .route("/api/streamers/order", put(api::streamers::reorder_streamers))
        .route("/api/streamers/status", get(api::streamers::watch_status))
        .route("/api/streamers/search", get(api::streamers::search_streamers))
        .route("/api/streamers/{id}", delete(api::streamers::remove_streamer).patch(api::streamers::update_streamer))
        .route("/api/launch", post(api::streamers::launch))
        .route("/api/multiview/open", post(api::streamers::open_multiview))
        // --- Groups ---
        .route("/api/groups", get(api::groups::list_groups).post(api::groups::create_group))
        .route("/api/groups/{id}", put(api::groups::update_group).delete(api::groups::delete_group))
        .route("/api/groups/{id}/enabled", post(api::groups::set_group_enabled))
        .route("/api/groups/{gid}/members/{sid}", post(api::groups::add_member).delete(api::groups::remove_member))
        // --- Notification history ---
        .route("/api/notifications", get(api::notifications::get_history).delete(api::notifications::clear_history))
        .route("/api/notifications/read-all", post(api::notifications::mark_all_read))
        .route("/api/notifications/{id}/read", post(api::notifications::mark_read))
        .route("/api/notifications/{id}", delete(api::notifications::delete_entry))
        // --- Live status ---
        .route("/api/live", get(api::live::get_live_status))
        .route("/api/live/refresh", post(api::live::refresh_live_status))
        // --- Settings ---
        .route("/api/preferences", get(api::settings::get_preferences).put(api::settings::update_preferences))
        .route("/api/settings/v2", get(api::settings::get_settings).put(api::settings::update_settings))
        .route("/api/settings/v2/reset", post(api::settings::reset_settings))
        // --- Extension host events ---
        .route("/api/host/lifecycle", post(api::host::lifecycle))
        .route("/api/host/cookie-changed", post(api::host::cookie_changed))
        .route("/api/host/notification-clicked", post(api::host::notification_clicked))
        .route("/api/host/permissions", get(api::host::permissions))
        // --- Middleware ---
        .layer(CorsLayer::permissive())
        .with_state(state)
}

async fn status_handler() -> axum::Json<serde_json::Value> {
    axum::Json(serde_json::json!({
        "status": "ok",
        "version": env!("CARGO_PKG_VERSION"),
    }))
}
