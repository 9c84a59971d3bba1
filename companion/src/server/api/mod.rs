//! REST API handlers grouped by domain.

pub mod groups;
pub mod host;
pub mod live;
pub mod notifications;
pub mod settings;
pub mod streamers;

use axum::Json;
use axum::http::StatusCode;
use serde_json::{Value, json};
use watch_db::EntityId;

use crate::services::ServiceError;

pub type ApiError = (StatusCode, Json<Value>);

/// Standard success response.
pub fn ok_json(data: Value) -> Json<Value> {
    Json(json!({ "status": "ok", "data": data }))
}

/// Standard error response.
pub fn err_json(status: u16, message: &str) -> ApiError {
    (
        StatusCode::from_u16(status).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR),
        Json(json!({ "status": "error", "error": message })),
    )
}

pub fn service_err(e: ServiceError) -> ApiError {
    if e.status_code() >= 500 {
        tracing::warn!("Service error: {e}");
    }
    err_json(e.status_code(), &e.to_string())
}

/// Parse an entity id taken from a path segment.
pub fn parse_id(raw: &str) -> Result<EntityId, ApiError> {
    raw.parse()
        .map_err(|e| err_json(400, &format!("invalid streamer id {raw}: {e}")))
}

#[cfg(test)]
mod tests {
    use super::*;
    use watch_db::WatchListError;

    #[test]
    fn service_errors_map_to_status() {
        let (status, body) = service_err(ServiceError::WatchList(WatchListError::Full(50)));
        assert_eq!(status, StatusCode::CONFLICT);
        assert_eq!(body.0["status"], "error");
        assert!(parse_id("x:").is_err());
        assert_eq!(parse_id("c:abc").unwrap().to_string(), "c:abc");
    }
}
