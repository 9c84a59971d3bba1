//! WebSocket message types and helpers.
//!
//! Every message on the broadcast channel is `{"type": <kind>, "data": ...}`.

use serde::Serialize;
use serde_json::json;

use crate::store::StorageChange;

// -- Message type constants --

pub const CONNECTED: &str = "connected";
pub const PONG: &str = "pong";
/// A browser primitive for the extension shim to execute.
pub const HOST_COMMAND: &str = "host_command";
pub const STORAGE_CHANGED: &str = "storage_changed";
pub const LIVE_STATUS_UPDATED: &str = "live_status_updated";

// -- Payload types --

#[derive(Debug, Clone, Serialize)]
pub struct StorageChangedPayload {
    pub key: &'static str,
    pub revision: i64,
    pub external: bool,
}

impl From<StorageChange> for StorageChangedPayload {
    fn from(change: StorageChange) -> Self {
        Self {
            key: change.key.as_str(),
            revision: change.revision,
            external: change.external,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct LiveStatusPayload {
    pub live_count: usize,
    pub transitions: usize,
}

pub fn message<T: Serialize>(kind: &str, data: &T) -> String {
    json!({ "type": kind, "data": data }).to_string()
}
