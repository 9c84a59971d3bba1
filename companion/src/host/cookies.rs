//! Cookie shapes exchanged with the extension's cookie API.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PartitionKey {
    pub top_level_site: String,
}

/// A cookie as reported by `cookies.get` / `cookies.onChanged`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Cookie {
    pub name: String,
    #[serde(default)]
    pub value: String,
    pub domain: String,
    #[serde(default = "root_path")]
    pub path: String,
    #[serde(default)]
    pub secure: bool,
    #[serde(default)]
    pub http_only: bool,
    #[serde(default)]
    pub same_site: Option<String>,
    #[serde(default)]
    pub expiration_date: Option<f64>,
    #[serde(default)]
    pub host_only: bool,
    #[serde(default)]
    pub session: bool,
    #[serde(default)]
    pub store_id: Option<String>,
    #[serde(default)]
    pub partition_key: Option<PartitionKey>,
    #[serde(default)]
    pub first_party_domain: Option<String>,
    /// Attributes not modeled above (e.g. `sameParty`), kept as reported.
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

fn root_path() -> String {
    "/".to_string()
}

/// Payload of `cookies.onChanged`.
#[derive(Debug, Clone, Deserialize)]
pub struct CookieChange {
    pub cookie: Cookie,
    #[serde(default)]
    pub removed: bool,
}

/// Arguments of one `cookies.set` call.
///
/// Copies every attribute of the source cookie except `hostOnly` and
/// `session`, which `cookies.set` does not accept.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CookieSetRequest {
    pub url: String,
    pub name: String,
    pub value: String,
    pub domain: String,
    pub path: String,
    pub secure: bool,
    pub http_only: bool,
    pub same_site: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub expiration_date: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub store_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub partition_key: Option<PartitionKey>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub first_party_domain: Option<String>,
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

impl CookieSetRequest {
    /// Unscoped copy usable from third-party frames (`SameSite=None; Secure`).
    pub fn cross_site_copy(cookie: &Cookie, url: &str) -> Self {
        Self {
            url: url.to_string(),
            name: cookie.name.clone(),
            value: cookie.value.clone(),
            domain: cookie.domain.clone(),
            path: cookie.path.clone(),
            secure: true,
            http_only: cookie.http_only,
            same_site: "no_restriction".to_string(),
            expiration_date: cookie.expiration_date,
            store_id: cookie.store_id.clone(),
            partition_key: None,
            first_party_domain: None,
            extra: cookie.extra.clone(),
        }
    }
}

/// Ordered `cookies.set` attempts. The shim stops at the first one that
/// succeeds and ignores failures.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CookieSetPlan {
    pub attempts: Vec<CookieSetRequest>,
}

#[cfg(test)]
pub(crate) fn sample_cookie(name: &str, domain: &str) -> Cookie {
    Cookie {
        name: name.to_string(),
        value: "secret".to_string(),
        domain: domain.to_string(),
        path: "/".to_string(),
        secure: false,
        http_only: true,
        same_site: Some("lax".to_string()),
        expiration_date: Some(1_900_000_000.0),
        host_only: false,
        session: false,
        store_id: Some("0".to_string()),
        partition_key: None,
        first_party_domain: None,
        extra: serde_json::Map::new(),
    }
}
