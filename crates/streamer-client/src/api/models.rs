use serde::{Deserialize, Deserializer, Serialize};

/// `{data: [...]}` envelope used by every streamer endpoint.
#[derive(Debug, Deserialize)]
pub struct ApiResponse<T> {
    #[serde(default = "Vec::new")]
    pub data: Vec<T>,
}

/// One streamer as returned by GET /streamers.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StreamerRecord {
    pub platform: String,
    pub streamer_id: String,
    #[serde(default, deserialize_with = "true_only")]
    pub is_live: bool,
    #[serde(default)]
    pub broad_title: Option<String>,
    #[serde(default)]
    pub thumbnail_url: Option<String>,
    #[serde(default)]
    pub current_viewers: Option<u64>,
    #[serde(default)]
    pub user_nick: Option<String>,
    #[serde(default)]
    pub profile_image: Option<String>,
}

/// `is_live` is live only when it is literally `true`.
fn true_only<'de, D: Deserializer<'de>>(deserializer: D) -> Result<bool, D::Error> {
    let value = serde_json::Value::deserialize(deserializer)?;
    Ok(matches!(value, serde_json::Value::Bool(true)))
}
