//! Entity identifiers and the per-entity records keyed by them.

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;
use std::sync::LazyLock;

use regex::Regex;
use serde::{Deserialize, Deserializer, Serialize};

static RE_CHZZK_CHANNEL: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[0-9A-Fa-f]{32}$").expect("valid regex"));
static RE_SOOP_USER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[A-Za-z0-9]{3,12}$").expect("valid regex"));

/// Streaming platform an entity lives on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Platform {
    #[serde(alias = "s")]
    Soop,
    #[serde(alias = "c")]
    Chzzk,
}

impl Platform {
    pub fn prefix(self) -> &'static str {
        match self {
            Platform::Soop => "s",
            Platform::Chzzk => "c",
        }
    }

    pub fn from_prefix(prefix: &str) -> Option<Self> {
        match prefix {
            "s" => Some(Platform::Soop),
            "c" => Some(Platform::Chzzk),
            _ => None,
        }
    }

    /// Name used by the remote streamer API (`platform` field).
    pub fn api_name(self) -> &'static str {
        match self {
            Platform::Soop => "soop",
            Platform::Chzzk => "chzzk",
        }
    }

    pub fn from_api_name(name: &str) -> Option<Self> {
        match name {
            "soop" => Some(Platform::Soop),
            "chzzk" => Some(Platform::Chzzk),
            _ => None,
        }
    }

    pub fn display_name(self) -> &'static str {
        match self {
            Platform::Soop => "SOOP",
            Platform::Chzzk => "CHZZK",
        }
    }

    /// Canonical watch page for a raw channel id.
    pub fn watch_url(self, raw_id: &str) -> String {
        match self {
            Platform::Soop => format!("https://play.sooplive.co.kr/{raw_id}"),
            Platform::Chzzk => format!("https://chzzk.naver.com/live/{raw_id}"),
        }
    }

    /// Guess the platform of an unprefixed id the way legacy watch lists were stored.
    pub fn infer_from_raw(raw_id: &str) -> Option<Self> {
        if RE_CHZZK_CHANNEL.is_match(raw_id) {
            Some(Platform::Chzzk)
        } else if RE_SOOP_USER.is_match(raw_id) {
            Some(Platform::Soop)
        } else {
            None
        }
    }
}

impl FromStr for Platform {
    type Err = EntityIdError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let lower = s.trim().to_ascii_lowercase();
        Platform::from_prefix(&lower)
            .or_else(|| Platform::from_api_name(&lower))
            .ok_or(EntityIdError::UnknownPlatform(s.to_string()))
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum EntityIdError {
    #[error("entity id is empty")]
    Empty,

    #[error("unknown platform: {0}")]
    UnknownPlatform(String),

    #[error("invalid channel id: {0}")]
    InvalidRawId(String),
}

/// `<platform-prefix>:<raw-id>`, the key of every per-entity record.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct EntityId {
    platform: Platform,
    raw_id: String,
}

impl EntityId {
    pub fn new(platform: Platform, raw_id: &str) -> Result<Self, EntityIdError> {
        let raw_id = raw_id.trim();
        if raw_id.is_empty() {
            return Err(EntityIdError::Empty);
        }
        if raw_id
            .chars()
            .any(|c| c.is_whitespace() || matches!(c, '/' | ',' | '?' | '#'))
        {
            return Err(EntityIdError::InvalidRawId(raw_id.to_string()));
        }
        Ok(Self {
            platform,
            raw_id: raw_id.to_string(),
        })
    }

    pub fn platform(&self) -> Platform {
        self.platform
    }

    pub fn raw_id(&self) -> &str {
        &self.raw_id
    }

    pub fn watch_url(&self) -> String {
        self.platform.watch_url(&self.raw_id)
    }

    /// Tag of the native notification announcing this entity went live.
    pub fn notification_tag(&self) -> String {
        format!("live-{self}")
    }

    pub fn from_notification_tag(tag: &str) -> Option<Self> {
        tag.strip_prefix("live-")?.parse().ok()
    }
}

impl fmt::Display for EntityId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.platform.prefix(), self.raw_id)
    }
}

impl FromStr for EntityId {
    type Err = EntityIdError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        if s.is_empty() {
            return Err(EntityIdError::Empty);
        }
        if let Some((prefix, raw)) = s.split_once(':') {
            if let Some(platform) = Platform::from_prefix(prefix) {
                return EntityId::new(platform, raw);
            }
        }
        // Entries saved before ids carried a prefix.
        match Platform::infer_from_raw(s) {
            Some(platform) => EntityId::new(platform, s),
            None => Err(EntityIdError::UnknownPlatform(s.to_string())),
        }
    }
}

impl TryFrom<String> for EntityId {
    type Error = EntityIdError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<EntityId> for String {
    fn from(id: EntityId) -> Self {
        id.to_string()
    }
}

/// Only a JSON `true` counts; `null`, absent, or any other value is `false`.
fn true_only<'de, D: Deserializer<'de>>(deserializer: D) -> Result<bool, D::Error> {
    let value = serde_json::Value::deserialize(deserializer)?;
    Ok(matches!(value, serde_json::Value::Bool(true)))
}

/// Live status of one entity as last reported by the streamer API.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct LiveStatus {
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
}

impl LiveStatus {
    pub fn live(title: &str) -> Self {
        Self {
            is_live: true,
            broad_title: Some(title.to_string()),
            ..Self::default()
        }
    }

    pub fn offline() -> Self {
        Self::default()
    }
}

/// Most recent live-status mapping, persisted wholesale.
pub type LiveSnapshot = BTreeMap<EntityId, LiveStatus>;

/// User-editable metadata of a watched entity.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EntityMeta {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub nick: Option<String>,
    #[serde(default, skip_serializing_if = "is_false")]
    pub disabled: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notification_enabled: Option<bool>,
}

impl EntityMeta {
    /// Notifications stay on unless explicitly switched off.
    pub fn notifications_allowed(&self) -> bool {
        self.notification_enabled != Some(false)
    }

    pub fn is_empty(&self) -> bool {
        self == &Self::default()
    }
}

pub type MetaMap = BTreeMap<EntityId, EntityMeta>;

fn is_false(v: &bool) -> bool {
    !*v
}

pub const SOOP_QUALITIES: &[&str] = &["auto", "1440p", "1080p", "720p", "540p", "360p"];
pub const CHZZK_QUALITIES: &[&str] = &["auto", "1080p", "720p", "480p", "360p"];

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ViewMode {
    #[default]
    List,
    Grid,
}

/// Process-wide user toggles shared by every surface.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserSettings {
    #[serde(default)]
    pub notification: bool,
    #[serde(default = "default_true")]
    pub tooltip: bool,
    #[serde(default = "default_quality")]
    pub soop_quality: String,
    #[serde(default = "default_quality")]
    pub chzzk_quality: String,
    #[serde(default)]
    pub view_mode: ViewMode,
}

impl Default for UserSettings {
    fn default() -> Self {
        Self {
            notification: false,
            tooltip: true,
            soop_quality: default_quality(),
            chzzk_quality: default_quality(),
            view_mode: ViewMode::default(),
        }
    }
}

impl UserSettings {
    pub fn validate(&self) -> Result<(), String> {
        if !SOOP_QUALITIES.contains(&self.soop_quality.as_str()) {
            return Err(format!("unsupported SOOP quality: {}", self.soop_quality));
        }
        if !CHZZK_QUALITIES.contains(&self.chzzk_quality.as_str()) {
            return Err(format!("unsupported CHZZK quality: {}", self.chzzk_quality));
        }
        Ok(())
    }
}

fn default_true() -> bool {
    true
}

fn default_quality() -> String {
    "auto".to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn snapshot_reads_non_true_is_live_as_offline() {
        let snapshot: LiveSnapshot = serde_json::from_str(
            r#"{
              "s:abc": {"is_live": true, "broad_title": "on"},
              "s:def": {"is_live": null},
              "c:0123456789abcdef0123456789abcdef": {"is_live": "yes", "broad_title": null},
              "s:ghi": {}
            }"#,
        )
        .unwrap();

        assert_eq!(snapshot.len(), 4);
        let live: Vec<_> = snapshot
            .iter()
            .filter(|(_, s)| s.is_live)
            .map(|(id, _)| id.to_string())
            .collect();
        assert_eq!(live, vec!["s:abc".to_string()]);
    }

    #[test]
    fn parses_prefixed_ids() {
        let id: EntityId = "c:0123456789abcdef0123456789abcdef".parse().unwrap();
        assert_eq!(id.platform(), Platform::Chzzk);
        assert_eq!(id.raw_id(), "0123456789abcdef0123456789abcdef");
        assert_eq!(id.to_string(), "c:0123456789abcdef0123456789abcdef");

        let id: EntityId = "s:phonics1".parse().unwrap();
        assert_eq!(id.platform(), Platform::Soop);
    }

    #[test]
    fn infers_platform_of_legacy_ids() {
        let chzzk: EntityId = "0123456789ABCDEF0123456789abcdef".parse().unwrap();
        assert_eq!(chzzk.platform(), Platform::Chzzk);

        let soop: EntityId = "ecvhao".parse().unwrap();
        assert_eq!(soop.to_string(), "s:ecvhao");

        assert!(matches!(
            "not a valid id!".parse::<EntityId>(),
            Err(EntityIdError::UnknownPlatform(_))
        ));
    }

    #[test]
    fn rejects_empty_and_path_breaking_ids() {
        assert_eq!("".parse::<EntityId>(), Err(EntityIdError::Empty));
        assert_eq!("s:".parse::<EntityId>(), Err(EntityIdError::Empty));
        assert!(matches!(
            EntityId::new(Platform::Soop, "a/b"),
            Err(EntityIdError::InvalidRawId(_))
        ));
    }

    #[test]
    fn notification_tag_round_trips() {
        let id = EntityId::new(Platform::Soop, "abc").unwrap();
        assert_eq!(id.notification_tag(), "live-s:abc");
        assert_eq!(EntityId::from_notification_tag("live-s:abc"), Some(id));
        assert_eq!(EntityId::from_notification_tag("other-s:abc"), None);
    }

    #[test]
    fn watch_urls_follow_platform_templates() {
        let soop = EntityId::new(Platform::Soop, "abc").unwrap();
        assert_eq!(soop.watch_url(), "https://play.sooplive.co.kr/abc");
        let chzzk = EntityId::new(Platform::Chzzk, "xyz").unwrap();
        assert_eq!(chzzk.watch_url(), "https://chzzk.naver.com/live/xyz");
    }

    #[test]
    fn platform_accepts_prefix_and_api_name() {
        assert_eq!("s".parse::<Platform>().unwrap(), Platform::Soop);
        assert_eq!("CHZZK".parse::<Platform>().unwrap(), Platform::Chzzk);
        assert!("twitch".parse::<Platform>().is_err());
    }

    #[test]
    fn snapshot_serializes_with_string_keys() {
        let mut snapshot = LiveSnapshot::new();
        snapshot.insert("s:abc".parse().unwrap(), LiveStatus::live("hello"));
        let json = serde_json::to_value(&snapshot).unwrap();
        assert_eq!(json["s:abc"]["is_live"], true);

        let back: LiveSnapshot = serde_json::from_value(json).unwrap();
        assert_eq!(back, snapshot);
    }

    #[test]
    fn meta_defaults_allow_notifications() {
        let meta: EntityMeta = serde_json::from_str(r#"{"nick":"n"}"#).unwrap();
        assert!(meta.notifications_allowed());
        assert!(!meta.disabled);

        let muted: EntityMeta = serde_json::from_str(r#"{"notificationEnabled":false}"#).unwrap();
        assert!(!muted.notifications_allowed());
        assert_eq!(
            serde_json::to_string(&EntityMeta::default()).unwrap(),
            "{}"
        );
    }

    #[test]
    fn user_settings_fill_defaults_and_validate() {
        let settings: UserSettings = serde_json::from_str(r#"{"notification":true}"#).unwrap();
        assert!(settings.notification);
        assert!(settings.tooltip);
        assert_eq!(settings.soop_quality, "auto");
        assert_eq!(settings.view_mode, ViewMode::List);
        assert!(settings.validate().is_ok());

        let bad = UserSettings {
            chzzk_quality: "1440p".into(),
            ..UserSettings::default()
        };
        assert!(bad.validate().is_err());
    }
}
