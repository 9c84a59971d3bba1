//! Configuration management: defaults, validation, loading from DB + environment.

pub mod app_config;
pub mod defaults;
pub mod manager;
pub mod validation;

pub use app_config::AppConfig;
pub use manager::SettingsManager;

use serde::{Deserialize, Serialize};

/// A setting as returned to the dashboard.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SettingInfo {
    pub key: String,
    pub value: String,
    pub description: String,
    pub is_default: bool,
}
