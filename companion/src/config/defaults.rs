//! All setting definitions with their default values.

use std::collections::HashMap;
use std::sync::LazyLock;

type DefTuple = (&'static str, &'static str, &'static str);

const DEFS: &[DefTuple] = &[
    ("API_BASE", "https://bngts.com/api", "Base URL of the streamer API"),
    ("COMPANION_SITE", "https://bngts.com", "Multiview site opened by the watch action"),
    ("SERVER_PORT", "50010", "Port of the local bridge server"),
    ("POLL_INTERVAL_MINUTES", "5", "Background live-status poll interval"),
    ("SURFACE_REFRESH_SECONDS", "60", "Refresh interval while a surface is open"),
    ("EXTERNAL_CHANGE_POLL_MS", "1000", "How often to look for writes made by other processes"),
    ("PERMISSION_PAGE_URL", "permission.html", "Page opened when host permissions are missing"),
];

/// A single setting definition.
#[derive(Debug, Clone)]
pub struct SettingDef {
    pub key: &'static str,
    pub default: &'static str,
    pub description: &'static str,
}

/// Global setting definitions indexed by key.
pub static DEFAULT_SETTINGS: LazyLock<HashMap<&'static str, SettingDef>> = LazyLock::new(|| {
    DEFS.iter()
        .map(|&(key, default, description)| {
            (
                key,
                SettingDef {
                    key,
                    default,
                    description,
                },
            )
        })
        .collect()
});

/// Get the default value for a setting key, or `None` if not defined.
pub fn get_default(key: &str) -> Option<&'static str> {
    DEFAULT_SETTINGS.get(key).map(|d| d.default)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::validation::validate_setting;

    #[test]
    fn every_default_passes_validation() {
        for def in DEFAULT_SETTINGS.values() {
            assert!(
                validate_setting(def.key, def.default).is_ok(),
                "default for {} is invalid",
                def.key
            );
        }
        assert_eq!(get_default("POLL_INTERVAL_MINUTES"), Some("5"));
        assert_eq!(get_default("NOPE"), None);
    }
}
