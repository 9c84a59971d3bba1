//! SettingsManager: DB-backed runtime settings with defaults and env migration.

use std::collections::BTreeMap;

use watch_db::Database;

use super::SettingInfo;
use super::defaults::DEFAULT_SETTINGS;
use super::validation::validate_setting;

/// Wraps [`Database`] to provide high-level settings operations.
pub struct SettingsManager {
    db: Database,
}

impl SettingsManager {
    pub fn new(db: Database) -> Self {
        Self { db }
    }

    /// Get a setting value. Falls back to default if not in DB.
    pub fn get_setting(&self, key: &str) -> Result<String, anyhow::Error> {
        if let Some(val) = self.db.get_setting(key)? {
            return Ok(val);
        }
        if let Some(def) = DEFAULT_SETTINGS.get(key) {
            return Ok(def.default.to_string());
        }
        anyhow::bail!("setting not found: {key}");
    }

    /// Set a setting value with validation.
    pub fn set_setting(&self, key: &str, value: &str) -> Result<(), anyhow::Error> {
        if !DEFAULT_SETTINGS.contains_key(key) {
            anyhow::bail!("unknown setting key: {key}");
        }
        validate_setting(key, value)
            .map_err(|e| anyhow::anyhow!("validation error for {key}: {e}"))?;
        self.db.set_setting(key, value)?;
        Ok(())
    }

    /// Reset a setting to its default by removing the stored override.
    pub fn reset_setting(&self, key: &str) -> Result<(), anyhow::Error> {
        if !DEFAULT_SETTINGS.contains_key(key) {
            anyhow::bail!("unknown setting key: {key}");
        }
        self.db.delete_setting(key)?;
        Ok(())
    }

    /// Get every known setting, filling in defaults for missing keys.
    pub fn get_all_settings(&self) -> Result<BTreeMap<String, SettingInfo>, anyhow::Error> {
        let stored = self.db.get_all_settings()?;
        let result = DEFAULT_SETTINGS
            .values()
            .map(|def| {
                let value = stored
                    .get(def.key)
                    .cloned()
                    .unwrap_or_else(|| def.default.to_string());
                let info = SettingInfo {
                    key: def.key.to_string(),
                    is_default: value == def.default,
                    value,
                    description: def.description.to_string(),
                };
                (def.key.to_string(), info)
            })
            .collect();
        Ok(result)
    }

    /// Migrate settings from environment variables to DB (one-time).
    pub fn migrate_from_env(&self) -> Result<u32, anyhow::Error> {
        let mut migrated = 0u32;
        for key in DEFAULT_SETTINGS.keys() {
            if self.db.get_setting(key)?.is_some() {
                continue;
            }
            if let Ok(env_val) = std::env::var(key) {
                if env_val.is_empty() {
                    continue;
                }
                if let Err(e) = validate_setting(key, &env_val) {
                    tracing::warn!("Ignoring invalid {key} from env: {e}");
                    continue;
                }
                self.db.set_setting(key, &env_val)?;
                tracing::info!("Migrated setting from env: {key}");
                migrated += 1;
            }
        }
        if migrated > 0 {
            tracing::info!("Migration completed: {migrated} settings migrated");
        }
        Ok(migrated)
    }

    pub fn db(&self) -> &Database {
        &self.db
    }
}
