//! User settings record (global notification switch, qualities, view mode).

use serde::Deserialize;
use watch_db::{UserSettings, ViewMode};

use super::ServiceError;
use crate::store::Store;

/// Partial update; absent fields keep their stored value.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserSettingsPatch {
    pub notification: Option<bool>,
    pub tooltip: Option<bool>,
    pub soop_quality: Option<String>,
    pub chzzk_quality: Option<String>,
    pub view_mode: Option<ViewMode>,
}

impl UserSettingsPatch {
    fn apply(self, settings: &mut UserSettings) {
        if let Some(v) = self.notification {
            settings.notification = v;
        }
        if let Some(v) = self.tooltip {
            settings.tooltip = v;
        }
        if let Some(v) = self.soop_quality {
            settings.soop_quality = v;
        }
        if let Some(v) = self.chzzk_quality {
            settings.chzzk_quality = v;
        }
        if let Some(v) = self.view_mode {
            settings.view_mode = v;
        }
    }
}

pub fn get(store: &Store) -> Result<UserSettings, ServiceError> {
    Ok(store.user_settings()?)
}

/// Read-modify-write. Nothing is stored when the result does not validate.
pub fn update(store: &Store, patch: UserSettingsPatch) -> Result<UserSettings, ServiceError> {
    let mut settings = store.user_settings()?;
    patch.apply(&mut settings);
    settings.validate().map_err(ServiceError::InvalidSettings)?;
    store.set_user_settings(&settings)?;
    Ok(settings)
}
