//! Runtime application configuration loaded from DB + environment overrides.

use std::time::Duration;

use super::manager::SettingsManager;

/// Runtime configuration populated from the settings DB.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub api_base: String,
    pub companion_site: String,
    pub server_port: u16,
    pub poll_interval_minutes: u64,
    pub surface_refresh_seconds: u64,
    pub external_change_poll_ms: u64,
    pub permission_page_url: String,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            api_base: streamer_client::api::DEFAULT_API_BASE.into(),
            companion_site: "https://bngts.com".into(),
            server_port: 50010,
            poll_interval_minutes: 5,
            surface_refresh_seconds: 60,
            external_change_poll_ms: 1000,
            permission_page_url: "permission.html".into(),
        }
    }
}

impl AppConfig {
    /// Load configuration from the settings manager (DB-first, env overrides).
    pub fn load(sm: &SettingsManager) -> Result<Self, anyhow::Error> {
        let g = |key: &str| -> String { sm.get_setting(key).unwrap_or_default() };
        let defaults = Self::default();

        let mut server_port = parse_or(&g("SERVER_PORT"), defaults.server_port);
        let mut api_base = non_empty_or(g("API_BASE"), defaults.api_base);

        // Environment variable overrides
        if let Ok(v) = std::env::var("SERVER_PORT") {
            if let Ok(p) = v.parse::<u16>() {
                server_port = p;
            }
        }
        if let Ok(v) = std::env::var("API_BASE") {
            if !v.is_empty() {
                api_base = v;
            }
        }

        Ok(Self {
            api_base,
            companion_site: non_empty_or(g("COMPANION_SITE"), defaults.companion_site)
                .trim_end_matches('/')
                .to_string(),
            server_port,
            poll_interval_minutes: parse_or(
                &g("POLL_INTERVAL_MINUTES"),
                defaults.poll_interval_minutes,
            ),
            surface_refresh_seconds: parse_or(
                &g("SURFACE_REFRESH_SECONDS"),
                defaults.surface_refresh_seconds,
            ),
            external_change_poll_ms: parse_or(
                &g("EXTERNAL_CHANGE_POLL_MS"),
                defaults.external_change_poll_ms,
            ),
            permission_page_url: non_empty_or(
                g("PERMISSION_PAGE_URL"),
                defaults.permission_page_url,
            ),
        })
    }

    /// Reload config from the settings manager.
    pub fn reload(&mut self, sm: &SettingsManager) -> Result<(), anyhow::Error> {
        *self = Self::load(sm)?;
        Ok(())
    }

    pub fn poll_interval(&self) -> Duration {
        Duration::from_secs(self.poll_interval_minutes.max(1) * 60)
    }

    pub fn surface_refresh_interval(&self) -> Duration {
        Duration::from_secs(self.surface_refresh_seconds.max(10))
    }

    pub fn external_change_interval(&self) -> Duration {
        Duration::from_millis(self.external_change_poll_ms.max(100))
    }

    pub fn multiview_url(&self) -> String {
        format!("{}/multiview", self.companion_site)
    }
}

fn parse_or<T: std::str::FromStr>(s: &str, default: T) -> T {
    if s.is_empty() {
        return default;
    }
    s.parse().unwrap_or(default)
}

fn non_empty_or(value: String, default: String) -> String {
    if value.trim().is_empty() { default } else { value }
}
