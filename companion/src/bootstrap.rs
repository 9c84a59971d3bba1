//! Startup: data directory, .env, database, settings migration, config.

use std::path::PathBuf;

use watch_db::Database;

use crate::config::{AppConfig, SettingsManager};

/// Open the database, migrate env settings and load the runtime config.
pub fn init_foundation() -> Result<(Database, AppConfig, PathBuf), anyhow::Error> {
    load_dotenv();
    let dir = data_dir();
    std::fs::create_dir_all(&dir)?;

    let db_path = dir.join("companion.db");
    tracing::info!("Opening database at {}", db_path.display());
    let db = Database::open(&db_path)?;

    let sm = SettingsManager::new(db.clone());
    if let Err(e) = sm.migrate_from_env() {
        tracing::error!("Failed to migrate from env: {e}");
    }

    let config = AppConfig::load(&sm)?;
    tracing::info!(
        api_base = %config.api_base,
        companion_site = %config.companion_site,
        poll_minutes = config.poll_interval_minutes,
        "Configuration loaded"
    );
    Ok((db, config, dir))
}

fn data_dir() -> PathBuf {
    if let Ok(dir) = std::env::var("BNGTS_COMPANION_DATA_DIR") {
        return PathBuf::from(dir);
    }
    dirs::home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(".bngts-companion")
}

/// Load .env from multiple candidate paths.
fn load_dotenv() {
    let candidates = [".env", "../.env", "../../.env"];
    for path in &candidates {
        if dotenvy::from_filename(path).is_ok() {
            tracing::info!("Loaded .env from: {path}");
            return;
        }
    }
    tracing::info!("No .env file found, using system environment variables");
}
