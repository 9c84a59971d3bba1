use std::path::PathBuf;
use std::sync::Arc;

use streamer_client::StreamerApiClient;
use tokio::sync::{RwLock, broadcast};
use tokio_util::sync::CancellationToken;
use watch_db::{Database, DbError, EntityId};

use crate::config::{AppConfig, SettingsManager};
use crate::events;
use crate::host::{BridgeHost, ExtensionHost};
use crate::services::live_sync::{self, PollGuard, SyncOutcome};
use crate::services::permissions::PermissionGate;
use crate::store::Store;

/// Application shared state accessible from axum handlers and background loops.
#[derive(Clone)]
pub struct SharedState {
    inner: Arc<SharedStateInner>,
}

struct SharedStateInner {
    /// Broadcast channel for WebSocket messages
    ws_tx: broadcast::Sender<String>,
    /// Application configuration (reloadable)
    config: RwLock<AppConfig>,
    store: Store,
    /// Rebuilt whenever API_BASE changes
    client: RwLock<StreamerApiClient>,
    host: Arc<dyn ExtensionHost>,
    poll_guard: PollGuard,
    permissions: PermissionGate,
    shutdown: CancellationToken,
    /// Data directory path
    data_dir: PathBuf,
}

impl SharedState {
    /// Create shared state whose host commands go out over the WebSocket.
    pub fn new(db: Database, config: AppConfig, data_dir: PathBuf) -> Result<Self, anyhow::Error> {
        let (ws_tx, _) = broadcast::channel(2048);
        let host = Arc::new(BridgeHost::new(ws_tx.clone()));
        Self::assemble(ws_tx, db, config, data_dir, host)
    }

    /// Same as [`SharedState::new`] with a caller-provided host.
    pub fn with_host(
        db: Database,
        config: AppConfig,
        data_dir: PathBuf,
        host: Arc<dyn ExtensionHost>,
    ) -> Result<Self, anyhow::Error> {
        let (ws_tx, _) = broadcast::channel(2048);
        Self::assemble(ws_tx, db, config, data_dir, host)
    }

    fn assemble(
        ws_tx: broadcast::Sender<String>,
        db: Database,
        config: AppConfig,
        data_dir: PathBuf,
        host: Arc<dyn ExtensionHost>,
    ) -> Result<Self, anyhow::Error> {
        let client = StreamerApiClient::new(&config.api_base)?;
        let store = Store::new(db)?;
        Ok(Self {
            inner: Arc::new(SharedStateInner {
                ws_tx,
                config: RwLock::new(config),
                store,
                client: RwLock::new(client),
                host,
                poll_guard: PollGuard::default(),
                permissions: PermissionGate::default(),
                shutdown: CancellationToken::new(),
                data_dir,
            }),
        })
    }

    pub fn server_port(&self) -> u16 {
        self.inner
            .config
            .try_read()
            .map(|c| c.server_port)
            .unwrap_or(50010)
    }

    pub fn ws_sender(&self) -> &broadcast::Sender<String> {
        &self.inner.ws_tx
    }

    pub fn subscribe_ws(&self) -> broadcast::Receiver<String> {
        self.inner.ws_tx.subscribe()
    }

    pub fn store(&self) -> &Store {
        &self.inner.store
    }

    pub fn db(&self) -> &Database {
        self.inner.store.db()
    }

    pub fn host(&self) -> &dyn ExtensionHost {
        self.inner.host.as_ref()
    }

    pub fn poll_guard(&self) -> &PollGuard {
        &self.inner.poll_guard
    }

    pub fn permissions(&self) -> &PermissionGate {
        &self.inner.permissions
    }

    pub fn shutdown_token(&self) -> &CancellationToken {
        &self.inner.shutdown
    }

    pub fn data_dir(&self) -> &PathBuf {
        &self.inner.data_dir
    }

    /// Get a read lock on the current config.
    pub async fn config(&self) -> tokio::sync::RwLockReadGuard<'_, AppConfig> {
        self.inner.config.read().await
    }

    pub async fn client(&self) -> StreamerApiClient {
        self.inner.client.read().await.clone()
    }

    /// Reload config from the database and rebuild the API client.
    pub async fn reload_config(&self) -> Result<(), anyhow::Error> {
        let sm = SettingsManager::new(self.db().clone());
        let mut config = self.inner.config.write().await;
        config.reload(&sm)?;
        let client = StreamerApiClient::new(&config.api_base)?;
        *self.inner.client.write().await = client;
        Ok(())
    }

    /// One poll cycle over the whole watch list. `None` while host
    /// permissions are missing.
    pub async fn sync_live_status(&self) -> Result<Option<SyncOutcome>, DbError> {
        if !self.permissions().is_granted() {
            tracing::debug!("Live status sync skipped: permissions not granted");
            return Ok(None);
        }
        let client = self.client().await;
        let outcome =
            live_sync::sync_live_status(self.store(), &client, self.host(), self.poll_guard())
                .await?;
        self.announce(&outcome);
        Ok(Some(outcome))
    }

    /// Post-add check of a single entity.
    pub async fn check_single(&self, id: &EntityId) -> Result<Option<SyncOutcome>, DbError> {
        if !self.permissions().is_granted() {
            return Ok(None);
        }
        let client = self.client().await;
        let outcome =
            live_sync::check_single(self.store(), &client, self.host(), self.poll_guard(), id)
                .await?;
        self.announce(&outcome);
        Ok(Some(outcome))
    }

    fn announce(&self, outcome: &SyncOutcome) {
        if let SyncOutcome::Updated {
            live, transitions, ..
        } = outcome
        {
            let payload = events::LiveStatusPayload {
                live_count: *live,
                transitions: *transitions,
            };
            let _ = self
                .ws_sender()
                .send(events::message(events::LIVE_STATUS_UPDATED, &payload));
        }
    }
}

#[cfg(test)]
pub(crate) fn test_state() -> (SharedState, Arc<crate::host::testing::RecordingHost>) {
    let host = Arc::new(crate::host::testing::RecordingHost::default());
    let state = SharedState::with_host(
        Database::open_in_memory().unwrap(),
        AppConfig::default(),
        PathBuf::from("."),
        host.clone(),
    )
    .unwrap();
    (state, host)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn sync_waits_for_permission() {
        let (state, _host) = test_state();
        assert_eq!(state.sync_live_status().await.unwrap(), None);

        state.permissions().set(true);
        assert_eq!(
            state.sync_live_status().await.unwrap(),
            Some(SyncOutcome::NothingWatched)
        );
    }

    #[tokio::test]
    async fn reload_picks_up_new_api_base() {
        let (state, _host) = test_state();
        let sm = SettingsManager::new(state.db().clone());
        sm.set_setting("API_BASE", "http://127.0.0.1:9/api").unwrap();
        state.reload_config().await.unwrap();
        if std::env::var("API_BASE").is_err() {
            assert_eq!(state.client().await.base_url(), "http://127.0.0.1:9/api/");
        }
    }
}
