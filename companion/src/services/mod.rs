//! Domain services shared by the HTTP handlers and the background loops.

pub mod badge;
pub mod cookie_repair;
pub mod fetcher;
pub mod groups;
pub mod history;
pub mod lifecycle;
pub mod live_sync;
pub mod notifier;
pub mod permissions;
pub mod preferences;
pub mod reconciler;
pub mod search;
pub mod watch_list;

use watch_db::{DbError, EntityId, EntityIdError, GroupError, WatchListError};

/// User-facing failure of a service operation. Nothing here is fatal.
#[derive(Debug, thiserror::Error)]
pub enum ServiceError {
    #[error(transparent)]
    WatchList(#[from] WatchListError),

    #[error(transparent)]
    EntityId(#[from] EntityIdError),

    #[error(transparent)]
    Group(#[from] GroupError),

    #[error("streamer is not on the watch list: {0}")]
    NotWatched(EntityId),

    #[error("notification not found: {0}")]
    NotificationNotFound(String),

    #[error("no enabled streamers to launch")]
    NothingToLaunch,

    #[error("invalid settings: {0}")]
    InvalidSettings(String),

    #[error("storage error: {0}")]
    Storage(#[from] DbError),
}

impl ServiceError {
    /// HTTP status the handlers answer with.
    pub fn status_code(&self) -> u16 {
        match self {
            ServiceError::WatchList(WatchListError::NotFound(_)) => 404,
            ServiceError::WatchList(WatchListError::Duplicate(_) | WatchListError::Full(_)) => 409,
            ServiceError::WatchList(WatchListError::NotAPermutation) => 400,
            ServiceError::EntityId(_) => 400,
            ServiceError::Group(GroupError::NotFound(_)) => 404,
            ServiceError::Group(_) => 400,
            ServiceError::NotWatched(_) => 404,
            ServiceError::NotificationNotFound(_) => 404,
            ServiceError::NothingToLaunch => 409,
            ServiceError::InvalidSettings(_) => 400,
            ServiceError::Storage(_) => 500,
        }
    }
}

#[cfg(test)]
pub(crate) mod test_support {
    use std::sync::Mutex;

    use streamer_client::{ClientError, StreamerRecord};
    use watch_db::{Database, EntityId};

    use super::fetcher::StreamerSource;
    use crate::store::Store;

    pub fn store() -> Store {
        Store::new(Database::open_in_memory().unwrap()).unwrap()
    }

    pub fn id(s: &str) -> EntityId {
        s.parse().unwrap()
    }

    pub fn record(platform: &str, streamer_id: &str, is_live: bool, title: Option<&str>) -> StreamerRecord {
        StreamerRecord {
            platform: platform.to_string(),
            streamer_id: streamer_id.to_string(),
            is_live,
            broad_title: title.map(str::to_string),
            thumbnail_url: None,
            current_viewers: is_live.then_some(120),
            user_nick: Some(format!("{streamer_id}_nick")),
            profile_image: None,
        }
    }

    /// Answers every request with a fixed set of records.
    #[derive(Default)]
    pub struct CannedSource {
        pub records: Mutex<Vec<StreamerRecord>>,
        pub fail: bool,
        pub requests: Mutex<Vec<Vec<String>>>,
    }

    impl CannedSource {
        pub fn with(records: Vec<StreamerRecord>) -> Self {
            Self {
                records: Mutex::new(records),
                ..Self::default()
            }
        }

        pub fn failing() -> Self {
            Self {
                fail: true,
                ..Self::default()
            }
        }

        pub fn set(&self, records: Vec<StreamerRecord>) {
            *self.records.lock().unwrap() = records;
        }

        pub fn request_count(&self) -> usize {
            self.requests.lock().unwrap().len()
        }
    }

    impl StreamerSource for CannedSource {
        async fn fetch_streamers(&self, ids: &[String]) -> Result<Vec<StreamerRecord>, ClientError> {
            self.requests.lock().unwrap().push(ids.to_vec());
            if self.fail {
                return Err(ClientError::ApiError {
                    status: 503,
                    message: "unavailable".into(),
                });
            }
            Ok(self.records.lock().unwrap().clone())
        }

        async fn search_streamers(&self, query: &str) -> Result<Vec<StreamerRecord>, ClientError> {
            if self.fail {
                return Err(ClientError::ApiError {
                    status: 503,
                    message: "unavailable".into(),
                });
            }
            let query = query.to_lowercase();
            Ok(self
                .records
                .lock()
                .unwrap()
                .iter()
                .filter(|r| r.streamer_id.contains(&query))
                .cloned()
                .collect())
        }
    }
}
