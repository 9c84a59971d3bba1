//! Typed access to the named records, plus change notifications.
//!
//! Every surface writes through the same records table. Writes made here are
//! announced immediately; writes made by another process are picked up by
//! [`Store::poll_external_changes`] through the per-record revision.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard};

use serde::Serialize;
use tokio::sync::broadcast;
use watch_db::{
    Database, DbError, Groups, LiveSnapshot, MetaMap, NotificationHistory, RecordKey,
    UserSettings, WatchList,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StorageChange {
    pub key: RecordKey,
    pub revision: i64,
    /// Written by another process rather than through this store.
    pub external: bool,
}

#[derive(Clone)]
pub struct Store {
    db: Database,
    changes: broadcast::Sender<StorageChange>,
    seen: Arc<Mutex<HashMap<RecordKey, i64>>>,
}

impl Store {
    pub fn new(db: Database) -> Result<Self, DbError> {
        let seen = db.record_revisions()?;
        let (changes, _) = broadcast::channel(256);
        Ok(Self {
            db,
            changes,
            seen: Arc::new(Mutex::new(seen)),
        })
    }

    pub fn db(&self) -> &Database {
        &self.db
    }

    pub fn subscribe(&self) -> broadcast::Receiver<StorageChange> {
        self.changes.subscribe()
    }

    pub fn watch_list(&self) -> Result<WatchList, DbError> {
        self.db.get_record(RecordKey::WatchList)
    }

    pub fn set_watch_list(&self, list: &WatchList) -> Result<(), DbError> {
        self.write(RecordKey::WatchList, list)
    }

    pub fn entity_meta(&self) -> Result<MetaMap, DbError> {
        self.db.get_record(RecordKey::EntityMeta)
    }

    pub fn set_entity_meta(&self, meta: &MetaMap) -> Result<(), DbError> {
        self.write(RecordKey::EntityMeta, meta)
    }

    pub fn user_settings(&self) -> Result<UserSettings, DbError> {
        self.db.get_record(RecordKey::Settings)
    }

    pub fn set_user_settings(&self, settings: &UserSettings) -> Result<(), DbError> {
        self.write(RecordKey::Settings, settings)
    }

    pub fn live_snapshot(&self) -> Result<LiveSnapshot, DbError> {
        self.db.get_record(RecordKey::LiveSnapshot)
    }

    /// Single atomic replace of the whole snapshot.
    pub fn replace_live_snapshot(&self, snapshot: &LiveSnapshot) -> Result<(), DbError> {
        self.write(RecordKey::LiveSnapshot, snapshot)
    }

    pub fn notification_history(&self) -> Result<NotificationHistory, DbError> {
        self.db.get_record(RecordKey::NotificationHistory)
    }

    pub fn set_notification_history(&self, history: &NotificationHistory) -> Result<(), DbError> {
        self.write(RecordKey::NotificationHistory, history)
    }

    pub fn groups(&self) -> Result<Groups, DbError> {
        self.db.get_record(RecordKey::Groups)
    }

    pub fn set_groups(&self, groups: &Groups) -> Result<(), DbError> {
        self.write(RecordKey::Groups, groups)
    }

    /// Replace several records in one transaction.
    pub fn put_many(&self, writes: Vec<(RecordKey, serde_json::Value)>) -> Result<(), DbError> {
        let revisions = self.db.put_records(&writes)?;
        for (key, revision) in revisions {
            self.record_local(key, revision);
        }
        Ok(())
    }

    /// Compare stored revisions with the ones this store last saw and
    /// announce every record another writer has touched since.
    pub fn poll_external_changes(&self) -> Result<Vec<StorageChange>, DbError> {
        let current = self.db.record_revisions()?;
        let mut changed = Vec::new();
        {
            let mut seen = self.seen();
            for (key, revision) in current {
                if seen.get(&key).is_some_and(|s| *s >= revision) {
                    continue;
                }
                seen.insert(key, revision);
                changed.push(StorageChange {
                    key,
                    revision,
                    external: true,
                });
            }
        }
        for change in &changed {
            tracing::debug!(key = change.key.as_str(), revision = change.revision, "External storage change");
            let _ = self.changes.send(*change);
        }
        Ok(changed)
    }

    fn write<T: Serialize>(&self, key: RecordKey, value: &T) -> Result<(), DbError> {
        let revision = self.db.put_record(key, value)?;
        self.record_local(key, revision);
        Ok(())
    }

    fn record_local(&self, key: RecordKey, revision: i64) {
        {
            let mut seen = self.seen();
            let entry = seen.entry(key).or_insert(revision);
            *entry = (*entry).max(revision);
        }
        let _ = self.changes.send(StorageChange {
            key,
            revision,
            external: false,
        });
    }

    fn seen(&self) -> MutexGuard<'_, HashMap<RecordKey, i64>> {
        self.seen.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

/// Serialize a typed record for [`Store::put_many`].
pub fn record_value<T: Serialize>(value: &T) -> Result<serde_json::Value, DbError> {
    Ok(serde_json::to_value(value)?)
}
