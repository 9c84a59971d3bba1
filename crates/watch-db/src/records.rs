//! Named JSON records, read and replaced whole.
//!
//! Every write bumps the record's revision so that other connections can
//! tell which records changed underneath them.

use std::collections::HashMap;

use serde::Serialize;
use serde::de::DeserializeOwned;

use crate::settings::OptionalExt;
use crate::{Database, DbError};

/// Logical record names. The string forms match the browser extension's storage keys.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum RecordKey {
    WatchList,
    EntityMeta,
    Settings,
    LiveSnapshot,
    NotificationHistory,
    Groups,
}

impl RecordKey {
    pub const ALL: [RecordKey; 6] = [
        RecordKey::WatchList,
        RecordKey::EntityMeta,
        RecordKey::Settings,
        RecordKey::LiveSnapshot,
        RecordKey::NotificationHistory,
        RecordKey::Groups,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            RecordKey::WatchList => "streams",
            RecordKey::EntityMeta => "data",
            RecordKey::Settings => "settings",
            RecordKey::LiveSnapshot => "liveStatusCache",
            RecordKey::NotificationHistory => "notificationHistory",
            RecordKey::Groups => "groups",
        }
    }

    pub fn parse(key: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|k| k.as_str() == key)
    }
}

impl Database {
    /// Read a record, or its default when it was never written.
    pub fn get_record<T: DeserializeOwned + Default>(&self, key: RecordKey) -> Result<T, DbError> {
        let raw = self.with_conn(|conn| {
            let mut stmt = conn.prepare("SELECT value FROM records WHERE key = ?1")?;
            let value = stmt
                .query_row([key.as_str()], |row| row.get::<_, String>(0))
                .optional()?;
            Ok(value)
        })?;
        match raw {
            Some(json) => Ok(serde_json::from_str(&json)?),
            None => Ok(T::default()),
        }
    }

    /// Replace a record. Returns the new revision.
    pub fn put_record<T: Serialize>(&self, key: RecordKey, value: &T) -> Result<i64, DbError> {
        let json = serde_json::to_string(value)?;
        self.with_conn(|conn| upsert(conn, key, &json))
    }

    /// Replace several records in one transaction.
    pub fn put_records(
        &self,
        writes: &[(RecordKey, serde_json::Value)],
    ) -> Result<Vec<(RecordKey, i64)>, DbError> {
        if writes.is_empty() {
            return Ok(Vec::new());
        }
        self.with_conn_mut(|conn| {
            let tx = conn.transaction()?;
            let mut revisions = Vec::with_capacity(writes.len());
            for (key, value) in writes {
                let json = serde_json::to_string(value)?;
                revisions.push((*key, upsert(&tx, *key, &json)?));
            }
            tx.commit()?;
            Ok(revisions)
        })
    }

    /// Current revision of every record that has been written at least once.
    pub fn record_revisions(&self) -> Result<HashMap<RecordKey, i64>, DbError> {
        self.with_conn(|conn| {
            let mut stmt = conn.prepare("SELECT key, revision FROM records")?;
            let rows = stmt.query_map([], |row| {
                Ok((row.get::<_, String>(0)?, row.get::<_, i64>(1)?))
            })?;
            let mut map = HashMap::new();
            for row in rows {
                let (key, revision) = row?;
                match RecordKey::parse(&key) {
                    Some(k) => {
                        map.insert(k, revision);
                    }
                    None => tracing::debug!(key, "Ignoring unknown record key"),
                }
            }
            Ok(map)
        })
    }
}

fn upsert(conn: &rusqlite::Connection, key: RecordKey, json: &str) -> Result<i64, DbError> {
    let now = chrono::Utc::now().timestamp_millis();
    let revision = conn.query_row(
        "INSERT INTO records (key, value, revision, updated_at) VALUES (?1, ?2, 1, ?3)
         ON CONFLICT(key) DO UPDATE SET
            value = excluded.value,
            revision = records.revision + 1,
            updated_at = excluded.updated_at
         RETURNING revision",
        rusqlite::params![key.as_str(), json, now],
        |row| row.get::<_, i64>(0),
    )?;
    Ok(revision)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{LiveSnapshot, LiveStatus, WatchList};

    fn test_db() -> Database {
        Database::open_in_memory().expect("Failed to create test DB")
    }

    #[test]
    fn missing_record_reads_as_default() {
        let db = test_db();
        let list: WatchList = db.get_record(RecordKey::WatchList).unwrap();
        assert!(list.is_empty());
    }

    #[test]
    fn put_replaces_whole_value_and_bumps_revision() {
        let db = test_db();
        let mut snapshot = LiveSnapshot::new();
        snapshot.insert("s:a".parse().unwrap(), LiveStatus::live("a"));
        snapshot.insert("s:b".parse().unwrap(), LiveStatus::offline());
        assert_eq!(db.put_record(RecordKey::LiveSnapshot, &snapshot).unwrap(), 1);

        let mut replacement = LiveSnapshot::new();
        replacement.insert("c:c".parse().unwrap(), LiveStatus::live("c"));
        assert_eq!(
            db.put_record(RecordKey::LiveSnapshot, &replacement).unwrap(),
            2
        );

        let stored: LiveSnapshot = db.get_record(RecordKey::LiveSnapshot).unwrap();
        assert_eq!(stored, replacement);
        assert_eq!(
            db.record_revisions().unwrap().get(&RecordKey::LiveSnapshot),
            Some(&2)
        );
    }

    #[test]
    fn put_records_writes_all_keys() {
        let db = test_db();
        let revisions = db
            .put_records(&[
                (RecordKey::WatchList, serde_json::json!(["s:a"])),
                (RecordKey::Groups, serde_json::json!([])),
            ])
            .unwrap();
        assert_eq!(revisions.len(), 2);

        let list: WatchList = db.get_record(RecordKey::WatchList).unwrap();
        assert_eq!(list.len(), 1);
        assert!(db.put_records(&[]).unwrap().is_empty());
    }

    #[test]
    fn record_key_names_match_extension_storage() {
        for key in RecordKey::ALL {
            assert_eq!(RecordKey::parse(key.as_str()), Some(key));
        }
        assert_eq!(RecordKey::LiveSnapshot.as_str(), "liveStatusCache");
        assert_eq!(RecordKey::parse("unknown"), None);
    }
}
