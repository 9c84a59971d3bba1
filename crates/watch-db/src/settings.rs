//! Runtime configuration key-value store.

use std::collections::HashMap;

use crate::{Database, DbError};

impl Database {
    pub fn get_setting(&self, key: &str) -> Result<Option<String>, DbError> {
        self.with_conn(|conn| {
            let mut stmt = conn.prepare("SELECT value FROM settings WHERE key = ?1")?;
            let value = stmt
                .query_row([key], |row| row.get::<_, String>(0))
                .optional()?;
            Ok(value)
        })
    }

    pub fn set_setting(&self, key: &str, value: &str) -> Result<(), DbError> {
        self.with_conn(|conn| {
            conn.execute(
                "INSERT INTO settings (key, value, updated_at) VALUES (?1, ?2, CURRENT_TIMESTAMP)
                 ON CONFLICT(key) DO UPDATE SET value = ?2, updated_at = CURRENT_TIMESTAMP",
                rusqlite::params![key, value],
            )?;
            Ok(())
        })
    }

    pub fn get_all_settings(&self) -> Result<HashMap<String, String>, DbError> {
        self.with_conn(|conn| {
            let mut stmt = conn.prepare("SELECT key, value FROM settings")?;
            let rows = stmt.query_map([], |row| {
                Ok((row.get::<_, String>(0)?, row.get::<_, String>(1)?))
            })?;
            let mut map = HashMap::new();
            for row in rows {
                let (k, v) = row?;
                map.insert(k, v);
            }
            Ok(map)
        })
    }

    pub fn delete_setting(&self, key: &str) -> Result<(), DbError> {
        self.with_conn(|conn| {
            conn.execute("DELETE FROM settings WHERE key = ?1", [key])?;
            Ok(())
        })
    }
}

pub(crate) trait OptionalExt<T> {
    fn optional(self) -> Result<Option<T>, rusqlite::Error>;
}

impl<T> OptionalExt<T> for Result<T, rusqlite::Error> {
    fn optional(self) -> Result<Option<T>, rusqlite::Error> {
        match self {
            Ok(v) => Ok(Some(v)),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(e),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_settings_crud() {
        let db = Database::open_in_memory().unwrap();
        db.set_setting("SERVER_PORT", "50010").unwrap();
        assert_eq!(db.get_setting("SERVER_PORT").unwrap(), Some("50010".into()));

        db.set_setting("SERVER_PORT", "50011").unwrap();
        assert_eq!(db.get_setting("SERVER_PORT").unwrap(), Some("50011".into()));
        assert_eq!(db.get_all_settings().unwrap().len(), 1);

        db.delete_setting("SERVER_PORT").unwrap();
        assert_eq!(db.get_setting("SERVER_PORT").unwrap(), None);
    }
}
