//! Database schema definitions and migrations.

use rusqlite::Connection;

use crate::DbError;

pub fn run_migrations(conn: &Connection) -> Result<(), DbError> {
    conn.execute_batch(SCHEMA)?;
    migrate_records_revision(conn)?;
    Ok(())
}

/// records テーブル: revision カラムが無ければ追加
fn migrate_records_revision(conn: &Connection) -> Result<(), DbError> {
    if column_exists(conn, "records", "revision")? {
        return Ok(());
    }
    tracing::info!("Adding revision column to records");
    conn.execute_batch("ALTER TABLE records ADD COLUMN revision INTEGER NOT NULL DEFAULT 1;")?;
    Ok(())
}

fn column_exists(conn: &Connection, table: &str, column: &str) -> Result<bool, DbError> {
    let mut stmt = conn.prepare(&format!("PRAGMA table_info({})", table))?;
    let exists = stmt
        .query_map([], |row| row.get::<_, String>(1))?
        .any(|name| name.as_deref() == Ok(column));
    Ok(exists)
}

const SCHEMA: &str = r#"
CREATE TABLE IF NOT EXISTS settings (
    key TEXT PRIMARY KEY,
    value TEXT NOT NULL,
    updated_at TIMESTAMP DEFAULT CURRENT_TIMESTAMP
);

CREATE TABLE IF NOT EXISTS records (
    key TEXT PRIMARY KEY,
    value TEXT NOT NULL,
    revision INTEGER NOT NULL DEFAULT 1,
    updated_at INTEGER NOT NULL
);
"#;
