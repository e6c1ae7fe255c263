//! Database connection management

use crate::error::Result;
use rusqlite::{Connection, Transaction};
use std::path::Path;

use super::migrations;

/// Database wrapper for the on-device `SQLite` replica
pub struct Database {
    conn: Connection,
}

impl Database {
    /// Open the replica at the given path, creating it if it doesn't exist
    ///
    /// Runs migrations automatically.
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let conn = Connection::open(path.as_ref())?;
        let mut database = Self { conn };
        database.configure()?;
        database.migrate()?;
        tracing::debug!("Opened local replica at {}", path.as_ref().display());
        Ok(database)
    }

    /// Open an in-memory database (useful for testing)
    pub fn open_in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory()?;
        let mut database = Self { conn };
        database.configure()?;
        database.migrate()?;
        Ok(database)
    }

    /// Configure `SQLite` for a single-writer mobile replica
    fn configure(&self) -> Result<()> {
        // In-memory databases stay on the "memory" journal
        self.conn
            .pragma_update_and_check(None, "journal_mode", "WAL", |row| {
                row.get::<_, String>(0)
            })
            .ok();
        self.conn.pragma_update(None, "synchronous", "NORMAL")?;
        self.conn.pragma_update(None, "foreign_keys", "ON")?;
        Ok(())
    }

    /// Run database migrations
    fn migrate(&mut self) -> Result<()> {
        migrations::run(&mut self.conn)
    }

    /// Get a reference to the underlying connection
    pub const fn connection(&self) -> &Connection {
        &self.conn
    }

    /// Begin a write transaction
    ///
    /// Dropping the transaction without committing rolls it back.
    pub fn transaction(&mut self) -> Result<Transaction<'_>> {
        Ok(self.conn.transaction()?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_open_in_memory() {
        let db = Database::open_in_memory().unwrap();
        let version: i64 = db
            .connection()
            .query_row("SELECT COALESCE(MAX(version), 0) FROM schema_version", [], |row| {
                row.get(0)
            })
            .unwrap();
        assert!(version > 0);
    }

    #[test]
    fn test_open_on_disk_survives_reopen() {
        let tmp = tempdir().unwrap();
        let path = tmp.path().join("rentx.db");

        {
            let db = Database::open(&path).unwrap();
            db.connection()
                .execute(
                    "INSERT INTO sync_metadata (key, value) VALUES ('probe', 42)",
                    [],
                )
                .unwrap();
        }

        let db = Database::open(&path).unwrap();
        let value: i64 = db
            .connection()
            .query_row(
                "SELECT value FROM sync_metadata WHERE key = 'probe'",
                [],
                |row| row.get(0),
            )
            .unwrap();
        assert_eq!(value, 42);
    }

    #[test]
    fn test_dropped_transaction_rolls_back() {
        let mut db = Database::open_in_memory().unwrap();
        {
            let tx = db.transaction().unwrap();
            tx.execute(
                "INSERT INTO sync_metadata (key, value) VALUES ('probe', 1)",
                [],
            )
            .unwrap();
        }

        let count: i64 = db
            .connection()
            .query_row("SELECT COUNT(*) FROM sync_metadata", [], |row| row.get(0))
            .unwrap();
        assert_eq!(count, 0);
    }
}
