//! Sync metadata: the persisted checkpoint

use crate::error::{Error, Result};
use crate::models::Checkpoint;
use rusqlite::{params, Connection, OptionalExtension};

const LAST_PULLED_VERSION: &str = "last_pulled_version";

/// Read the checkpoint, defaulting to the origin when nothing was pulled yet
pub fn checkpoint(conn: &Connection) -> Result<Checkpoint> {
    let version: Option<i64> = conn
        .query_row(
            "SELECT value FROM sync_metadata WHERE key = ?",
            params![LAST_PULLED_VERSION],
            |row| row.get(0),
        )
        .optional()?;
    Ok(version.map_or(Checkpoint::ORIGIN, Checkpoint::new))
}

/// Persist a new checkpoint; moving it backwards is an error
pub fn set_checkpoint(conn: &Connection, next: Checkpoint) -> Result<()> {
    let current = checkpoint(conn)?;
    if next < current {
        return Err(Error::CheckpointRegression {
            current: current.version(),
            incoming: next.version(),
        });
    }

    conn.execute(
        "INSERT INTO sync_metadata (key, value) VALUES (?, ?)
         ON CONFLICT(key) DO UPDATE SET value = excluded.value",
        params![LAST_PULLED_VERSION, next.version()],
    )?;
    Ok(())
}
