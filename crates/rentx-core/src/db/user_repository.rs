//! User repository and pending mutation queue

use crate::error::Result;
use crate::models::{LocalMutation, TableName, User};
use rusqlite::{params, Connection, OptionalExtension};

/// Trait for user profile storage operations
pub trait UserRepository {
    /// Get a user by local ID
    fn get(&self, id: &str) -> Result<Option<User>>;

    /// List all cached users
    fn list(&self) -> Result<Vec<User>>;

    /// Insert or replace a user
    fn upsert(&self, user: &User) -> Result<()>;

    /// Delete a user, returning whether a row existed
    fn delete(&self, id: &str) -> Result<bool>;

    /// Count cached users
    fn count(&self) -> Result<usize>;

    /// Queue an edit for push, superseding any unsent edit of the same user
    fn queue_mutation(&self, user: &User) -> Result<LocalMutation>;

    /// The unsent edit for a user, if any
    fn pending_for(&self, id: &str) -> Result<Option<LocalMutation>>;

    /// All unsent user edits
    fn pending(&self) -> Result<Vec<LocalMutation>>;

    /// Clear a queued edit if it is still at `revision`
    fn clear_mutation(&self, id: &str, revision: i64) -> Result<bool>;

    /// Drop a queued edit regardless of revision
    fn drop_mutation(&self, id: &str) -> Result<()>;
}

/// `SQLite` implementation of `UserRepository`
pub struct SqliteUserRepository<'a> {
    conn: &'a Connection,
}

impl<'a> SqliteUserRepository<'a> {
    /// Create a new repository with the given connection
    pub const fn new(conn: &'a Connection) -> Self {
        Self { conn }
    }

    fn parse_user(row: &rusqlite::Row<'_>) -> rusqlite::Result<User> {
        Ok(User {
            id: row.get(0)?,
            user_id: row.get(1)?,
            name: row.get(2)?,
            email: row.get(3)?,
            driver_license: row.get(4)?,
            avatar: row.get(5)?,
        })
    }

    fn parse_mutation(row: &rusqlite::Row<'_>) -> rusqlite::Result<(String, String, i64)> {
        Ok((row.get(0)?, row.get(1)?, row.get(2)?))
    }

    fn into_mutation((record_id, payload, revision): (String, String, i64)) -> Result<LocalMutation> {
        Ok(LocalMutation {
            table: TableName::Users,
            record_id,
            payload: serde_json::from_str(&payload)?,
            revision,
        })
    }
}

impl UserRepository for SqliteUserRepository<'_> {
    fn get(&self, id: &str) -> Result<Option<User>> {
        let user = self
            .conn
            .query_row(
                "SELECT id, user_id, name, email, driver_license, avatar FROM users WHERE id = ?",
                params![id],
                Self::parse_user,
            )
            .optional()?;
        Ok(user)
    }

    fn list(&self) -> Result<Vec<User>> {
        let mut stmt = self.conn.prepare(
            "SELECT id, user_id, name, email, driver_license, avatar FROM users ORDER BY name ASC",
        )?;
        let users = stmt
            .query_map([], Self::parse_user)?
            .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(users)
    }

    fn upsert(&self, user: &User) -> Result<()> {
        self.conn.execute(
            "INSERT INTO users (id, user_id, name, email, driver_license, avatar)
             VALUES (?, ?, ?, ?, ?, ?)
             ON CONFLICT(id) DO UPDATE SET
                user_id = excluded.user_id,
                name = excluded.name,
                email = excluded.email,
                driver_license = excluded.driver_license,
                avatar = excluded.avatar",
            params![
                user.id,
                user.user_id,
                user.name,
                user.email,
                user.driver_license,
                user.avatar
            ],
        )?;
        Ok(())
    }

    fn delete(&self, id: &str) -> Result<bool> {
        let rows = self
            .conn
            .execute("DELETE FROM users WHERE id = ?", params![id])?;
        Ok(rows > 0)
    }

    fn count(&self) -> Result<usize> {
        let count = self
            .conn
            .query_row("SELECT COUNT(*) FROM users", [], |row| row.get(0))?;
        Ok(count)
    }

    fn queue_mutation(&self, user: &User) -> Result<LocalMutation> {
        let payload = serde_json::to_string(user)?;
        self.conn.execute(
            "INSERT INTO pending_mutations (table_name, record_id, payload, revision)
             VALUES (?, ?, ?, 1)
             ON CONFLICT(table_name, record_id) DO UPDATE SET
                payload = excluded.payload,
                revision = pending_mutations.revision + 1",
            params![TableName::Users.as_str(), user.id, payload],
        )?;

        self.pending_for(&user.id)?.ok_or_else(|| {
            crate::Error::Database(format!("queued mutation for user {} vanished", user.id))
        })
    }

    fn pending_for(&self, id: &str) -> Result<Option<LocalMutation>> {
        self.conn
            .query_row(
                "SELECT record_id, payload, revision FROM pending_mutations
                 WHERE table_name = ? AND record_id = ?",
                params![TableName::Users.as_str(), id],
                Self::parse_mutation,
            )
            .optional()?
            .map(Self::into_mutation)
            .transpose()
    }

    fn pending(&self) -> Result<Vec<LocalMutation>> {
        let mut stmt = self.conn.prepare(
            "SELECT record_id, payload, revision FROM pending_mutations
             WHERE table_name = ? ORDER BY record_id ASC",
        )?;
        let rows = stmt
            .query_map(params![TableName::Users.as_str()], Self::parse_mutation)?
            .collect::<rusqlite::Result<Vec<_>>>()?;
        rows.into_iter().map(Self::into_mutation).collect()
    }

    fn clear_mutation(&self, id: &str, revision: i64) -> Result<bool> {
        let rows = self.conn.execute(
            "DELETE FROM pending_mutations WHERE table_name = ? AND record_id = ? AND revision = ?",
            params![TableName::Users.as_str(), id, revision],
        )?;
        Ok(rows > 0)
    }

    fn drop_mutation(&self, id: &str) -> Result<()> {
        self.conn.execute(
            "DELETE FROM pending_mutations WHERE table_name = ? AND record_id = ?",
            params![TableName::Users.as_str(), id],
        )?;
        Ok(())
    }
}
