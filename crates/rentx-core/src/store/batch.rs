//! Write primitives available inside a store transaction

use rusqlite::Connection;

use crate::db::{metadata, CarRepository, SqliteCarRepository, SqliteUserRepository, UserRepository};
use crate::error::Result;
use crate::models::{Car, ChangeSet, Checkpoint, LocalMutation, User};

/// Counts of what an applied change set touched
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ApplyStats {
    pub cars_upserted: usize,
    pub cars_deleted: usize,
    pub users_upserted: usize,
    pub users_deleted: usize,
    /// Pulled user updates held back because a local edit is still queued
    pub users_kept_local: usize,
}

impl ApplyStats {
    #[must_use]
    pub const fn total(&self) -> usize {
        self.cars_upserted + self.cars_deleted + self.users_upserted + self.users_deleted
    }
}

/// Batch of writes executed inside one `SQLite` transaction
///
/// Obtained from [`LocalStore::write`](super::LocalStore::write); every call
/// lands or none do.
pub struct WriteBatch<'a> {
    conn: &'a Connection,
}

impl<'a> WriteBatch<'a> {
    pub(crate) const fn new(conn: &'a Connection) -> Self {
        Self { conn }
    }

    fn cars(&self) -> SqliteCarRepository<'a> {
        SqliteCarRepository::new(self.conn)
    }

    fn users(&self) -> SqliteUserRepository<'a> {
        SqliteUserRepository::new(self.conn)
    }

    pub fn upsert_car(&self, car: &Car) -> Result<()> {
        self.cars().upsert(car)
    }

    /// Enrich a car already in the replica; returns false when it is gone
    pub fn hydrate_car(&self, car: &Car) -> Result<bool> {
        self.cars().hydrate(car)
    }

    pub fn delete_car(&self, id: &str) -> Result<bool> {
        self.cars().delete(id)
    }

    pub fn user(&self, id: &str) -> Result<Option<User>> {
        self.users().get(id)
    }

    pub fn upsert_user(&self, user: &User) -> Result<()> {
        self.users().upsert(user)
    }

    pub fn delete_user(&self, id: &str) -> Result<bool> {
        self.users().delete(id)
    }

    pub fn set_checkpoint(&self, checkpoint: Checkpoint) -> Result<()> {
        metadata::set_checkpoint(self.conn, checkpoint)
    }

    pub fn pending_for(&self, user_id: &str) -> Result<Option<LocalMutation>> {
        self.users().pending_for(user_id)
    }

    pub fn queue_mutation(&self, user: &User) -> Result<LocalMutation> {
        self.users().queue_mutation(user)
    }

    pub fn clear_mutation(&self, mutation: &LocalMutation) -> Result<bool> {
        self.users()
            .clear_mutation(&mutation.record_id, mutation.revision)
    }

    /// Apply a pulled change set and advance the checkpoint
    ///
    /// Creates and updates are upserts and deletes of unknown ids are
    /// no-ops, so applying the same set twice leaves the same state.
    pub fn apply(&self, changes: &ChangeSet, latest: Checkpoint) -> Result<ApplyStats> {
        let mut stats = ApplyStats::default();

        for car in changes.cars.created.iter().chain(&changes.cars.updated) {
            self.upsert_car(car)?;
            stats.cars_upserted += 1;
        }
        for id in &changes.cars.deleted {
            if self.delete_car(id)? {
                stats.cars_deleted += 1;
            }
        }

        for user in changes.users.created.iter().chain(&changes.users.updated) {
            if self.pending_for(&user.id)?.is_some() {
                tracing::debug!("Keeping local edit of user {} over pulled version", user.id);
                stats.users_kept_local += 1;
                continue;
            }
            self.upsert_user(user)?;
            stats.users_upserted += 1;
        }
        for id in &changes.users.deleted {
            self.users().drop_mutation(id)?;
            if self.delete_user(id)? {
                stats.users_deleted += 1;
            }
        }

        self.set_checkpoint(latest)?;
        Ok(stats)
    }
}
