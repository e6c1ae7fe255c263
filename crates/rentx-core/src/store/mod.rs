//! Local store: the queryable on-device replica shared by screens and sync.

mod batch;
mod collection;

use std::path::{Path, PathBuf};
use std::sync::Arc;

use rusqlite::Connection;
use tokio::sync::Mutex;

use crate::db::{metadata, Database, SqliteUserRepository, UserRepository};
use crate::error::{Error, Result};
use crate::models::{Car, ChangeSet, Checkpoint, LocalMutation, ProfileEdit, User};

pub use batch::{ApplyStats, WriteBatch};
pub use collection::{Collection, Query, Record};

/// Thread-safe handle to the replica
///
/// Every read and write goes through one connection guarded by an async
/// mutex, which makes each write transaction the serialization point
/// between sync, detail refreshes and user edits.
#[derive(Clone)]
pub struct LocalStore {
    db: Arc<Mutex<Database>>,
    db_path: Option<PathBuf>,
}

impl LocalStore {
    /// Open the store at the given filesystem path.
    pub fn open_path(db_path: impl Into<PathBuf>) -> Result<Self> {
        let db_path = db_path.into();
        if let Some(parent) = db_path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let db = Database::open(&db_path)?;
        Ok(Self {
            db: Arc::new(Mutex::new(db)),
            db_path: Some(db_path),
        })
    }

    /// Open an in-memory store (primarily for tests).
    pub fn open_in_memory() -> Result<Self> {
        let db = Database::open_in_memory()?;
        Ok(Self {
            db: Arc::new(Mutex::new(db)),
            db_path: None,
        })
    }

    pub fn path(&self) -> Option<&Path> {
        self.db_path.as_deref()
    }

    /// Table handle for `T`
    pub const fn collection<T: Record>(&self) -> Collection<'_, T> {
        Collection::new(self)
    }

    pub(crate) async fn read<R, F>(&self, f: F) -> Result<R>
    where
        F: FnOnce(&Connection) -> Result<R> + Send,
    {
        let db = self.db.lock().await;
        f(db.connection())
    }

    /// Run `f` inside one write transaction
    ///
    /// Commits when `f` returns `Ok`, rolls back otherwise.
    pub async fn write<R, F>(&self, f: F) -> Result<R>
    where
        F: FnOnce(&WriteBatch<'_>) -> Result<R> + Send,
    {
        let mut db = self.db.lock().await;
        let tx = db.transaction()?;
        let output = f(&WriteBatch::new(&tx))?;
        tx.commit()?;
        Ok(output)
    }

    /// Last checkpoint fully applied to the replica
    pub async fn checkpoint(&self) -> Result<Checkpoint> {
        self.read(metadata::checkpoint).await
    }

    /// Apply a pulled change set and advance the checkpoint atomically
    pub async fn apply_changes(&self, changes: &ChangeSet, latest: Checkpoint) -> Result<ApplyStats> {
        self.write(|batch| batch.apply(changes, latest)).await
    }

    /// Store a freshly fetched car detail (accessories, photos, price)
    ///
    /// Only updates a car the replica already has. Returns false when the
    /// car is not there, e.g. because a pull deleted it meanwhile.
    pub async fn hydrate_car(&self, car: &Car) -> Result<bool> {
        let hydrated = self.write(|batch| batch.hydrate_car(car)).await?;
        if !hydrated {
            tracing::debug!("Car {} is not in the replica; detail not stored", car.id);
        }
        Ok(hydrated)
    }

    /// Store the signed-in user's profile as received from the server
    pub async fn save_user(&self, user: &User) -> Result<()> {
        self.write(|batch| batch.upsert_user(user)).await
    }

    /// Edit the user's profile locally and queue the edit for push
    pub async fn update_profile(&self, user_id: &str, edit: &ProfileEdit) -> Result<User> {
        if edit.is_empty() {
            return Err(Error::InvalidInput("profile edit changes nothing".to_string()));
        }

        self.write(|batch| {
            let current = batch
                .user(user_id)?
                .ok_or_else(|| Error::NotFound(format!("user {user_id}")))?;
            let edited = edit.apply_to(&current);
            batch.upsert_user(&edited)?;
            let mutation = batch.queue_mutation(&edited)?;
            tracing::debug!(
                "Queued profile edit for user {} at revision {}",
                user_id,
                mutation.revision
            );
            Ok(edited)
        })
        .await
    }

    /// Edits waiting to be pushed
    pub async fn pending_mutations(&self) -> Result<Vec<LocalMutation>> {
        self.read(|conn| SqliteUserRepository::new(conn).pending())
            .await
    }

    /// Clear pushed edits that have not been superseded since
    pub async fn acknowledge(&self, sent: &[LocalMutation]) -> Result<usize> {
        self.write(|batch| {
            let mut cleared = 0;
            for mutation in sent {
                if batch.clear_mutation(mutation)? {
                    cleared += 1;
                } else {
                    tracing::debug!(
                        "User {} was edited again during push; keeping it queued",
                        mutation.record_id
                    );
                }
            }
            Ok(cleared)
        })
        .await
    }
}
