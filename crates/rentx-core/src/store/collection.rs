//! Read access to replicated tables

use std::marker::PhantomData;

use rusqlite::Connection;

use crate::db::{CarRepository, SqliteCarRepository, SqliteUserRepository, UserRepository};
use crate::error::Result;
use crate::models::{Car, User};

use super::LocalStore;

/// A record type stored in one of the replicated tables
pub trait Record: Sized + Send + 'static {
    fn find(conn: &Connection, id: &str) -> Result<Option<Self>>;

    fn fetch(conn: &Connection, limit: Option<usize>) -> Result<Vec<Self>>;

    fn count(conn: &Connection) -> Result<usize>;
}

impl Record for Car {
    fn find(conn: &Connection, id: &str) -> Result<Option<Self>> {
        SqliteCarRepository::new(conn).get(id)
    }

    fn fetch(conn: &Connection, limit: Option<usize>) -> Result<Vec<Self>> {
        SqliteCarRepository::new(conn).list(limit)
    }

    fn count(conn: &Connection) -> Result<usize> {
        SqliteCarRepository::new(conn).count()
    }
}

impl Record for User {
    fn find(conn: &Connection, id: &str) -> Result<Option<Self>> {
        SqliteUserRepository::new(conn).get(id)
    }

    fn fetch(conn: &Connection, limit: Option<usize>) -> Result<Vec<Self>> {
        let mut users = SqliteUserRepository::new(conn).list()?;
        if let Some(limit) = limit {
            users.truncate(limit);
        }
        Ok(users)
    }

    fn count(conn: &Connection) -> Result<usize> {
        SqliteUserRepository::new(conn).count()
    }
}

/// Handle to one table of the local store
pub struct Collection<'a, T> {
    store: &'a LocalStore,
    marker: PhantomData<fn() -> T>,
}

impl<'a, T: Record> Collection<'a, T> {
    pub(crate) const fn new(store: &'a LocalStore) -> Self {
        Self {
            store,
            marker: PhantomData,
        }
    }

    /// Start a query over the whole table
    pub const fn query(&self) -> Query<'a, T> {
        Query {
            store: self.store,
            limit: None,
            marker: PhantomData,
        }
    }

    /// Find a record by id
    pub async fn find(&self, id: &str) -> Result<Option<T>> {
        let id = id.to_string();
        self.store.read(move |conn| T::find(conn, &id)).await
    }
}

/// A query whose `fetch` returns a snapshot list
pub struct Query<'a, T> {
    store: &'a LocalStore,
    limit: Option<usize>,
    marker: PhantomData<fn() -> T>,
}

impl<T: Record> Query<'_, T> {
    #[must_use]
    pub const fn limit(mut self, limit: usize) -> Self {
        self.limit = Some(limit);
        self
    }

    /// Run the query and return every matching record
    ///
    /// Never observes a half-applied change set: reads and the apply
    /// transaction are serialized on the store.
    pub async fn fetch(self) -> Result<Vec<T>> {
        let limit = self.limit;
        self.store.read(move |conn| T::fetch(conn, limit)).await
    }

    /// Number of records in the table; ignores `limit`
    pub async fn fetch_count(self) -> Result<usize> {
        self.store.read(T::count).await
    }
}
