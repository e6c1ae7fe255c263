//! Sync protocol payloads: change sets, checkpoints and pending mutations

use serde::{Deserialize, Serialize};
use std::fmt;

use super::{Car, User};

/// Logical tables replicated from the server
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TableName {
    Cars,
    Users,
}

impl TableName {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Cars => "cars",
            Self::Users => "users",
        }
    }
}

impl fmt::Display for TableName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Server version up to which local state is known to match
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Checkpoint(i64);

impl Checkpoint {
    /// Beginning of time: nothing has been pulled yet
    pub const ORIGIN: Self = Self(0);

    #[must_use]
    pub const fn new(version: i64) -> Self {
        Self(version)
    }

    #[must_use]
    pub const fn version(self) -> i64 {
        self.0
    }
}

impl fmt::Display for Checkpoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Per-table delta: created and updated records plus deleted identifiers
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TableChanges<T> {
    #[serde(default = "Vec::new")]
    pub created: Vec<T>,
    #[serde(default = "Vec::new")]
    pub updated: Vec<T>,
    #[serde(default)]
    pub deleted: Vec<String>,
}

impl<T> Default for TableChanges<T> {
    fn default() -> Self {
        Self {
            created: Vec::new(),
            updated: Vec::new(),
            deleted: Vec::new(),
        }
    }
}

impl<T> TableChanges<T> {
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.created.is_empty() && self.updated.is_empty() && self.deleted.is_empty()
    }

    /// Number of record-level changes in this table
    #[must_use]
    pub fn len(&self) -> usize {
        self.created.len() + self.updated.len() + self.deleted.len()
    }
}

/// Server-computed delta since a checkpoint
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ChangeSet {
    #[serde(default)]
    pub cars: TableChanges<Car>,
    #[serde(default)]
    pub users: TableChanges<User>,
}

/// Body of `GET /cars/sync/pull`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PullResponse {
    #[serde(default)]
    pub changes: ChangeSet,
    #[serde(rename = "latestVersion")]
    pub latest_version: i64,
}

impl PullResponse {
    #[must_use]
    pub const fn checkpoint(&self) -> Checkpoint {
        Checkpoint::new(self.latest_version)
    }
}

/// A local edit waiting to be pushed
///
/// `revision` grows with every superseding edit of the same record, so an
/// acknowledgement only clears the exact edit that was sent.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LocalMutation {
    pub table: TableName,
    pub record_id: String,
    pub payload: User,
    pub revision: i64,
}
