//! Database layer for the on-device replica

mod connection;
pub(crate) mod metadata;
mod migrations;
mod repository;
mod user_repository;

pub use connection::Database;
pub use repository::{CarRepository, SqliteCarRepository};
pub use user_repository::{SqliteUserRepository, UserRepository};
