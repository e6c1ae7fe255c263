//! Data models for RentX

pub(crate) mod car;
mod changes;
mod rental;
pub(crate) mod user;

pub use car::{Accessory, Car, CarPhoto, PRICE_PLACEHOLDER};
pub use changes::{ChangeSet, Checkpoint, LocalMutation, PullResponse, TableChanges, TableName};
pub use rental::RentalRequest;
pub use user::{ProfileEdit, User};
