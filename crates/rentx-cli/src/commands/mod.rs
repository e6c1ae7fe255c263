pub mod cars;
pub mod common;
pub mod config;
pub mod profile;
pub mod rent;
pub mod status;
pub mod sync;
