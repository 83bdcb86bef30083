//! # swiftdash-store
//!
//! Named durable slots in a local SQLite file. [`Database`] opens and
//! migrates the file; the slot accessors live in [`slots`].

pub mod database;
pub mod migrations;
pub mod slots;

mod error;

pub use database::Database;
pub use error::{Result, StoreError};
