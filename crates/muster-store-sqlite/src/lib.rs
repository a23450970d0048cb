//! SQLite backend for the Muster personnel registry.
//!
//! Wraps [`tokio_rusqlite`] so all database access runs on a dedicated thread
//! without blocking the async runtime. Imports run on that thread too, as a
//! single transaction driven through the synchronous
//! [`muster_core::store::RecordStore`] interface.

mod encode;
mod records;
mod schema;
mod sql;
mod store;

pub mod error;

pub use error::{Error, Result};
pub use store::SqliteStore;
