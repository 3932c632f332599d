//! `trolley-storage` — asynchronous key-value storage for cart persistence.
//!
//! The cart never talks to a database directly; it goes through the
//! [`StorageBackend`] trait. Two backends ship here: an in-memory map for
//! tests and development, and a SQLite-backed store for durable local state.

pub mod backend;
pub mod memory;
pub mod sqlite;

pub use backend::{StorageBackend, StorageError};
pub use memory::MemoryStorage;
pub use sqlite::SqliteStorage;
