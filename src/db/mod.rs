//! SQLite persistence for the key-value store.

mod error;
mod models;
mod repository;
mod schema; // Diesel generated schema - internal use only

pub use error::StoreError;
pub use models::{KvEntry, NewKvEntry};
pub use repository::SqliteStore;
