//! SQLite-backed key-value store.

use diesel::prelude::*;
use diesel_migrations::{EmbeddedMigrations, MigrationHarness, embed_migrations};
use tracing::{debug, info, instrument};

use crate::db::{KvEntry, NewKvEntry, StoreError, schema};
use crate::storage::KeyValueStore;

const MIGRATIONS: EmbeddedMigrations = embed_migrations!("migrations");

/// Key-value store persisted in a SQLite database file.
#[derive(Debug, Clone)]
pub struct SqliteStore {
    db_path: String,
}

impl SqliteStore {
    /// Opens the database at the given path, creating the file and applying
    /// pending migrations as needed.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] if the database cannot be opened or migrated.
    #[instrument(skip(db_path))]
    pub fn open(db_path: impl Into<String>) -> Result<Self, StoreError> {
        let store = Self {
            db_path: db_path.into(),
        };
        info!(path = %store.db_path, "Opening SqliteStore");

        let mut conn = store.connection()?;
        let applied = conn
            .run_pending_migrations(MIGRATIONS)
            .map_err(|e| StoreError::new(format!("Migration failed: {}", e)))?;
        debug!(count = applied.len(), "Migrations applied");

        Ok(store)
    }

    /// Returns the database path.
    pub fn db_path(&self) -> &str {
        &self.db_path
    }

    /// Establishes a database connection.
    #[instrument(skip(self))]
    fn connection(&self) -> Result<SqliteConnection, StoreError> {
        debug!(path = %self.db_path, "Establishing connection");
        SqliteConnection::establish(&self.db_path)
            .map_err(|e| StoreError::new(format!("Failed to connect to '{}': {}", self.db_path, e)))
    }

    /// Lists all entries, ordered by key.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] if a database error occurs.
    #[instrument(skip(self))]
    pub fn entries(&self) -> Result<Vec<KvEntry>, StoreError> {
        let mut conn = self.connection()?;

        let entries = schema::kv_entries::table
            .order(schema::kv_entries::key.asc())
            .select(KvEntry::as_select())
            .load(&mut conn)?;

        info!(count = entries.len(), "Entries loaded");
        Ok(entries)
    }
}

impl KeyValueStore for SqliteStore {
    #[instrument(skip(self, value), fields(len = value.len()))]
    fn save(&self, key: &str, value: &str) -> Result<(), StoreError> {
        let mut conn = self.connection()?;

        let entry = NewKvEntry::new(key.to_string(), value.to_string());
        diesel::replace_into(schema::kv_entries::table)
            .values(&entry)
            .execute(&mut conn)?;

        debug!(key, "Entry saved");
        Ok(())
    }

    #[instrument(skip(self))]
    fn load(&self, key: &str) -> Result<Option<String>, StoreError> {
        let mut conn = self.connection()?;

        let value = schema::kv_entries::table
            .find(key)
            .select(schema::kv_entries::value)
            .first::<String>(&mut conn)
            .optional()?;

        debug!(key, found = value.is_some(), "Entry looked up");
        Ok(value)
    }

    #[instrument(skip(self))]
    fn remove(&self, key: &str) -> Result<(), StoreError> {
        let mut conn = self.connection()?;

        let deleted = diesel::delete(schema::kv_entries::table.find(key)).execute(&mut conn)?;

        debug!(key, deleted, "Entry removed");
        Ok(())
    }
}
