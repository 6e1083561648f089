//! Repository pattern for database access.

use crate::db::error::DbError;
use crate::db::schema::{DECKS_KEY, SCHEMA, SCHEMA_VERSION};
use chrono::Utc;
use flashcard_core::types::Deck;
use rusqlite::{params, Connection, OptionalExtension};
use std::path::Path;

type Result<T> = std::result::Result<T, DbError>;

/// String key-value storage, the local-storage analogue.
pub trait KeyValueStore {
    fn get(&self, key: &str) -> Result<Option<String>>;
    fn set(&self, key: &str, value: &str) -> Result<()>;
    fn remove(&self, key: &str) -> Result<()>;
}

/// Persistence of the whole deck library.
pub trait DeckStore {
    /// `None` when nothing has been saved yet.
    fn load_decks(&self) -> Result<Option<Vec<Deck>>>;
    fn save_decks(&self, decks: &[Deck]) -> Result<()>;
}

impl<T: KeyValueStore> DeckStore for T {
    fn load_decks(&self) -> Result<Option<Vec<Deck>>> {
        let Some(raw) = self.get(DECKS_KEY)? else {
            return Ok(None);
        };
        serde_json::from_str(&raw)
            .map(Some)
            .map_err(|source| DbError::InvalidData {
                key: DECKS_KEY.to_string(),
                source,
            })
    }

    fn save_decks(&self, decks: &[Deck]) -> Result<()> {
        let raw = serde_json::to_string(decks)?;
        self.set(DECKS_KEY, &raw)
    }
}

/// SQLite implementation of the stores.
pub struct SqliteRepository {
    conn: Connection,
}

impl SqliteRepository {
    /// Open database at path, creating if necessary.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let conn = Connection::open(path)?;
        let repo = Self { conn };
        repo.initialize()?;
        Ok(repo)
    }

    /// Open in-memory database (for testing).
    pub fn open_in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory()?;
        let repo = Self { conn };
        repo.initialize()?;
        Ok(repo)
    }

    fn initialize(&self) -> Result<()> {
        self.conn.execute_batch(SCHEMA)?;
        self.conn.execute(
            "INSERT OR IGNORE INTO schema_version (version) VALUES (?1)",
            params![SCHEMA_VERSION],
        )?;
        Ok(())
    }

    pub fn schema_version(&self) -> Result<i32> {
        self.conn
            .query_row("SELECT MAX(version) FROM schema_version", [], |row| row.get(0))
            .map_err(Into::into)
    }
}

impl KeyValueStore for SqliteRepository {
    fn get(&self, key: &str) -> Result<Option<String>> {
        self.conn
            .query_row(
                "SELECT value FROM kv_store WHERE key = ?1",
                params![key],
                |row| row.get(0),
            )
            .optional()
            .map_err(Into::into)
    }

    fn set(&self, key: &str, value: &str) -> Result<()> {
        let now = Utc::now().to_rfc3339();
        self.conn.execute(
            "INSERT INTO kv_store (key, value, updated_at) VALUES (?1, ?2, ?3)
             ON CONFLICT(key) DO UPDATE SET value = excluded.value, updated_at = excluded.updated_at",
            params![key, value, now],
        )?;
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<()> {
        self.conn
            .execute("DELETE FROM kv_store WHERE key = ?1", params![key])?;
        Ok(())
    }
}
