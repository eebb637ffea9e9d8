use crate::db;
use rusqlite::Connection;
use std::collections::HashMap;
use std::path::Path;

#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    #[error("sqlite: {0}")]
    Sqlite(#[from] rusqlite::Error),
    #[error("write rejected for key {key}: {reason}")]
    Rejected { key: String, reason: String },
}

/// A durable string key-value store, the local mirror of in-memory state.
pub trait KeyValueStore {
    fn get_item(&self, key: &str) -> Result<Option<String>, StorageError>;
    fn set_item(&mut self, key: &str, value: &str) -> Result<(), StorageError>;
}

/// Key-value pairs kept in the workspace sqlite database.
pub struct SqliteKv {
    conn: Connection,
}

impl SqliteKv {
    pub fn new(conn: Connection) -> Self {
        SqliteKv { conn }
    }

    pub fn open(workspace: &Path) -> anyhow::Result<Self> {
        Ok(SqliteKv::new(db::open_db(workspace)?))
    }
}

impl KeyValueStore for SqliteKv {
    fn get_item(&self, key: &str) -> Result<Option<String>, StorageError> {
        Ok(db::kv_get(&self.conn, key)?)
    }

    fn set_item(&mut self, key: &str, value: &str) -> Result<(), StorageError> {
        Ok(db::kv_set(&self.conn, key, value)?)
    }
}

/// Process-local store. `quota` caps the byte length of a single value so
/// tests can exercise rejected writes.
#[derive(Debug, Default, Clone)]
pub struct MemoryKv {
    items: HashMap<String, String>,
    quota: Option<usize>,
}

impl MemoryKv {
    pub fn new() -> Self {
        MemoryKv::default()
    }

    pub fn with_item(mut self, key: &str, value: &str) -> Self {
        self.items.insert(key.to_string(), value.to_string());
        self
    }

    pub fn set_quota(&mut self, quota: Option<usize>) {
        self.quota = quota;
    }
}

impl KeyValueStore for MemoryKv {
    fn get_item(&self, key: &str) -> Result<Option<String>, StorageError> {
        Ok(self.items.get(key).cloned())
    }

    fn set_item(&mut self, key: &str, value: &str) -> Result<(), StorageError> {
        if let Some(limit) = self.quota {
            if value.len() > limit {
                return Err(StorageError::Rejected {
                    key: key.to_string(),
                    reason: format!("quota exceeded ({} > {} bytes)", value.len(), limit),
                });
            }
        }
        self.items.insert(key.to_string(), value.to_string());
        Ok(())
    }
}
