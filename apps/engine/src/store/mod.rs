//! Durable key-value persistence.
//!
//! The store keeps whole records as JSON documents in two independent
//! tables: `texts`, keyed by a store-generated integer id, and `sessions`,
//! keyed by calendar date. It is the only source of fresh text ids. The
//! trait is the seam the repository is built against, so a test double or
//! alternate backend can be injected.

pub mod sqlite;

use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;
use thiserror::Error;

pub use sqlite::SqliteStore;

/// The two tables the store exposes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Table {
    Texts,
    Sessions,
}

impl Table {
    pub fn name(self) -> &'static str {
        match self {
            Self::Texts => "texts",
            Self::Sessions => "sessions",
        }
    }
}

/// Key into one of the two tables.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StoreKey {
    /// Generated integer key (texts).
    Id(i64),
    /// ISO `YYYY-MM-DD` calendar date (sessions).
    Date(String),
}

/// Errors from the persistence layer.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("storage unavailable: {0}")]
    Unavailable(#[from] sqlx::Error),

    #[error("corrupt record: {0}")]
    Corrupt(#[from] serde_json::Error),

    #[error("table {0} does not assign keys")]
    UnsupportedInsert(&'static str),
}

/// Asynchronous transactional document store.
///
/// Every operation is a suspension point and may fail with
/// [`StoreError::Unavailable`]; callers propagate rather than retry. No
/// operation spans both tables atomically.
#[async_trait]
pub trait DurableStore: Send + Sync {
    /// All records in a table, in key order.
    async fn get_all(&self, table: Table) -> Result<Vec<Value>, StoreError>;

    /// One record by key, or `None` if absent.
    async fn get_one(&self, table: Table, key: &StoreKey) -> Result<Option<Value>, StoreError>;

    /// Insert a record under a freshly generated key and return the key.
    /// Only the texts table assigns keys.
    async fn insert(&self, table: Table, doc: &Value) -> Result<i64, StoreError>;

    /// Insert or replace the record under an explicit key.
    async fn upsert(&self, table: Table, key: &StoreKey, doc: &Value) -> Result<(), StoreError>;

    /// Remove the record under a key. Removing an absent key is not an
    /// error.
    async fn delete(&self, table: Table, key: &StoreKey) -> Result<(), StoreError>;
}

/// Encode a record as a stored document.
pub fn to_doc<T: Serialize>(value: &T) -> Result<Value, StoreError> {
    serde_json::to_value(value).map_err(StoreError::from)
}

/// Decode a stored document into a record.
pub fn from_doc<T: DeserializeOwned>(doc: Value) -> Result<T, StoreError> {
    serde_json::from_value(doc).map_err(StoreError::from)
}
