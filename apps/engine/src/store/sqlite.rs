//! SQLite implementation of the durable store.

use std::path::Path;

use async_trait::async_trait;
use serde_json::Value;
use sqlx::sqlite::{SqliteConnectOptions, SqlitePool, SqlitePoolOptions};

use super::{DurableStore, StoreError, StoreKey, Table};

// AUTOINCREMENT keeps deleted text ids from ever being reused.
const SCHEMA: &[&str] = &[
    "CREATE TABLE IF NOT EXISTS texts (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        doc TEXT NOT NULL
    )",
    "CREATE TABLE IF NOT EXISTS sessions (
        date TEXT PRIMARY KEY,
        doc TEXT NOT NULL
    )",
];

/// Document store backed by a local SQLite database.
pub struct SqliteStore {
    pool: SqlitePool,
}

impl SqliteStore {
    /// Open the database at `path`, creating file and schema if necessary.
    pub async fn open<P: AsRef<Path>>(path: P) -> Result<Self, StoreError> {
        let options = SqliteConnectOptions::new()
            .filename(path.as_ref())
            .create_if_missing(true);
        tracing::info!(path = %path.as_ref().display(), "opening practice store");
        Self::connect(options).await
    }

    /// Open an in-memory database (for testing).
    pub async fn open_in_memory() -> Result<Self, StoreError> {
        Self::connect(SqliteConnectOptions::new().in_memory(true)).await
    }

    async fn connect(options: SqliteConnectOptions) -> Result<Self, StoreError> {
        // A single connection serializes writes and keeps an in-memory
        // database alive for the pool's lifetime.
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .connect_with(options)
            .await?;
        let store = Self { pool };
        store.initialize().await?;
        Ok(store)
    }

    async fn initialize(&self) -> Result<(), StoreError> {
        for statement in SCHEMA {
            sqlx::query(statement).execute(&self.pool).await?;
        }
        Ok(())
    }
}

#[async_trait]
impl DurableStore for SqliteStore {
    async fn get_all(&self, table: Table) -> Result<Vec<Value>, StoreError> {
        let sql = match table {
            Table::Texts => "SELECT doc FROM texts ORDER BY id",
            Table::Sessions => "SELECT doc FROM sessions ORDER BY date",
        };
        let docs = sqlx::query_scalar::<_, String>(sql)
            .fetch_all(&self.pool)
            .await?;
        docs.into_iter()
            .map(|doc| serde_json::from_str(&doc).map_err(StoreError::from))
            .collect()
    }

    async fn get_one(&self, table: Table, key: &StoreKey) -> Result<Option<Value>, StoreError> {
        let sql = match table {
            Table::Texts => "SELECT doc FROM texts WHERE id = ?",
            Table::Sessions => "SELECT doc FROM sessions WHERE date = ?",
        };
        let query = sqlx::query_scalar::<_, String>(sql);
        let doc = match key {
            StoreKey::Id(id) => query.bind(*id).fetch_optional(&self.pool).await?,
            StoreKey::Date(date) => query.bind(date.as_str()).fetch_optional(&self.pool).await?,
        };
        doc.map(|doc| serde_json::from_str(&doc).map_err(StoreError::from))
            .transpose()
    }

    async fn insert(&self, table: Table, doc: &Value) -> Result<i64, StoreError> {
        if table != Table::Texts {
            return Err(StoreError::UnsupportedInsert(table.name()));
        }
        let result = sqlx::query("INSERT INTO texts (doc) VALUES (?)")
            .bind(doc.to_string())
            .execute(&self.pool)
            .await?;
        Ok(result.last_insert_rowid())
    }

    async fn upsert(&self, table: Table, key: &StoreKey, doc: &Value) -> Result<(), StoreError> {
        let sql = match table {
            Table::Texts => {
                "INSERT INTO texts (id, doc) VALUES (?, ?)
                 ON CONFLICT(id) DO UPDATE SET doc = excluded.doc"
            }
            Table::Sessions => {
                "INSERT INTO sessions (date, doc) VALUES (?, ?)
                 ON CONFLICT(date) DO UPDATE SET doc = excluded.doc"
            }
        };
        let query = sqlx::query(sql);
        let query = match key {
            StoreKey::Id(id) => query.bind(*id),
            StoreKey::Date(date) => query.bind(date.as_str()),
        };
        query.bind(doc.to_string()).execute(&self.pool).await?;
        Ok(())
    }

    async fn delete(&self, table: Table, key: &StoreKey) -> Result<(), StoreError> {
        let sql = match table {
            Table::Texts => "DELETE FROM texts WHERE id = ?",
            Table::Sessions => "DELETE FROM sessions WHERE date = ?",
        };
        let query = sqlx::query(sql);
        match key {
            StoreKey::Id(id) => query.bind(*id).execute(&self.pool).await?,
            StoreKey::Date(date) => query.bind(date.as_str()).execute(&self.pool).await?,
        };
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    #[tokio::test]
    async fn insert_assigns_fresh_keys() {
        let store = SqliteStore::open_in_memory().await.unwrap();
        let first = store.insert(Table::Texts, &json!({"n": 1})).await.unwrap();
        let second = store.insert(Table::Texts, &json!({"n": 2})).await.unwrap();
        assert!(second > first);
    }

    #[tokio::test]
    async fn get_one_round_trips() {
        let store = SqliteStore::open_in_memory().await.unwrap();
        let id = store.insert(Table::Texts, &json!({"n": 1})).await.unwrap();
        let doc = store
            .get_one(Table::Texts, &StoreKey::Id(id))
            .await
            .unwrap();
        assert_eq!(doc, Some(json!({"n": 1})));
        let absent = store
            .get_one(Table::Texts, &StoreKey::Id(id + 1))
            .await
            .unwrap();
        assert_eq!(absent, None);
    }

    #[tokio::test]
    async fn upsert_replaces_and_is_idempotent() {
        let store = SqliteStore::open_in_memory().await.unwrap();
        let key = StoreKey::Date("2024-06-01".to_string());
        let doc = json!({"date": "2024-06-01"});
        store.upsert(Table::Sessions, &key, &doc).await.unwrap();
        store.upsert(Table::Sessions, &key, &doc).await.unwrap();
        let all = store.get_all(Table::Sessions).await.unwrap();
        assert_eq!(all.len(), 1);
    }

    #[tokio::test]
    async fn sessions_reject_generated_keys() {
        let store = SqliteStore::open_in_memory().await.unwrap();
        let result = store.insert(Table::Sessions, &json!({})).await;
        assert!(matches!(result, Err(StoreError::UnsupportedInsert(_))));
    }

    #[tokio::test]
    async fn delete_is_idempotent() {
        let store = SqliteStore::open_in_memory().await.unwrap();
        let id = store.insert(Table::Texts, &json!({"n": 1})).await.unwrap();
        store
            .delete(Table::Texts, &StoreKey::Id(id))
            .await
            .unwrap();
        store
            .delete(Table::Texts, &StoreKey::Id(id))
            .await
            .unwrap();
        assert!(store.get_all(Table::Texts).await.unwrap().is_empty());
    }
}
