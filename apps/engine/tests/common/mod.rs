//! Shared test fixtures: an engine over an in-memory store.

use std::sync::Arc;

use memoriter_core::types::RawLine;
use memoriter_engine::{Repository, SqliteStore};

pub async fn test_repository() -> Arc<Repository> {
    let store = SqliteStore::open_in_memory()
        .await
        .expect("in-memory store");
    Arc::new(Repository::new(Arc::new(store)))
}

pub fn raw_lines(texts: &[&str]) -> Vec<RawLine> {
    texts
        .iter()
        .map(|text| RawLine {
            text: text.to_string(),
            pronunciation: String::new(),
            translation: String::new(),
        })
        .collect()
}
