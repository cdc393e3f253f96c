//! Practice store and scheduling engine.
//!
//! The persistent core behind a personal spaced-repetition memorization
//! tool: texts containing ordered lines, each line reviewed on its own
//! adaptive schedule. The presentation layer consumes exactly one
//! surface, [`Facade::dispatch`]; everything else here exists to serve it.

pub mod error;
pub mod facade;
pub mod query;
pub mod repository;
pub mod store;

use std::path::Path;
use std::sync::Arc;

pub use error::{EngineError, Result};
pub use facade::{Facade, Verb};
pub use query::{DueLine, DueLines, Stats, TextMastery};
pub use repository::{LinePatch, Repository, TextPatch};
pub use store::{DurableStore, SqliteStore, StoreError, StoreKey, Table};

/// Open the store at `path` and wire up the full engine.
pub async fn open<P: AsRef<Path>>(path: P) -> Result<Facade> {
    let store = SqliteStore::open(path).await?;
    Ok(Facade::new(Arc::new(Repository::new(Arc::new(store)))))
}

/// Engine over an in-memory store (for testing).
pub async fn open_in_memory() -> Result<Facade> {
    let store = SqliteStore::open_in_memory().await?;
    Ok(Facade::new(Arc::new(Repository::new(Arc::new(store)))))
}
