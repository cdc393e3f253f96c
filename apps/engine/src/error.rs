//! Error taxonomy surfaced to Facade callers.

use thiserror::Error;

use crate::store::StoreError;

/// Errors an engine operation can fail with.
///
/// Nothing below the Facade caller catches or retries; every failure is
/// scoped to the single requested operation.
#[derive(Debug, Error)]
pub enum EngineError {
    #[error("not found: {0}")]
    NotFound(String),

    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    #[error("unknown action: {0}")]
    UnknownAction(String),

    #[error("storage error: {0}")]
    Storage(#[from] StoreError),
}

/// Result type alias for engine operations.
pub type Result<T> = std::result::Result<T, EngineError>;
