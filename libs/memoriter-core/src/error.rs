//! Error types for memoriter-core.

use thiserror::Error;

/// Errors that can occur while decoding a composite line key.
#[derive(Debug, Error)]
pub enum KeyError {
    #[error("missing separator in line key {0:?}")]
    MissingSeparator(String),

    #[error("non-numeric text id in line key {0:?}")]
    InvalidTextId(String),

    #[error("non-numeric line index in line key {0:?}")]
    InvalidIndex(String),
}
