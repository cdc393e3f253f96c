//! Core practice library shared by the engine and presentation layers.
//!
//! Provides:
//! - Spaced repetition scheduling (classic SM-2 over a 0-5 quality grade)
//! - Mastery classification derived from scheduling state
//! - Composite line-key codec (`"<textId>_<index>"`)
//! - Shared types (Text, Line, Session, Category, ...)

pub mod algorithm;
pub mod error;
pub mod key;
pub mod types;

pub use algorithm::{Quality, Sm2};
pub use error::KeyError;
pub use key::{line_key, parse_line_key};
pub use types::{
    AnnotatedText, Category, Line, MasteryLevel, RawLine, ReviewState, Session, Text,
};
