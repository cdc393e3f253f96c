//! Composite line-key codec.
//!
//! A line is addressed as `"<textId>_<index>"`, where the text id is the
//! parent's store-generated integer key and the index is the line's
//! zero-based position at creation time. Decoding splits at the *last*
//! separator: the text id is purely numeric and cannot contain one, while
//! nothing is assumed about other string content.

use crate::error::KeyError;

pub const SEPARATOR: char = '_';

/// Build the key for a line at `index` within text `text_id`.
pub fn line_key(text_id: i64, index: usize) -> String {
    format!("{text_id}{SEPARATOR}{index}")
}

/// Decode a line key into `(text_id, index)`.
pub fn parse_line_key(key: &str) -> Result<(i64, usize), KeyError> {
    let (id, index) = key
        .rsplit_once(SEPARATOR)
        .ok_or_else(|| KeyError::MissingSeparator(key.to_string()))?;
    let text_id = id
        .parse()
        .map_err(|_| KeyError::InvalidTextId(key.to_string()))?;
    let index = index
        .parse()
        .map_err(|_| KeyError::InvalidIndex(key.to_string()))?;
    Ok((text_id, index))
}
