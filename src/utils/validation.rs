//! Input validation primitives.
//!
//! These replace verbose ok_or_else + Error::validation_invalid_argument chains.

use crate::error::{Error, Result};

/// Require a string to be non-empty. Whitespace is significant and kept.
pub fn require_non_empty<'a>(value: &'a str, field: &str, message: &str) -> Result<&'a str> {
    if value.is_empty() {
        Err(Error::validation_invalid_argument(field, message, None, None))
    } else {
        Ok(value)
    }
}

/// Require a collection to be non-empty.
pub fn require_non_empty_vec<'a, T>(vec: &'a [T], field: &str, message: &str) -> Result<&'a [T]> {
    if vec.is_empty() {
        Err(Error::validation_missing_argument(vec![field.to_string()])
            .with_hint(message.to_string()))
    } else {
        Ok(vec)
    }
}
