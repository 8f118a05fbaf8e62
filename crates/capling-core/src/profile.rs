//! Profile helpers for the mascot name editor

use crate::error::{Error, Result};

/// Name given to a fresh mascot
pub const DEFAULT_CAPLING_NAME: &str = "Capling";

/// Longest accepted mascot name, in characters
pub const MAX_CAPLING_NAME_LEN: usize = 30;

/// Validate a mascot name and return it trimmed.
///
/// Rejected names never reach the database.
pub fn validate_capling_name(name: &str) -> Result<String> {
    let trimmed = name.trim();

    if trimmed.is_empty() {
        return Err(Error::Validation("name cannot be empty".into()));
    }
    if trimmed.chars().count() > MAX_CAPLING_NAME_LEN {
        return Err(Error::Validation(format!(
            "name must be at most {} characters",
            MAX_CAPLING_NAME_LEN
        )));
    }
    if trimmed.chars().any(char::is_control) {
        return Err(Error::Validation(
            "name cannot contain control characters".into(),
        ));
    }

    Ok(trimmed.to_string())
}
