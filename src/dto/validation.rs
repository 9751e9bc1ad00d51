//! Validation helpers for DTOs.

use std::borrow::Cow;

use validator::ValidationError;

use crate::state::court::{MATCH_NOTES_MAX_CHARS, normalize_notes};

/// Validates that match notes fit the archive limit once surrounding whitespace is removed.
///
/// # Examples
///
/// ```ignore
/// validate_notes("great match")     // Ok
/// validate_notes(&"n".repeat(501))  // Err - too long
/// ```
pub fn validate_notes(notes: &str) -> Result<(), ValidationError> {
    normalize_notes(Some(notes)).map(|_| ()).map_err(|violation| {
        let mut err = ValidationError::new("notes_length");
        err.message = Some(Cow::Owned(violation.to_string()));
        err.add_param(Cow::Borrowed("max"), &MATCH_NOTES_MAX_CHARS);
        err
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_notes_valid() {
        assert!(validate_notes("").is_ok());
        assert!(validate_notes("great match").is_ok());
        assert!(validate_notes(&"n".repeat(500)).is_ok());
        assert!(validate_notes(&format!("  {}  ", "n".repeat(500))).is_ok()); // trimmed
    }

    #[test]
    fn test_validate_notes_too_long() {
        let err = validate_notes(&"n".repeat(501)).unwrap_err();
        assert_eq!(err.code, "notes_length");
    }
}
