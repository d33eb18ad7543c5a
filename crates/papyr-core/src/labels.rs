//! Label name validation and normalization.
//!
//! A label's display name keeps the casing it was first created with, while
//! uniqueness is decided on [`label_name_key`]: the normalized name in
//! lowercase. Both the Postgres and the in-memory stores key on it.

use crate::defaults::LABEL_NAME_MAX_CHARS;
use crate::{Error, Result};

/// Validate and normalize a label name.
///
/// Rules:
/// - Surrounding whitespace is trimmed and internal runs collapse to one space
/// - The result must be non-empty
/// - Length must be at most 255 characters
/// - Control characters are rejected
pub fn normalize_label_name(raw: &str) -> Result<String> {
    let name = raw.split_whitespace().collect::<Vec<_>>().join(" ");
    if name.is_empty() {
        return Err(Error::InvalidInput("Label name cannot be empty".to_string()));
    }
    if name.chars().count() > LABEL_NAME_MAX_CHARS {
        return Err(Error::InvalidInput(format!(
            "Label name must be {} characters or less",
            LABEL_NAME_MAX_CHARS
        )));
    }
    if name.chars().any(char::is_control) {
        return Err(Error::InvalidInput(
            "Label name contains control characters".to_string(),
        ));
    }
    Ok(name)
}

/// Uniqueness key for a label name.
///
/// Infallible; callers validate with [`normalize_label_name`] first.
pub fn label_name_key(name: &str) -> String {
    name.split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
        .to_lowercase()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_trims_and_collapses() {
        assert_eq!(
            normalize_label_name("  Machine \t Learning ").unwrap(),
            "Machine Learning"
        );
    }

    #[test]
    fn test_normalize_rejects_empty() {
        for raw in ["", "   ", "\n\t"] {
            let err = normalize_label_name(raw).unwrap_err();
            assert!(matches!(err, Error::InvalidInput(_)), "{raw:?}");
        }
    }

    #[test]
    fn test_normalize_rejects_overlong() {
        let raw = "x".repeat(LABEL_NAME_MAX_CHARS + 1);
        assert!(normalize_label_name(&raw).is_err());
        let ok = "x".repeat(LABEL_NAME_MAX_CHARS);
        assert!(normalize_label_name(&ok).is_ok());
    }

    #[test]
    fn test_normalize_rejects_control_characters() {
        assert!(normalize_label_name("bad\u{0007}name").is_err());
    }

    #[test]
    fn test_name_key_is_case_insensitive() {
        assert_eq!(label_name_key("Transformer"), label_name_key(" transformer "));
        assert_eq!(label_name_key("Deep  Learning"), "deep learning");
        assert_ne!(label_name_key("Transformer"), label_name_key("Transformers"));
    }
}
