//! Utility functions for the log shipper repository.

use crate::errors::IndexStoreError;

/// Characters the store refuses in index names.
const FORBIDDEN_INDEX_CHARS: &[char] = &['\\', '/', '*', '?', '"', '<', '>', '|', ' ', ',', '#', ':'];

/// Maximum index name length accepted by the store, in bytes.
const MAX_INDEX_NAME_BYTES: usize = 255;

/// Validate an index name against the store's naming rules.
///
/// Index names must be lowercase, must not contain any of
/// `\ / * ? " < > | , # :` or spaces, must not start with `-`, `_` or `+`,
/// must not be `.` or `..`, and must fit in 255 bytes.
///
/// # Arguments
///
/// * `name` - The index name to validate
///
/// # Returns
///
/// * `Ok(())` - If the name is acceptable
/// * `Err(IndexStoreError)` - A validation error describing the first violation
///
/// # Example
///
/// ```
/// use log_shipper_repository::validate_index_name;
///
/// assert!(validate_index_name("logs-2024-03-07").is_ok());
/// assert!(validate_index_name("Logs-2024-03-07").is_err());
/// ```
pub fn validate_index_name(name: &str) -> Result<(), IndexStoreError> {
    if name.is_empty() {
        return Err(IndexStoreError::validation("Index name cannot be empty"));
    }

    if name == "." || name == ".." {
        return Err(IndexStoreError::validation(format!(
            "Index name '{}' is reserved",
            name
        )));
    }

    if name.len() > MAX_INDEX_NAME_BYTES {
        return Err(IndexStoreError::validation(format!(
            "Index name is {} bytes long, the maximum is {}",
            name.len(),
            MAX_INDEX_NAME_BYTES
        )));
    }

    if name.starts_with(['-', '_', '+']) {
        return Err(IndexStoreError::validation(format!(
            "Index name '{}' must not start with '-', '_' or '+'",
            name
        )));
    }

    if name.chars().any(|c| c.is_uppercase()) {
        return Err(IndexStoreError::validation(format!(
            "Index name '{}' must be lowercase",
            name
        )));
    }

    if let Some(c) = name.chars().find(|c| FORBIDDEN_INDEX_CHARS.contains(c)) {
        return Err(IndexStoreError::validation(format!(
            "Index name '{}' contains invalid character '{}'",
            name, c
        )));
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_valid_index_names() {
        let names = ["logs-2024-03-07", "elasticsearch-2024-12-31", "a", "app.v2-2024-01-01"];
        for name in names {
            assert!(validate_index_name(name).is_ok(), "expected '{}' to be valid", name);
        }
    }

    #[test]
    fn test_empty_and_reserved_names() {
        for name in ["", ".", ".."] {
            let result = validate_index_name(name);
            assert!(matches!(result, Err(IndexStoreError::ValidationError(_))));
        }
    }

    #[test]
    fn test_uppercase_rejected() {
        assert!(validate_index_name("Logs-2024-03-07").is_err());
    }

    #[test]
    fn test_invalid_leading_characters() {
        for name in ["-logs", "_logs", "+logs"] {
            assert!(validate_index_name(name).is_err(), "expected '{}' to be rejected", name);
        }
    }

    #[test]
    fn test_invalid_characters() {
        let test_cases = vec![
            ("logs/2024", "contains forward slash"),
            ("logs\\2024", "contains backslash"),
            ("logs*", "contains *"),
            ("logs?", "contains ?"),
            ("logs\"", "contains quote"),
            ("logs<", "contains <"),
            ("logs>", "contains >"),
            ("logs|x", "contains |"),
            ("logs x", "contains space"),
            ("logs,x", "contains comma"),
            ("logs#x", "contains #"),
            ("logs:x", "contains colon"),
        ];

        for (name, description) in test_cases {
            let result = validate_index_name(name);
            assert!(
                matches!(result, Err(IndexStoreError::ValidationError(_))),
                "Expected ValidationError for '{}' ({})",
                name,
                description
            );
        }
    }

    #[test]
    fn test_too_long() {
        let name = "a".repeat(256);
        assert!(validate_index_name(&name).is_err());
        assert!(validate_index_name(&"a".repeat(255)).is_ok());
    }
}
