//! Validation utilities for identity tables.
//!
//! [`Registry::new`](crate::Registry::new) runs these checks on every
//! identity it accepts, so a misconfigured table is rejected before it can
//! influence resolution.

/// Validation error types.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValidationError {
    /// Value is empty or whitespace-only.
    Empty,
    /// Value contains invalid characters.
    InvalidCharacters(&'static str),
    /// Value has invalid format.
    InvalidFormat(&'static str),
}

impl std::fmt::Display for ValidationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Empty => write!(f, "value must not be empty"),
            Self::InvalidCharacters(msg) => write!(f, "invalid characters: {msg}"),
            Self::InvalidFormat(msg) => write!(f, "invalid format: {msg}"),
        }
    }
}

impl std::error::Error for ValidationError {}

/// Validates that a string is non-empty after trimming.
pub fn validate_non_empty(value: &str) -> Result<(), ValidationError> {
    if value.trim().is_empty() {
        Err(ValidationError::Empty)
    } else {
        Ok(())
    }
}

/// Validates a command-line name (no whitespace, no path separators).
pub fn validate_cli_name(value: &str) -> Result<(), ValidationError> {
    validate_non_empty(value)?;

    if value.chars().any(char::is_whitespace) {
        return Err(ValidationError::InvalidCharacters("contains whitespace"));
    }

    if value.chars().any(std::path::is_separator) {
        return Err(ValidationError::InvalidCharacters(
            "contains path separator",
        ));
    }

    Ok(())
}

/// Validates a marker directory name.
///
/// Markers are single path components: no separators, and neither `.` nor
/// `..`, since those would make every directory look like a repository root.
pub fn validate_dot_dir(value: &str) -> Result<(), ValidationError> {
    validate_cli_name(value)?;

    if value == "." || value == ".." {
        return Err(ValidationError::InvalidFormat(
            "must not be a relative directory reference",
        ));
    }

    Ok(())
}

/// Validates an environment variable name or prefix (`[A-Z0-9_]`).
pub fn validate_env_name(value: &str) -> Result<(), ValidationError> {
    validate_non_empty(value)?;

    if !value
        .bytes()
        .all(|byte| byte.is_ascii_uppercase() || byte.is_ascii_digit() || byte == b'_')
    {
        return Err(ValidationError::InvalidCharacters(
            "expected uppercase ASCII letters, digits, or underscores",
        ));
    }

    Ok(())
}
