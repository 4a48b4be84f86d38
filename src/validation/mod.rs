//! Field validation for request payloads

use std::fmt;

pub const NAMA_MIN_LEN: usize = 2;
pub const NAMA_MAX_LEN: usize = 100;
pub const PASSWORD_MIN_LEN: usize = 6;
pub const EMAIL_MAX_LEN: usize = 254;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationError {
    pub field: &'static str,
    pub message: String,
}

impl ValidationError {
    pub fn new(field: &'static str, message: impl Into<String>) -> Self {
        Self {
            field,
            message: message.into(),
        }
    }
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.field, self.message)
    }
}

impl std::error::Error for ValidationError {}

pub type ValidationResult = Result<(), ValidationError>;

pub fn validate_required(field: &'static str, value: &str) -> ValidationResult {
    if value.trim().is_empty() {
        return Err(ValidationError::new(field, "is required"));
    }

    Ok(())
}

/// Length in characters, not bytes.
pub fn validate_length(field: &'static str, value: &str, min: usize, max: usize) -> ValidationResult {
    let len = value.chars().count();
    if len < min {
        return Err(ValidationError::new(
            field,
            format!("must be at least {} characters", min),
        ));
    }
    if len > max {
        return Err(ValidationError::new(
            field,
            format!("must be at most {} characters", max),
        ));
    }

    Ok(())
}

pub fn validate_min_length(field: &'static str, value: &str, min: usize) -> ValidationResult {
    validate_length(field, value, min, usize::MAX)
}

/// Structural check only: one `@`, non-empty local part, dotted domain, no whitespace.
pub fn validate_email(field: &'static str, value: &str) -> ValidationResult {
    let invalid = || ValidationError::new(field, "must be a valid email address");

    if value.is_empty() || value.len() > EMAIL_MAX_LEN || value.chars().any(char::is_whitespace) {
        return Err(invalid());
    }

    let (local, domain) = value.split_once('@').ok_or_else(invalid)?;
    if local.is_empty() || domain.contains('@') {
        return Err(invalid());
    }

    let labels: Vec<&str> = domain.split('.').collect();
    if labels.len() < 2 || labels.iter().any(|label| label.is_empty()) {
        return Err(invalid());
    }

    Ok(())
}

pub fn validate_one_of(field: &'static str, value: &str, allowed: &[&str]) -> ValidationResult {
    if allowed.contains(&value) {
        return Ok(());
    }

    Err(ValidationError::new(
        field,
        format!("must be one of: {}", allowed.join(", ")),
    ))
}

pub fn validate_non_negative(field: &'static str, value: i64) -> ValidationResult {
    if value < 0 {
        return Err(ValidationError::new(field, "must not be negative"));
    }

    Ok(())
}
