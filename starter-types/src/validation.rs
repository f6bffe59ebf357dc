//! Per-field request validation.
//!
//! Request DTOs implement [`Validate`]; every rule that fails contributes a
//! [`FieldError`] so clients see all problems at once.

use serde::Serialize;
use utoipa::ToSchema;

/// A single failed rule.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
pub struct FieldError {
    #[schema(example = "age")]
    pub field: String,
    #[schema(example = "Must be at least 18")]
    pub message: String,
}

impl FieldError {
    pub fn new(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            message: message.into(),
        }
    }
}

/// Every failed rule for one request.
#[derive(Debug, Clone, Default, PartialEq, Eq, thiserror::Error)]
#[error("{} invalid field(s)", .0.len())]
pub struct ValidationErrors(Vec<FieldError>);

impl ValidationErrors {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, field: impl Into<String>, message: impl Into<String>) {
        self.0.push(FieldError::new(field, message));
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn fields(&self) -> &[FieldError] {
        &self.0
    }

    /// `Ok(())` when nothing was recorded.
    pub fn into_result(self) -> Result<(), ValidationErrors> {
        if self.is_empty() { Ok(()) } else { Err(self) }
    }
}

impl From<Vec<FieldError>> for ValidationErrors {
    fn from(errors: Vec<FieldError>) -> Self {
        Self(errors)
    }
}

/// Implemented by request bodies that carry input rules.
pub trait Validate {
    fn validate(&self) -> Result<(), ValidationErrors>;
}

// ─────────────────────────────────────────────────────────────────────────────
// Rules
// ─────────────────────────────────────────────────────────────────────────────

/// Character count of `value` is within `min..=max`.
pub fn length_between(value: &str, min: usize, max: usize) -> bool {
    let len = value.chars().count();
    len >= min && len <= max
}

/// Pragmatic address check: one `@`, non-empty local part, dotted domain,
/// no whitespace.
pub fn is_email(value: &str) -> bool {
    if value.chars().any(char::is_whitespace) {
        return false;
    }
    let Some((local, domain)) = value.split_once('@') else {
        return false;
    };
    if local.is_empty() || domain.contains('@') {
        return false;
    }
    match domain.rsplit_once('.') {
        Some((host, tld)) => !host.is_empty() && !host.starts_with('.') && tld.len() >= 2,
        None => false,
    }
}

/// Validates an optional display name (2 to 50 characters).
pub fn check_name(errors: &mut ValidationErrors, field: &str, value: &str) {
    if value.chars().count() < 2 {
        errors.push(field, "Name must be at least 2 characters");
    } else if !length_between(value, 2, 50) {
        errors.push(field, "Name must be at most 50 characters");
    }
}

pub fn check_email(errors: &mut ValidationErrors, field: &str, value: &str) {
    if !is_email(value) {
        errors.push(field, "Invalid email address");
    }
}
