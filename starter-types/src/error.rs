//! Error types for the starter service.

use crate::domain::OrderStatus;
use crate::validation::ValidationErrors;

/// Domain-level errors (business rule violations).
#[derive(Debug, thiserror::Error)]
pub enum DomainError {
    #[error("Amount cannot be negative")]
    NegativeAmount,

    #[error("Invalid amount")]
    InvalidAmount,

    #[error("Unsupported currency: {0}")]
    UnsupportedCurrency(String),

    #[error("Invalid order transition: {from} -> {to}")]
    InvalidTransition { from: OrderStatus, to: OrderStatus },

    #[error("Validation error: {0}")]
    ValidationError(String),
}

/// Repository-level errors (data access failures).
#[derive(Debug, thiserror::Error)]
pub enum RepoError {
    #[error(transparent)]
    Domain(#[from] DomainError),

    #[error("Database error: {0}")]
    Database(String),

    #[error("Entity not found")]
    NotFound,

    #[error("Conflict: {0}")]
    Conflict(String),
}

/// Payment gateway errors.
#[derive(Debug, thiserror::Error)]
pub enum GatewayError {
    #[error("Network error: {0}")]
    Network(String),

    #[error("Gateway API error [{status}]: {message}")]
    Api { status: u16, message: String },

    #[error("Invalid gateway response: {0}")]
    InvalidResponse(String),

    #[error("Invalid signature")]
    InvalidSignature,

    #[error("Invalid webhook payload: {0}")]
    InvalidPayload(String),
}

/// Identity provider errors.
#[derive(Debug, thiserror::Error)]
pub enum IdentityError {
    #[error("Invalid session token: {0}")]
    InvalidToken(String),

    #[error("Invalid signature")]
    InvalidSignature,

    #[error("Invalid webhook payload: {0}")]
    InvalidPayload(String),

    #[error("Not configured: {0}")]
    NotConfigured(String),

    #[error("Identity provider unavailable: {0}")]
    Unavailable(String),
}

/// Application-level errors (for HTTP responses).
///
/// Maps cleanly to HTTP status codes.
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("Bad request: {0}")]
    BadRequest(String),

    #[error("Invalid input: {0}")]
    Validation(ValidationErrors),

    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    #[error("Not found: {0}")]
    NotFound(String),

    /// Server-side failure whose message is safe to show clients.
    #[error("Upstream failure: {0}")]
    Upstream(String),

    /// Unexpected failure; the message is logged, never returned.
    #[error("Internal error: {0}")]
    Internal(String),
}

impl From<ValidationErrors> for AppError {
    fn from(errors: ValidationErrors) -> Self {
        AppError::Validation(errors)
    }
}

impl From<RepoError> for AppError {
    fn from(err: RepoError) -> Self {
        match err {
            RepoError::Domain(DomainError::ValidationError(msg)) => AppError::BadRequest(msg),
            RepoError::Domain(e) => AppError::BadRequest(e.to_string()),
            RepoError::NotFound => AppError::NotFound("Resource not found".into()),
            RepoError::Database(e) => AppError::Internal(e),
            RepoError::Conflict(e) => AppError::BadRequest(e),
        }
    }
}

impl From<IdentityError> for AppError {
    fn from(err: IdentityError) -> Self {
        match err {
            IdentityError::InvalidToken(_) => AppError::Unauthorized("Unauthorized".into()),
            IdentityError::InvalidSignature => AppError::BadRequest("Invalid signature".into()),
            IdentityError::InvalidPayload(msg) => AppError::BadRequest(msg),
            IdentityError::NotConfigured(msg) => AppError::Upstream(msg),
            IdentityError::Unavailable(_) => {
                AppError::Upstream("Identity provider unavailable".into())
            }
        }
    }
}
