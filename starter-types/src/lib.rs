//! # Starter Types
//!
//! Domain types and port traits for the starter service (identity sync,
//! orders and payment gateway integration).
//! This crate has ZERO external IO dependencies - only data structures,
//! validation rules, and trait definitions.
//!
//! ## Architecture
//!
//! This crate represents the **innermost core** of the hexagonal architecture:
//! - `domain/` - Pure domain types (User, Order, Money, webhook events)
//! - `ports/` - Trait definitions that adapters must implement
//! - `dto/` - Data Transfer Objects for API boundaries
//! - `validation/` - Field-level request validation
//! - `error/` - Domain and application error types

pub mod domain;
pub mod dto;
pub mod error;
pub mod ports;
pub mod validation;

// Re-export commonly used types
pub use domain::{
    Currency, IdentityEvent, IdentityWebhook, Money, NewOrder, NewUser, Order, OrderId,
    OrderStatus, OrderTransition, OrderUpdate, PaymentEvent, ProviderUser, Session, User,
    UserChanges, UserId,
};
pub use dto::*;
pub use error::{AppError, DomainError, GatewayError, IdentityError, RepoError};
pub use ports::{
    CreateGatewayOrder, GatewayOrder, IdentityProvider, OrderRepository, PaymentGateway, Repository,
    UserRepository,
};
pub use validation::{FieldError, Validate, ValidationErrors};
