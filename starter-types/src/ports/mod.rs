//! Port traits (interfaces for adapters).
//!
//! The application service depends on these traits, never on the SQL,
//! payment gateway or identity provider adapters directly.

mod gateway;
mod identity;
mod repository;

pub use gateway::{CreateGatewayOrder, GatewayOrder, PaymentGateway};
pub use identity::IdentityProvider;
pub use repository::{OrderRepository, Repository, UserRepository};
