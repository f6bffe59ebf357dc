//! Domain models for the starter service.

pub mod events;
pub mod identity;
pub mod money;
pub mod order;
pub mod user;

pub use events::{IdentityEvent, IdentityWebhook, PaymentEvent};
pub use identity::{ProviderUser, Session};
pub use money::{Currency, Money};
pub use order::{NewOrder, Order, OrderId, OrderStatus, OrderTransition, OrderUpdate};
pub use user::{NewUser, User, UserChanges, UserId};
