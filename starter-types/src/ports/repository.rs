//! Repository ports.
//!
//! Adapters (Postgres, SQLite, in-memory mocks) implement both traits; the
//! service is generic over the combined [`Repository`].

use crate::domain::{NewOrder, NewUser, Order, OrderTransition, OrderUpdate, User, UserChanges};
use crate::error::RepoError;

/// Persistence of local user records.
#[async_trait::async_trait]
pub trait UserRepository: Send + Sync + 'static {
    /// Finds a user by identity-provider ID.
    async fn get_user_by_provider_id(&self, provider_id: &str)
    -> Result<Option<User>, RepoError>;

    /// Inserts the user unless one with the same provider ID exists, then
    /// returns the stored row. Concurrent callers all observe the first write.
    async fn upsert_user(&self, user: NewUser) -> Result<User, RepoError>;

    /// Applies profile changes. Returns `None` when no such user exists.
    async fn update_user(
        &self,
        provider_id: &str,
        changes: UserChanges,
    ) -> Result<Option<User>, RepoError>;
}

/// Persistence of payment orders.
#[async_trait::async_trait]
pub trait OrderRepository: Send + Sync + 'static {
    /// Records a new pending order. A duplicate gateway order ID is a
    /// [`RepoError::Conflict`].
    async fn create_order(&self, order: NewOrder) -> Result<Order, RepoError>;

    async fn get_order_by_gateway_id(
        &self,
        gateway_order_id: &str,
    ) -> Result<Option<Order>, RepoError>;

    /// Settles a pending order.
    ///
    /// MUST be a single conditional write (`... AND status = 'pending'`):
    /// an order that is already settled is returned untouched as
    /// [`OrderTransition::AlreadySettled`]. Unknown orders are
    /// [`RepoError::NotFound`].
    async fn transition_order(
        &self,
        gateway_order_id: &str,
        update: OrderUpdate,
    ) -> Result<OrderTransition, RepoError>;
}

/// Everything the application service needs from storage.
pub trait Repository: UserRepository + OrderRepository {}

impl<T> Repository for T where T: UserRepository + OrderRepository {}
