//! Order domain model.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use super::money::Money;
use super::user::UserId;
use crate::error::DomainError;

/// Unique identifier for an Order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[serde(transparent)]
pub struct OrderId(Uuid);

impl OrderId {
    /// Creates a new random OrderId.
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    /// Creates an OrderId from an existing UUID.
    pub fn from_uuid(uuid: Uuid) -> Self {
        Self(uuid)
    }

    /// Returns the UUID value.
    pub fn into_uuid(self) -> Uuid {
        self.0
    }
}

impl Default for OrderId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for OrderId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Payment status of an order.
///
/// An order leaves `Pending` exactly once; `Completed` and `Failed` are final.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema, Default)]
#[serde(rename_all = "lowercase")]
pub enum OrderStatus {
    #[default]
    Pending,
    Completed,
    Failed,
}

impl OrderStatus {
    pub fn is_settled(&self) -> bool {
        !matches!(self, OrderStatus::Pending)
    }
}

impl AsRef<str> for OrderStatus {
    fn as_ref(&self) -> &str {
        match self {
            Self::Pending => "pending",
            Self::Completed => "completed",
            Self::Failed => "failed",
        }
    }
}

impl std::fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_ref())
    }
}

impl std::str::FromStr for OrderStatus {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pending" => Ok(Self::Pending),
            "completed" => Ok(Self::Completed),
            "failed" => Ok(Self::Failed),
            other => Err(DomainError::ValidationError(format!(
                "Unknown order status: {}",
                other
            ))),
        }
    }
}

/// A payment order tracked against a gateway order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Order {
    pub id: OrderId,
    /// Owning user
    pub user_id: UserId,
    /// Order identifier at the payment gateway (unique)
    pub gateway_order_id: String,
    /// Amount in minor units plus currency
    pub amount: Money,
    pub status: OrderStatus,
    pub gateway_payment_id: Option<String>,
    pub gateway_signature: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Order {
    /// Creates a new pending order.
    pub fn pending(new: NewOrder) -> Self {
        let now = Utc::now();
        Self {
            id: OrderId::new(),
            user_id: new.user_id,
            gateway_order_id: new.gateway_order_id,
            amount: new.amount,
            status: OrderStatus::Pending,
            gateway_payment_id: None,
            gateway_signature: None,
            created_at: now,
            updated_at: now,
        }
    }

    /// Moves a pending order to a settled state.
    ///
    /// Returns `false` (and changes nothing) if the order was already settled.
    pub fn settle(&mut self, update: OrderUpdate) -> Result<bool, DomainError> {
        if !update.status.is_settled() {
            return Err(DomainError::InvalidTransition {
                from: self.status,
                to: update.status,
            });
        }
        if self.status.is_settled() {
            return Ok(false);
        }

        self.status = update.status;
        if update.payment_id.is_some() {
            self.gateway_payment_id = update.payment_id;
        }
        if update.signature.is_some() {
            self.gateway_signature = update.signature;
        }
        self.updated_at = Utc::now();
        Ok(true)
    }
}

/// Data needed to record a freshly created gateway order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewOrder {
    pub user_id: UserId,
    pub gateway_order_id: String,
    pub amount: Money,
}

/// A settlement written by either the verification call or a webhook.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OrderUpdate {
    pub status: OrderStatus,
    pub payment_id: Option<String>,
    pub signature: Option<String>,
}

impl OrderUpdate {
    pub fn completed(payment_id: impl Into<String>, signature: Option<String>) -> Self {
        Self {
            status: OrderStatus::Completed,
            payment_id: Some(payment_id.into()),
            signature,
        }
    }

    pub fn failed(payment_id: impl Into<String>) -> Self {
        Self {
            status: OrderStatus::Failed,
            payment_id: Some(payment_id.into()),
            signature: None,
        }
    }
}

/// Result of a conditional settlement.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OrderTransition {
    /// The order was pending and has been settled by this write.
    Applied(Order),
    /// The order had already been settled; nothing was written.
    AlreadySettled(Order),
}
