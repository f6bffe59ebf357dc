//! Inbound webhook events, already verified and decoded by an adapter.

use super::identity::ProviderUser;

/// Payment gateway event relevant to order reconciliation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PaymentEvent {
    /// Payment captured for a gateway order.
    Captured {
        gateway_order_id: String,
        payment_id: String,
    },
    /// Payment attempt failed for a gateway order.
    Failed {
        gateway_order_id: String,
        payment_id: String,
    },
    /// Any other event type; acknowledged and ignored.
    Other(String),
}

impl PaymentEvent {
    pub fn name(&self) -> &str {
        match self {
            Self::Captured { .. } => "payment.captured",
            Self::Failed { .. } => "payment.failed",
            Self::Other(name) => name,
        }
    }
}

/// Identity provider event.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum IdentityEvent {
    UserCreated(ProviderUser),
    UserUpdated { id: String },
    UserDeleted { id: String },
    Other(String),
}

/// Signature metadata delivered alongside an identity webhook body.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IdentityWebhook {
    pub message_id: String,
    pub timestamp: String,
    pub signature: String,
}
