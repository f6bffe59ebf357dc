//! Payment gateway port.

use serde::{Deserialize, Serialize};

use crate::domain::{Currency, PaymentEvent};
use crate::error::GatewayError;

/// Order creation request sent to the gateway.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CreateGatewayOrder {
    /// Minor units
    pub amount: i64,
    pub currency: Currency,
    pub receipt: String,
}

/// Order as acknowledged by the gateway.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct GatewayOrder {
    pub id: String,
    pub amount: i64,
    pub currency: Currency,
}

/// Port trait for the hosted payment gateway.
#[async_trait::async_trait]
pub trait PaymentGateway: Send + Sync {
    /// Creates an order at the gateway. Exactly one outbound call, no retry.
    async fn create_order(&self, req: CreateGatewayOrder) -> Result<GatewayOrder, GatewayError>;

    /// Public key identifier handed to the checkout widget.
    fn key_id(&self) -> &str;

    /// Checks the checkout callback signature over `"<order_id>|<payment_id>"`.
    fn verify_payment_signature(&self, order_id: &str, payment_id: &str, signature: &str)
    -> bool;

    /// Authenticates and decodes a webhook delivery.
    fn parse_webhook(&self, body: &[u8], signature: &str) -> Result<PaymentEvent, GatewayError>;
}
