//! Razorpay payment gateway adapter.
//!
//! Implements the `PaymentGateway` port: order creation over the REST API,
//! checkout signature verification and webhook authentication.

use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use tracing::{debug, error, info, instrument};

use starter_types::{CreateGatewayOrder, GatewayError, GatewayOrder, PaymentEvent, PaymentGateway};

use crate::security;

pub const DEFAULT_API_BASE_URL: &str = "https://api.razorpay.com";

/// Razorpay credentials and endpoint.
#[derive(Debug, Clone)]
pub struct RazorpayConfig {
    /// Public key ID (rzp_test_... or rzp_live_...)
    pub key_id: String,
    pub key_secret: String,
    /// Secret configured on the dashboard for webhook deliveries
    pub webhook_secret: String,
    /// API base URL (overridable for tests)
    pub api_base_url: String,
}

impl RazorpayConfig {
    pub fn new(
        key_id: impl Into<String>,
        key_secret: impl Into<String>,
        webhook_secret: impl Into<String>,
    ) -> Self {
        Self {
            key_id: key_id.into(),
            key_secret: key_secret.into(),
            webhook_secret: webhook_secret.into(),
            api_base_url: DEFAULT_API_BASE_URL.to_string(),
        }
    }

    pub fn with_api_base_url(mut self, url: impl Into<String>) -> Self {
        self.api_base_url = url.into().trim_end_matches('/').to_string();
        self
    }
}

/// Razorpay gateway client.
pub struct RazorpayGateway {
    config: RazorpayConfig,
    client: Client,
}

impl RazorpayGateway {
    pub fn new(config: RazorpayConfig) -> Result<Self, GatewayError> {
        let client = Client::builder()
            .timeout(std::time::Duration::from_secs(30))
            .build()
            .map_err(|e| GatewayError::Network(e.to_string()))?;

        Ok(Self { config, client })
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Wire types
// ─────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
struct RazorpayErrorResponse {
    error: RazorpayErrorBody,
}

#[derive(Debug, Deserialize)]
struct RazorpayErrorBody {
    #[serde(default)]
    description: String,
}

#[derive(Debug, Deserialize)]
struct WebhookEnvelope {
    event: String,
    #[serde(default)]
    payload: Option<WebhookPayload>,
}

#[derive(Debug, Deserialize)]
struct WebhookPayload {
    payment: Option<PaymentWrapper>,
}

#[derive(Debug, Deserialize)]
struct PaymentWrapper {
    entity: PaymentEntity,
}

#[derive(Debug, Deserialize)]
struct PaymentEntity {
    id: String,
    order_id: Option<String>,
}

impl WebhookEnvelope {
    fn payment(self) -> Result<(String, String), GatewayError> {
        let entity = self
            .payload
            .and_then(|p| p.payment)
            .map(|p| p.entity)
            .ok_or_else(|| GatewayError::InvalidPayload("missing payment entity".into()))?;
        let order_id = entity
            .order_id
            .ok_or_else(|| GatewayError::InvalidPayload("payment has no order_id".into()))?;
        Ok((order_id, entity.id))
    }
}

/// Decodes an already-authenticated webhook body.
pub fn decode_webhook(body: &[u8]) -> Result<PaymentEvent, GatewayError> {
    let envelope: WebhookEnvelope =
        serde_json::from_slice(body).map_err(|e| GatewayError::InvalidPayload(e.to_string()))?;

    match envelope.event.as_str() {
        "payment.captured" => {
            let (gateway_order_id, payment_id) = envelope.payment()?;
            Ok(PaymentEvent::Captured {
                gateway_order_id,
                payment_id,
            })
        }
        "payment.failed" => {
            let (gateway_order_id, payment_id) = envelope.payment()?;
            Ok(PaymentEvent::Failed {
                gateway_order_id,
                payment_id,
            })
        }
        _ => Ok(PaymentEvent::Other(envelope.event)),
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Port implementation
// ─────────────────────────────────────────────────────────────────────────────

#[async_trait]
impl PaymentGateway for RazorpayGateway {
    #[instrument(skip(self, req), fields(amount = req.amount, currency = %req.currency, receipt = %req.receipt))]
    async fn create_order(&self, req: CreateGatewayOrder) -> Result<GatewayOrder, GatewayError> {
        let url = format!("{}/v1/orders", self.config.api_base_url);
        debug!("Creating gateway order");

        let response = self
            .client
            .post(&url)
            .basic_auth(&self.config.key_id, Some(&self.config.key_secret))
            .json(&req)
            .send()
            .await
            .map_err(|e| GatewayError::Network(e.to_string()))?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| GatewayError::Network(e.to_string()))?;

        if !status.is_success() {
            error!("Razorpay API error: status={}, body={}", status, body);

            let message = serde_json::from_str::<RazorpayErrorResponse>(&body)
                .map(|e| e.error.description)
                .unwrap_or(body);

            return Err(GatewayError::Api {
                status: status.as_u16(),
                message,
            });
        }

        let order: GatewayOrder = serde_json::from_str(&body).map_err(|e| {
            GatewayError::InvalidResponse(format!("Failed to parse Razorpay order: {}", e))
        })?;

        info!(gateway_order_id = %order.id, "Created gateway order");
        Ok(order)
    }

    fn key_id(&self) -> &str {
        &self.config.key_id
    }

    fn verify_payment_signature(&self, order_id: &str, payment_id: &str, signature: &str) -> bool {
        security::verify_payment_signature(order_id, payment_id, signature, &self.config.key_secret)
    }

    fn parse_webhook(&self, body: &[u8], signature: &str) -> Result<PaymentEvent, GatewayError> {
        if !security::verify_hmac_hex(body, signature, &self.config.webhook_secret) {
            return Err(GatewayError::InvalidSignature);
        }
        decode_webhook(body)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use starter_types::Currency;
    use wiremock::matchers::{body_json, header_exists, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn gateway(base_url: &str) -> RazorpayGateway {
        let config = RazorpayConfig::new("rzp_test_key", "key_secret", "hook_secret")
            .with_api_base_url(base_url);
        RazorpayGateway::new(config).unwrap()
    }

    #[tokio::test]
    async fn test_create_order_posts_amount_and_receipt() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/v1/orders"))
            .and(header_exists("authorization"))
            .and(body_json(json!({
                "amount": 10000,
                "currency": "INR",
                "receipt": "order_1700000000000"
            })))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "id": "order_ABC",
                "entity": "order",
                "amount": 10000,
                "currency": "INR",
                "receipt": "order_1700000000000",
                "status": "created"
            })))
            .expect(1)
            .mount(&server)
            .await;

        let order = gateway(&server.uri())
            .create_order(CreateGatewayOrder {
                amount: 10000,
                currency: Currency::INR,
                receipt: "order_1700000000000".into(),
            })
            .await
            .unwrap();

        assert_eq!(order.id, "order_ABC");
        assert_eq!(order.amount, 10000);
        assert_eq!(order.currency, Currency::INR);
    }

    #[tokio::test]
    async fn test_create_order_maps_api_error() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/v1/orders"))
            .respond_with(ResponseTemplate::new(401).set_body_json(json!({
                "error": {
                    "code": "BAD_REQUEST_ERROR",
                    "description": "Authentication failed"
                }
            })))
            .mount(&server)
            .await;

        let err = gateway(&server.uri())
            .create_order(CreateGatewayOrder {
                amount: 100,
                currency: Currency::INR,
                receipt: "order_1".into(),
            })
            .await
            .unwrap_err();

        match err {
            GatewayError::Api { status, message } => {
                assert_eq!(status, 401);
                assert_eq!(message, "Authentication failed");
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_parse_webhook_captured() {
        let gw = gateway(DEFAULT_API_BASE_URL);
        let body = json!({
            "event": "payment.captured",
            "payload": {"payment": {"entity": {"id": "pay_1", "order_id": "order_1"}}}
        })
        .to_string();
        let signature = security::sign_hmac_hex(body.as_bytes(), "hook_secret");

        let event = gw.parse_webhook(body.as_bytes(), &signature).unwrap();
        assert_eq!(
            event,
            PaymentEvent::Captured {
                gateway_order_id: "order_1".into(),
                payment_id: "pay_1".into()
            }
        );
    }

    #[test]
    fn test_parse_webhook_rejects_bad_signature() {
        let gw = gateway(DEFAULT_API_BASE_URL);
        let body = br#"{"event":"payment.captured"}"#;
        let signature = security::sign_hmac_hex(body, "other_secret");

        assert!(matches!(
            gw.parse_webhook(body, &signature),
            Err(GatewayError::InvalidSignature)
        ));
    }

    #[test]
    fn test_decode_webhook_other_and_malformed() {
        assert_eq!(
            decode_webhook(br#"{"event":"order.paid","payload":{}}"#).unwrap(),
            PaymentEvent::Other("order.paid".into())
        );
        assert!(matches!(
            decode_webhook(b"not json"),
            Err(GatewayError::InvalidPayload(_))
        ));
        assert!(matches!(
            decode_webhook(br#"{"event":"payment.failed","payload":{}}"#),
            Err(GatewayError::InvalidPayload(_))
        ));
    }

    #[test]
    fn test_verify_payment_signature_uses_key_secret() {
        let gw = gateway(DEFAULT_API_BASE_URL);
        let sig = security::payment_signature("order_1", "pay_1", "key_secret");
        assert!(gw.verify_payment_signature("order_1", "pay_1", &sig));
        assert!(!gw.verify_payment_signature("order_1", "pay_1", "deadbeef"));
    }
}
