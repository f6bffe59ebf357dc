//! # Starter Client SDK
//!
//! A typed Rust client for the starter API. Requests carry the identity
//! provider's session token as a bearer token.

use reqwest::{Client, Method};
use serde::{Serialize, de::DeserializeOwned};

use starter_types::{
    CreateOrderRequest, CreateOrderResponse, Currency, ExampleFormRequest, ExampleFormResponse,
    SuccessResponse, UpdateUserRequest, User, VerifyPaymentRequest,
};

/// Error type for client operations.
#[derive(Debug, thiserror::Error)]
pub enum ClientError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("API error: {status} - {message}")]
    Api { status: u16, message: String },

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Starter API client.
pub struct StarterClient {
    base_url: String,
    session_token: Option<String>,
    http: Client,
}

impl StarterClient {
    /// Creates a new client.
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            session_token: None,
            http: Client::new(),
        }
    }

    /// Sets the session token sent as `Authorization: Bearer <token>`.
    pub fn with_session_token(mut self, token: impl Into<String>) -> Self {
        self.session_token = Some(token.into());
        self
    }

    /// Checks if the API is healthy.
    pub async fn health(&self) -> Result<bool, ClientError> {
        let resp = self
            .http
            .get(format!("{}/health", self.base_url))
            .send()
            .await?;
        Ok(resp.status().is_success())
    }

    /// Fetches the current user, creating it server-side on first call.
    pub async fn get_user(&self) -> Result<User, ClientError> {
        self.send::<User, ()>(Method::GET, "/api/user", None).await
    }

    pub async fn update_user(&self, changes: &UpdateUserRequest) -> Result<User, ClientError> {
        self.send(Method::PATCH, "/api/user", Some(changes)).await
    }

    /// Creates a gateway order for `amount` major units.
    pub async fn create_order(
        &self,
        amount: f64,
        currency: Option<Currency>,
    ) -> Result<CreateOrderResponse, ClientError> {
        let req = CreateOrderRequest {
            amount: Some(amount),
            currency,
        };
        self.send(Method::POST, "/api/payment/create-order", Some(&req))
            .await
    }

    /// Submits the checkout callback fields for server-side verification.
    pub async fn verify_payment(
        &self,
        req: &VerifyPaymentRequest,
    ) -> Result<SuccessResponse, ClientError> {
        self.send(Method::POST, "/api/payment/verify", Some(req))
            .await
    }

    pub async fn submit_example_form(
        &self,
        form: &ExampleFormRequest,
    ) -> Result<ExampleFormResponse, ClientError> {
        self.send(Method::POST, "/api/example-form", Some(form))
            .await
    }

    async fn send<T: DeserializeOwned, B: Serialize>(
        &self,
        method: Method,
        path: &str,
        body: Option<&B>,
    ) -> Result<T, ClientError> {
        let mut req = self
            .http
            .request(method, format!("{}{}", self.base_url, path));
        if let Some(token) = &self.session_token {
            req = req.bearer_auth(token);
        }
        if let Some(body) = body {
            req = req.json(body);
        }
        let resp = req.send().await?;
        self.handle_response(resp).await
    }

    async fn handle_response<T: DeserializeOwned>(
        &self,
        resp: reqwest::Response,
    ) -> Result<T, ClientError> {
        let status = resp.status();
        if status.is_success() {
            let body = resp.text().await?;
            Ok(serde_json::from_str(&body)?)
        } else {
            let body = resp.text().await.unwrap_or_default();
            let message = serde_json::from_str::<serde_json::Value>(&body)
                .ok()
                .and_then(|v| v.get("error").and_then(|e| e.as_str()).map(String::from))
                .unwrap_or(body);
            Err(ClientError::Api {
                status: status.as_u16(),
                message,
            })
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use wiremock::matchers::{body_json, header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn user_json() -> serde_json::Value {
        json!({
            "id": "6f1c2a8e-0f55-4c77-9d1e-3c1b8a0f9e21",
            "providerId": "user_1",
            "email": "ada@example.com",
            "name": "Ada Lovelace",
            "createdAt": "2024-01-01T00:00:00Z",
            "updatedAt": "2024-01-01T00:00:00Z"
        })
    }

    #[test]
    fn test_client_creation() {
        let client = StarterClient::new("http://localhost:3000");
        assert_eq!(client.base_url, "http://localhost:3000");
    }

    #[test]
    fn test_client_with_trailing_slash() {
        let client = StarterClient::new("http://localhost:3000/");
        assert_eq!(client.base_url, "http://localhost:3000");
    }

    #[test]
    fn test_client_with_session_token() {
        let client = StarterClient::new("http://localhost:3000").with_session_token("tok");
        assert_eq!(client.session_token, Some("tok".to_string()));
    }

    #[tokio::test]
    async fn test_get_user_sends_bearer_token() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/user"))
            .and(header("authorization", "Bearer tok"))
            .respond_with(ResponseTemplate::new(200).set_body_json(user_json()))
            .expect(1)
            .mount(&server)
            .await;

        let client = StarterClient::new(server.uri()).with_session_token("tok");
        let user = client.get_user().await.unwrap();

        assert_eq!(user.provider_id, "user_1");
        assert_eq!(user.name.as_deref(), Some("Ada Lovelace"));
    }

    #[tokio::test]
    async fn test_create_order_posts_amount() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/api/payment/create-order"))
            .and(body_json(json!({"amount": 100.0})))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "orderId": "order_ABC",
                "amount": 10000,
                "currency": "INR",
                "keyId": "rzp_test_key"
            })))
            .mount(&server)
            .await;

        let client = StarterClient::new(server.uri()).with_session_token("tok");
        let order = client.create_order(100.0, None).await.unwrap();

        assert_eq!(order.order_id, "order_ABC");
        assert_eq!(order.amount, 10000);
        assert_eq!(order.key_id, "rzp_test_key");
    }

    #[tokio::test]
    async fn test_api_error_carries_server_message() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/api/payment/verify"))
            .respond_with(ResponseTemplate::new(400).set_body_json(json!({
                "error": "Invalid signature",
                "code": 400
            })))
            .mount(&server)
            .await;

        let client = StarterClient::new(server.uri()).with_session_token("tok");
        let err = client
            .verify_payment(&VerifyPaymentRequest {
                razorpay_order_id: "order_1".into(),
                razorpay_payment_id: "pay_1".into(),
                razorpay_signature: "bad".into(),
            })
            .await
            .unwrap_err();

        let ClientError::Api { status, message } = err else {
            panic!("expected api error");
        };
        assert_eq!(status, 400);
        assert_eq!(message, "Invalid signature");
    }

    #[tokio::test]
    async fn test_non_json_error_body_used_verbatim() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/user"))
            .respond_with(ResponseTemplate::new(502).set_body_string("Bad Gateway"))
            .mount(&server)
            .await;

        let client = StarterClient::new(server.uri());
        let err = client.get_user().await.unwrap_err();

        assert!(matches!(
            err,
            ClientError::Api { status: 502, ref message } if message == "Bad Gateway"
        ));
    }

    #[tokio::test]
    async fn test_health() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/health"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"status": "ok"})))
            .mount(&server)
            .await;

        assert!(StarterClient::new(server.uri()).health().await.unwrap());
    }
}
