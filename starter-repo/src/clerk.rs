//! Clerk identity provider adapter.
//!
//! Verifies session JWTs locally with the instance's public key, reads user
//! profiles from the backend API and authenticates Svix-signed webhooks.

use async_trait::async_trait;
use jsonwebtoken::{Algorithm, DecodingKey, Validation, decode};
use reqwest::{Client, StatusCode, Url};
use serde::Deserialize;
use tracing::{debug, instrument, warn};

use starter_types::{
    IdentityError, IdentityEvent, IdentityProvider, IdentityWebhook, ProviderUser, Session,
};

use crate::security;

pub const DEFAULT_API_BASE_URL: &str = "https://api.clerk.com";

/// Clerk credentials and endpoint.
#[derive(Debug, Clone)]
pub struct ClerkConfig {
    /// Backend API secret key (sk_test_... or sk_live_...)
    pub secret_key: String,
    /// Svix signing secret (whsec_...); webhooks are refused without it
    pub webhook_secret: Option<String>,
    pub api_base_url: String,
}

impl ClerkConfig {
    pub fn new(secret_key: impl Into<String>, webhook_secret: Option<String>) -> Self {
        Self {
            secret_key: secret_key.into(),
            webhook_secret,
            api_base_url: DEFAULT_API_BASE_URL.to_string(),
        }
    }

    pub fn with_api_base_url(mut self, url: impl Into<String>) -> Self {
        self.api_base_url = url.into().trim_end_matches('/').to_string();
        self
    }
}

/// Clerk identity provider client.
pub struct ClerkIdentity {
    config: ClerkConfig,
    key: DecodingKey,
    validation: Validation,
    client: Client,
}

impl ClerkIdentity {
    /// Builds the adapter from the instance's PEM-encoded RS256 public key.
    pub fn new(config: ClerkConfig, jwt_public_key_pem: &str) -> Result<Self, IdentityError> {
        let key = DecodingKey::from_rsa_pem(jwt_public_key_pem.as_bytes())
            .map_err(|e| IdentityError::NotConfigured(format!("invalid JWT public key: {}", e)))?;
        Self::with_key(config, key, Algorithm::RS256)
    }

    /// Builds the adapter with an explicit verification key and algorithm.
    pub fn with_key(
        config: ClerkConfig,
        key: DecodingKey,
        algorithm: Algorithm,
    ) -> Result<Self, IdentityError> {
        let client = Client::builder()
            .timeout(std::time::Duration::from_secs(30))
            .build()
            .map_err(|e| IdentityError::Unavailable(e.to_string()))?;

        let mut validation = Validation::new(algorithm);
        validation.validate_nbf = true;

        Ok(Self {
            config,
            key,
            validation,
            client,
        })
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Wire types
// ─────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
struct SessionClaims {
    sub: String,
    #[serde(default)]
    sid: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ClerkEmailAddress {
    id: String,
    email_address: String,
}

/// User object as returned by the backend API and carried in webhooks.
#[derive(Debug, Deserialize)]
struct ClerkUser {
    id: String,
    #[serde(default)]
    email_addresses: Vec<ClerkEmailAddress>,
    #[serde(default)]
    primary_email_address_id: Option<String>,
    #[serde(default)]
    first_name: Option<String>,
    #[serde(default)]
    last_name: Option<String>,
}

impl From<ClerkUser> for ProviderUser {
    fn from(user: ClerkUser) -> Self {
        let primary_email = user.primary_email_address_id.as_deref().and_then(|primary| {
            user.email_addresses
                .iter()
                .find(|e| e.id == primary)
                .map(|e| e.email_address.clone())
        });

        ProviderUser {
            id: user.id,
            primary_email,
            emails: user
                .email_addresses
                .into_iter()
                .map(|e| e.email_address)
                .collect(),
            first_name: user.first_name,
            last_name: user.last_name,
        }
    }
}

#[derive(Debug, Deserialize)]
struct WebhookEnvelope {
    #[serde(rename = "type")]
    event_type: String,
    #[serde(default)]
    data: serde_json::Value,
}

fn data_id(data: &serde_json::Value) -> String {
    data.get("id")
        .and_then(|v| v.as_str())
        .unwrap_or_default()
        .to_string()
}

/// Decodes an already-authenticated webhook body.
pub fn decode_webhook(body: &[u8]) -> Result<IdentityEvent, IdentityError> {
    let envelope: WebhookEnvelope =
        serde_json::from_slice(body).map_err(|e| IdentityError::InvalidPayload(e.to_string()))?;

    match envelope.event_type.as_str() {
        "user.created" => {
            let user: ClerkUser = serde_json::from_value(envelope.data)
                .map_err(|e| IdentityError::InvalidPayload(e.to_string()))?;
            Ok(IdentityEvent::UserCreated(user.into()))
        }
        "user.updated" => Ok(IdentityEvent::UserUpdated {
            id: data_id(&envelope.data),
        }),
        "user.deleted" => Ok(IdentityEvent::UserDeleted {
            id: data_id(&envelope.data),
        }),
        _ => Ok(IdentityEvent::Other(envelope.event_type)),
    }
}

/// `{base}/v1/users/{provider_id}` with the id as a single encoded path segment.
fn user_url(base: &str, provider_id: &str) -> Result<Url, IdentityError> {
    let mut url = Url::parse(base)
        .map_err(|e| IdentityError::NotConfigured(format!("invalid API base URL: {}", e)))?;
    url.path_segments_mut()
        .map_err(|_| IdentityError::NotConfigured("API base URL cannot have a path".into()))?
        .pop_if_empty()
        .extend(["v1", "users", provider_id]);
    Ok(url)
}

// ─────────────────────────────────────────────────────────────────────────────
// Port implementation
// ─────────────────────────────────────────────────────────────────────────────

#[async_trait]
impl IdentityProvider for ClerkIdentity {
    async fn verify_session(&self, token: &str) -> Result<Session, IdentityError> {
        let data = decode::<SessionClaims>(token, &self.key, &self.validation)
            .map_err(|e| IdentityError::InvalidToken(e.to_string()))?;

        Ok(Session {
            provider_id: data.claims.sub,
            session_id: data.claims.sid,
        })
    }

    #[instrument(skip(self))]
    async fn fetch_user(&self, provider_id: &str) -> Result<Option<ProviderUser>, IdentityError> {
        let url = user_url(&self.config.api_base_url, provider_id)?;

        let response = self
            .client
            .get(url)
            .bearer_auth(&self.config.secret_key)
            .send()
            .await
            .map_err(|e| IdentityError::Unavailable(e.to_string()))?;

        let status = response.status();
        if status == StatusCode::NOT_FOUND {
            debug!("User unknown to identity provider");
            return Ok(None);
        }
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            warn!("Clerk API error: status={}, body={}", status, body);
            return Err(IdentityError::Unavailable(format!("HTTP {}", status)));
        }

        let user: ClerkUser = response
            .json()
            .await
            .map_err(|e| IdentityError::Unavailable(format!("Failed to parse user: {}", e)))?;

        Ok(Some(user.into()))
    }

    fn parse_webhook(
        &self,
        headers: &IdentityWebhook,
        body: &[u8],
    ) -> Result<IdentityEvent, IdentityError> {
        let secret = self
            .config
            .webhook_secret
            .as_deref()
            .ok_or_else(|| IdentityError::NotConfigured("Webhook secret not configured".into()))?;

        security::verify_svix(
            secret,
            &headers.message_id,
            &headers.timestamp,
            &headers.signature,
            body,
            chrono::Utc::now().timestamp(),
        )
        .map_err(|e| {
            warn!(reason = %e, "Rejected identity webhook");
            IdentityError::InvalidSignature
        })?;

        decode_webhook(body)
    }
}
