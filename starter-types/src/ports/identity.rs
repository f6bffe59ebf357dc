//! Identity provider port.

use crate::domain::{IdentityEvent, IdentityWebhook, ProviderUser, Session};
use crate::error::IdentityError;

/// Port trait for the hosted identity provider.
#[async_trait::async_trait]
pub trait IdentityProvider: Send + Sync {
    /// Verifies a bearer session token.
    async fn verify_session(&self, token: &str) -> Result<Session, IdentityError>;

    /// Looks up a profile on the provider's backend API.
    /// `Ok(None)` means the provider does not know the user.
    async fn fetch_user(&self, provider_id: &str) -> Result<Option<ProviderUser>, IdentityError>;

    /// Authenticates and decodes a webhook delivery.
    fn parse_webhook(
        &self,
        headers: &IdentityWebhook,
        body: &[u8],
    ) -> Result<IdentityEvent, IdentityError>;
}
