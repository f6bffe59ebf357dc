//! Identity-provider facing types.

use serde::{Deserialize, Serialize};

use super::user::NewUser;

/// Verified claims of a provider-issued session token.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Session {
    /// Provider user ID (`sub`)
    pub provider_id: String,
    /// Provider session ID (`sid`), when present
    pub session_id: Option<String>,
}

impl Session {
    pub fn new(provider_id: impl Into<String>) -> Self {
        Self {
            provider_id: provider_id.into(),
            session_id: None,
        }
    }
}

/// A user profile as known by the identity provider.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProviderUser {
    pub id: String,
    /// Primary email address, if the provider marked one
    pub primary_email: Option<String>,
    /// Every address on the account, in provider order
    pub emails: Vec<String>,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
}

impl ProviderUser {
    /// `"<first> <last>"` trimmed; `None` when both are blank.
    pub fn full_name(&self) -> Option<String> {
        let full = format!(
            "{} {}",
            self.first_name.as_deref().unwrap_or(""),
            self.last_name.as_deref().unwrap_or("")
        );
        let trimmed = full.trim();
        if trimmed.is_empty() {
            None
        } else {
            Some(trimmed.to_string())
        }
    }

    /// Primary address, falling back to the first address on the account.
    pub fn best_email(&self) -> Option<&str> {
        self.primary_email
            .as_deref()
            .or_else(|| self.emails.first().map(String::as_str))
    }

    /// Builds the local user record for this profile with the given email.
    pub fn to_new_user(&self, email: impl Into<String>) -> NewUser {
        NewUser {
            provider_id: self.id.clone(),
            email: email.into(),
            name: self.full_name(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn profile(first: Option<&str>, last: Option<&str>) -> ProviderUser {
        ProviderUser {
            id: "user_1".to_string(),
            primary_email: None,
            emails: vec!["first@example.com".to_string()],
            first_name: first.map(String::from),
            last_name: last.map(String::from),
        }
    }

    #[test]
    fn test_full_name_joins_and_trims() {
        assert_eq!(
            profile(Some("Ada"), Some("Lovelace")).full_name().as_deref(),
            Some("Ada Lovelace")
        );
        assert_eq!(profile(Some("Ada"), None).full_name().as_deref(), Some("Ada"));
        assert_eq!(profile(None, None).full_name(), None);
        assert_eq!(profile(Some("  "), Some("")).full_name(), None);
    }

    #[test]
    fn test_best_email_prefers_primary() {
        let mut user = profile(None, None);
        assert_eq!(user.best_email(), Some("first@example.com"));

        user.primary_email = Some("primary@example.com".to_string());
        assert_eq!(user.best_email(), Some("primary@example.com"));

        user.primary_email = None;
        user.emails.clear();
        assert_eq!(user.best_email(), None);
    }
}
