//! User domain model.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

/// Unique identifier for a User.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[serde(transparent)]
pub struct UserId(Uuid);

impl UserId {
    /// Creates a new random UserId.
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    /// Creates a UserId from an existing UUID.
    pub fn from_uuid(uuid: Uuid) -> Self {
        Self(uuid)
    }

    /// Returns the UUID value.
    pub fn into_uuid(self) -> Uuid {
        self.0
    }
}

impl Default for UserId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for UserId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl std::str::FromStr for UserId {
    type Err = uuid::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self(Uuid::parse_str(s)?))
    }
}

/// A local user record mirroring an identity-provider account.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct User {
    /// Internal identifier
    pub id: UserId,
    /// Identifier issued by the identity provider (unique)
    #[schema(example = "user_2abcDEF")]
    pub provider_id: String,
    #[schema(example = "ada@example.com")]
    pub email: String,
    /// Optional display name
    pub name: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl User {
    /// Builds a fresh user row from provider data.
    pub fn create(new: NewUser) -> Self {
        let now = Utc::now();
        Self {
            id: UserId::new(),
            provider_id: new.provider_id,
            email: new.email,
            name: new.name,
            created_at: now,
            updated_at: now,
        }
    }

    /// Applies a profile update in place.
    pub fn apply(&mut self, changes: UserChanges) {
        if let Some(name) = changes.name {
            self.name = Some(name);
        }
        if let Some(email) = changes.email {
            self.email = email;
        }
        self.updated_at = Utc::now();
    }
}

/// Data needed to create a user.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewUser {
    pub provider_id: String,
    pub email: String,
    pub name: Option<String>,
}

/// Profile fields a user may change. `None` leaves the field untouched.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UserChanges {
    pub name: Option<String>,
    pub email: Option<String>,
}

impl UserChanges {
    pub fn is_empty(&self) -> bool {
        self.name.is_none() && self.email.is_none()
    }
}
