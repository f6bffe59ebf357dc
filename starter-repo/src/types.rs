//! Database row types shared by the SQLite and PostgreSQL adapters.
//!
//! Columns decode straight into `Uuid` / `DateTime<Utc>` on both backends, so
//! one row struct serves either feature (or both at once).

use chrono::{DateTime, Utc};
use sqlx::FromRow;
use uuid::Uuid;

use starter_types::{
    Currency, DomainError, Money, Order, OrderId, OrderStatus, OrderUpdate, RepoError, User, UserId,
};

// ─────────────────────────────────────────────────────────────────────────────
// Database row structs
// ─────────────────────────────────────────────────────────────────────────────

/// User row from database.
#[derive(FromRow)]
pub struct DbUser {
    pub id: Uuid,
    pub provider_id: String,
    pub email: String,
    pub name: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Order row from database.
#[derive(FromRow)]
pub struct DbOrder {
    pub id: Uuid,
    pub user_id: Uuid,
    pub gateway_order_id: String,
    pub amount: i64,
    pub currency: String,
    pub status: String,
    pub gateway_payment_id: Option<String>,
    pub gateway_signature: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

// ─────────────────────────────────────────────────────────────────────────────
// Parsing helpers
// ─────────────────────────────────────────────────────────────────────────────

pub fn parse_currency(s: &str) -> Result<Currency, RepoError> {
    s.parse()
        .map_err(|_| RepoError::Database(format!("Unknown currency: {}", s)))
}

pub fn parse_status(s: &str) -> Result<OrderStatus, RepoError> {
    s.parse()
        .map_err(|_| RepoError::Database(format!("Unknown order status: {}", s)))
}

/// Maps a sqlx error, turning unique-constraint violations into conflicts.
pub fn map_write_error(err: sqlx::Error, what: &str) -> RepoError {
    match &err {
        sqlx::Error::Database(db) if db.is_unique_violation() => {
            RepoError::Conflict(format!("{} already exists", what))
        }
        _ => RepoError::Database(err.to_string()),
    }
}

pub fn map_db_error(err: sqlx::Error) -> RepoError {
    RepoError::Database(err.to_string())
}

/// Only settling updates may be written; orders never return to `pending`.
pub fn ensure_settling(update: &OrderUpdate) -> Result<(), RepoError> {
    if update.status.is_settled() {
        Ok(())
    } else {
        Err(DomainError::InvalidTransition {
            from: OrderStatus::Pending,
            to: update.status,
        }
        .into())
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Domain conversion
// ─────────────────────────────────────────────────────────────────────────────

impl DbUser {
    /// Convert database row to domain User.
    pub fn into_domain(self) -> User {
        User {
            id: UserId::from_uuid(self.id),
            provider_id: self.provider_id,
            email: self.email,
            name: self.name,
            created_at: self.created_at,
            updated_at: self.updated_at,
        }
    }
}

impl DbOrder {
    /// Convert database row to domain Order.
    pub fn into_domain(self) -> Result<Order, RepoError> {
        let currency = parse_currency(&self.currency)?;
        let amount = Money::new(self.amount, currency)?;

        Ok(Order {
            id: OrderId::from_uuid(self.id),
            user_id: UserId::from_uuid(self.user_id),
            gateway_order_id: self.gateway_order_id,
            amount,
            status: parse_status(&self.status)?,
            gateway_payment_id: self.gateway_payment_id,
            gateway_signature: self.gateway_signature,
            created_at: self.created_at,
            updated_at: self.updated_at,
        })
    }
}
