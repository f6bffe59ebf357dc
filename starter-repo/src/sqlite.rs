//! SQLite repository adapter.

use async_trait::async_trait;
use sqlx::SqlitePool;
use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};
use std::str::FromStr;

use starter_types::{
    NewOrder, NewUser, Order, OrderRepository, OrderTransition, OrderUpdate, RepoError, User,
    UserChanges, UserRepository,
};

use crate::types::{DbOrder, DbUser, ensure_settling, map_db_error, map_write_error};

const MIGRATIONS: [(&str, &str); 2] = [
    ("0001", include_str!("../migrations/0001_create_users.sql")),
    ("0002", include_str!("../migrations/0002_create_orders.sql")),
];

async fn run_migrations(pool: &SqlitePool) -> anyhow::Result<()> {
    for (name, sql) in MIGRATIONS {
        for statement in sql.split(';') {
            let stmt = statement.trim();
            if !stmt.is_empty() {
                sqlx::query(stmt)
                    .execute(pool)
                    .await
                    .map_err(|e| anyhow::anyhow!("Migration {} failed: {}", name, e))?;
            }
        }
    }
    Ok(())
}

// ─────────────────────────────────────────────────────────────────────────────
// SQLite Repository
// ─────────────────────────────────────────────────────────────────────────────

/// SQLite repository implementation.
pub struct SqliteRepo {
    pool: SqlitePool,
}

impl SqliteRepo {
    /// Creates a new SQLite repository with automatic migration.
    pub async fn new(database_url: &str) -> anyhow::Result<Self> {
        let in_memory = database_url.contains(":memory:");

        // Ensure on-disk SQLite target directory exists.
        if !in_memory {
            if let Some(path) = database_url.strip_prefix("sqlite://") {
                let path = path.split('?').next().unwrap_or(path);
                if let Some(parent) = std::path::Path::new(path).parent() {
                    if !parent.as_os_str().is_empty() {
                        tokio::fs::create_dir_all(parent).await?;
                    }
                }
            }
        }

        let options = SqliteConnectOptions::from_str(database_url)?
            .create_if_missing(true)
            .foreign_keys(true);

        // An in-memory database lives only as long as its connection.
        let pool_options = if in_memory {
            SqlitePoolOptions::new()
                .max_connections(1)
                .idle_timeout(None)
                .max_lifetime(None)
        } else {
            SqlitePoolOptions::new()
        };
        let pool = pool_options.connect_with(options).await?;

        run_migrations(&pool).await?;

        Ok(Self { pool })
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// User operations
// ─────────────────────────────────────────────────────────────────────────────

#[async_trait]
impl UserRepository for SqliteRepo {
    async fn get_user_by_provider_id(
        &self,
        provider_id: &str,
    ) -> Result<Option<User>, RepoError> {
        let row: Option<DbUser> = sqlx::query_as(
            r#"SELECT id, provider_id, email, name, created_at, updated_at
               FROM users WHERE provider_id = ?"#,
        )
        .bind(provider_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(map_db_error)?;

        Ok(row.map(DbUser::into_domain))
    }

    async fn upsert_user(&self, new: NewUser) -> Result<User, RepoError> {
        let user = User::create(new);

        sqlx::query(
            r#"INSERT INTO users (id, provider_id, email, name, created_at, updated_at)
               VALUES (?, ?, ?, ?, ?, ?)
               ON CONFLICT (provider_id) DO NOTHING"#,
        )
        .bind(user.id.into_uuid())
        .bind(&user.provider_id)
        .bind(&user.email)
        .bind(&user.name)
        .bind(user.created_at)
        .bind(user.updated_at)
        .execute(&self.pool)
        .await
        .map_err(map_db_error)?;

        self.get_user_by_provider_id(&user.provider_id)
            .await?
            .ok_or(RepoError::NotFound)
    }

    async fn update_user(
        &self,
        provider_id: &str,
        changes: UserChanges,
    ) -> Result<Option<User>, RepoError> {
        let row: Option<DbUser> = sqlx::query_as(
            r#"UPDATE users
               SET name = COALESCE(?, name), email = COALESCE(?, email), updated_at = ?
               WHERE provider_id = ?
               RETURNING id, provider_id, email, name, created_at, updated_at"#,
        )
        .bind(changes.name)
        .bind(changes.email)
        .bind(chrono::Utc::now())
        .bind(provider_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(map_db_error)?;

        Ok(row.map(DbUser::into_domain))
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Order operations
// ─────────────────────────────────────────────────────────────────────────────

#[async_trait]
impl OrderRepository for SqliteRepo {
    async fn create_order(&self, new: NewOrder) -> Result<Order, RepoError> {
        let order = Order::pending(new);

        sqlx::query(
            r#"INSERT INTO orders (id, user_id, gateway_order_id, amount, currency, status,
                                   created_at, updated_at)
               VALUES (?, ?, ?, ?, ?, ?, ?, ?)"#,
        )
        .bind(order.id.into_uuid())
        .bind(order.user_id.into_uuid())
        .bind(&order.gateway_order_id)
        .bind(order.amount.amount())
        .bind(order.amount.currency().to_string())
        .bind(order.status.as_ref())
        .bind(order.created_at)
        .bind(order.updated_at)
        .execute(&self.pool)
        .await
        .map_err(|e| map_write_error(e, "Order"))?;

        Ok(order)
    }

    async fn get_order_by_gateway_id(
        &self,
        gateway_order_id: &str,
    ) -> Result<Option<Order>, RepoError> {
        let row: Option<DbOrder> = sqlx::query_as(
            r#"SELECT id, user_id, gateway_order_id, amount, currency, status,
                      gateway_payment_id, gateway_signature, created_at, updated_at
               FROM orders WHERE gateway_order_id = ?"#,
        )
        .bind(gateway_order_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(map_db_error)?;

        row.map(DbOrder::into_domain).transpose()
    }

    async fn transition_order(
        &self,
        gateway_order_id: &str,
        update: OrderUpdate,
    ) -> Result<OrderTransition, RepoError> {
        ensure_settling(&update)?;

        let applied: Option<DbOrder> = sqlx::query_as(
            r#"UPDATE orders
               SET status = ?,
                   gateway_payment_id = COALESCE(?, gateway_payment_id),
                   gateway_signature = COALESCE(?, gateway_signature),
                   updated_at = ?
               WHERE gateway_order_id = ? AND status = 'pending'
               RETURNING id, user_id, gateway_order_id, amount, currency, status,
                         gateway_payment_id, gateway_signature, created_at, updated_at"#,
        )
        .bind(update.status.as_ref())
        .bind(update.payment_id)
        .bind(update.signature)
        .bind(chrono::Utc::now())
        .bind(gateway_order_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(map_db_error)?;

        if let Some(row) = applied {
            return Ok(OrderTransition::Applied(row.into_domain()?));
        }

        match self.get_order_by_gateway_id(gateway_order_id).await? {
            Some(order) => Ok(OrderTransition::AlreadySettled(order)),
            None => Err(RepoError::NotFound),
        }
    }
}
