//! Database layer — migrations, row types, and queries.

use chrono::{DateTime, Utc};
use funding_core::{Contribution, ContributorId, FundingTarget, ItemId, ItemStatus, Money};
use serde::Serialize;
use sqlx::{sqlite::SqlitePoolOptions, SqlitePool};
use tracing::info;
use uuid::Uuid;

use crate::errors::{Result, ServerError};
use crate::payments::{PaymentRecord, PaymentStatus};

/// Establish a SQLite connection pool and run pending migrations.
pub async fn init_pool(database_url: &str) -> Result<SqlitePool> {
    let url = if database_url.starts_with("sqlite:") {
        database_url.to_string()
    } else {
        format!("sqlite:{database_url}")
    };

    let pool = SqlitePoolOptions::new()
        .max_connections(5)
        .connect(&url)
        .await?;

    sqlx::migrate!("./migrations").run(&pool).await?;
    info!("Database migrations applied successfully");
    Ok(pool)
}

// ─────────────────────────────────────────────────────────
// Items
// ─────────────────────────────────────────────────────────

#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct ItemRecord {
    pub id: i64,
    pub name: String,
    pub price: i64,
    pub status: String,
    pub created_at: i64,
}

impl ItemRecord {
    /// Reconstruct the domain target from the stored row.
    pub fn target(&self) -> Result<FundingTarget> {
        let status = ItemStatus::parse(&self.status)
            .ok_or_else(|| ServerError::Corrupt(format!("unknown item status {}", self.status)))?;
        let price = Money::new(self.price).map_err(|_| {
            ServerError::Corrupt(format!("negative price {} for item {}", self.price, self.id))
        })?;
        Ok(FundingTarget {
            id: ItemId(self.id),
            price,
            status,
        })
    }
}

pub async fn insert_item(pool: &SqlitePool, name: &str, price: i64) -> Result<ItemRecord> {
    let row = sqlx::query_as::<_, ItemRecord>(
        r#"
        INSERT INTO items (name, price, status)
        VALUES (?1, ?2, 'AVAILABLE')
        RETURNING id, name, price, status, created_at
        "#,
    )
    .bind(name)
    .bind(price)
    .fetch_one(pool)
    .await?;
    Ok(row)
}

pub async fn get_item(pool: &SqlitePool, id: i64) -> Result<Option<ItemRecord>> {
    let row = sqlx::query_as::<_, ItemRecord>(
        "SELECT id, name, price, status, created_at FROM items WHERE id = ?1",
    )
    .bind(id)
    .fetch_optional(pool)
    .await?;
    Ok(row)
}

pub async fn set_item_status(pool: &SqlitePool, id: i64, status: ItemStatus) -> Result<()> {
    sqlx::query("UPDATE items SET status = ?1 WHERE id = ?2")
        .bind(status.as_str())
        .bind(id)
        .execute(pool)
        .await?;
    Ok(())
}

// ─────────────────────────────────────────────────────────
// Contributions
// ─────────────────────────────────────────────────────────

#[derive(Debug, Clone, sqlx::FromRow)]
pub struct ContributionRow {
    pub id: String,
    pub contributor_id: Option<String>,
    pub amount: i64,
    pub message: Option<String>,
    pub is_anonymous: bool,
    pub created_at: String,
}

impl ContributionRow {
    /// Rebuild the domain entity, re-applying creation validation.
    pub fn into_contribution(self) -> Result<Contribution> {
        let id = Uuid::parse_str(&self.id)
            .map_err(|e| ServerError::Corrupt(format!("bad contribution id: {e}")))?;
        let created_at = self
            .created_at
            .parse::<DateTime<Utc>>()
            .map_err(|e| ServerError::Corrupt(format!("bad contribution timestamp: {e}")))?;
        let amount = Money::new(self.amount)
            .map_err(|_| ServerError::Corrupt(format!("negative amount {}", self.amount)))?;
        Contribution::from_parts(
            id,
            amount,
            self.contributor_id.map(ContributorId),
            self.message,
            self.is_anonymous,
            created_at,
        )
        .map_err(ServerError::Funding)
    }
}

/// Persist one contribution. Inserts that share a contribution id are
/// silently ignored, which makes replayed verifications idempotent.
pub async fn insert_contribution(
    pool: &SqlitePool,
    item_id: i64,
    contribution: &Contribution,
) -> Result<()> {
    sqlx::query(
        r#"
        INSERT OR IGNORE INTO contributions
            (id, item_id, contributor_id, amount, message, is_anonymous, created_at, seq)
        VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7,
                (SELECT COALESCE(MAX(seq), -1) + 1 FROM contributions WHERE item_id = ?2))
        "#,
    )
    .bind(contribution.id().to_string())
    .bind(item_id)
    .bind(contribution.contributor_for_audit().map(|c| c.0.clone()))
    .bind(contribution.amount().value())
    .bind(contribution.message())
    .bind(contribution.is_anonymous())
    .bind(contribution.created_at().to_rfc3339())
    .execute(pool)
    .await?;
    Ok(())
}

/// Fetch all contributions for an item in arrival order.
pub async fn contributions_for_item(
    pool: &SqlitePool,
    item_id: i64,
) -> Result<Vec<ContributionRow>> {
    let rows = sqlx::query_as::<_, ContributionRow>(
        r#"
        SELECT id, contributor_id, amount, message, is_anonymous, created_at
        FROM   contributions
        WHERE  item_id = ?1
        ORDER  BY seq ASC
        "#,
    )
    .bind(item_id)
    .fetch_all(pool)
    .await?;
    Ok(rows)
}

// ─────────────────────────────────────────────────────────
// Users
// ─────────────────────────────────────────────────────────

#[derive(Debug, Clone, sqlx::FromRow)]
pub struct UserRow {
    pub id: String,
    pub display_name: String,
    pub avatar_url: Option<String>,
}

pub async fn get_user(pool: &SqlitePool, id: &str) -> Result<Option<UserRow>> {
    let row = sqlx::query_as::<_, UserRow>(
        "SELECT id, display_name, avatar_url FROM users WHERE id = ?1",
    )
    .bind(id)
    .fetch_optional(pool)
    .await?;
    Ok(row)
}

// ─────────────────────────────────────────────────────────
// Payments
// ─────────────────────────────────────────────────────────

pub async fn insert_payment(pool: &SqlitePool, payment: &PaymentRecord) -> Result<()> {
    sqlx::query(
        r#"
        INSERT INTO payments
            (id, order_id, item_id, contributor_id, amount, message,
             is_anonymous, authority, ref_id, status, created_at)
        VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11)
        "#,
    )
    .bind(&payment.id)
    .bind(&payment.order_id)
    .bind(payment.item_id)
    .bind(&payment.contributor_id)
    .bind(payment.amount)
    .bind(&payment.message)
    .bind(payment.is_anonymous)
    .bind(&payment.authority)
    .bind(&payment.ref_id)
    .bind(payment.status.as_str())
    .bind(&payment.created_at)
    .execute(pool)
    .await?;
    Ok(())
}

pub async fn get_payment_by_authority(
    pool: &SqlitePool,
    authority: &str,
) -> Result<Option<PaymentRecord>> {
    let row = sqlx::query_as::<_, PaymentRecord>(
        r#"
        SELECT id, order_id, item_id, contributor_id, amount, message,
               is_anonymous, authority, ref_id, status, created_at
        FROM   payments
        WHERE  authority = ?1
        "#,
    )
    .bind(authority)
    .fetch_optional(pool)
    .await?;
    Ok(row)
}

pub async fn set_payment_authority(
    pool: &SqlitePool,
    payment_id: &str,
    authority: &str,
) -> Result<()> {
    sqlx::query("UPDATE payments SET authority = ?1 WHERE id = ?2")
        .bind(authority)
        .bind(payment_id)
        .execute(pool)
        .await?;
    Ok(())
}

pub async fn set_payment_status(
    pool: &SqlitePool,
    payment_id: &str,
    status: PaymentStatus,
    ref_id: Option<&str>,
) -> Result<()> {
    sqlx::query("UPDATE payments SET status = ?1, ref_id = COALESCE(?2, ref_id) WHERE id = ?3")
        .bind(status.as_str())
        .bind(ref_id)
        .bind(payment_id)
        .execute(pool)
        .await?;
    Ok(())
}

#[cfg(test)]
pub(crate) async fn test_pool() -> SqlitePool {
    // One connection: a pooled ":memory:" database is per-connection.
    let pool = SqlitePoolOptions::new()
        .max_connections(1)
        .connect("sqlite::memory:")
        .await
        .expect("in-memory sqlite");
    sqlx::migrate!("./migrations")
        .run(&pool)
        .await
        .expect("migrations");
    pool
}
