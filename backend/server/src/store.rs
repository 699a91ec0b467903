//! SQLite-backed implementations of the funding model's collaborator
//! interfaces.

use funding_core::{
    Contribution, ContributionLedger, ContributorId, ContributorProfile, IdentityResolver, ItemId,
    LedgerStore,
};
use sqlx::SqlitePool;

use crate::db;
use crate::errors::ServerError;

/// Persistence collaborator: ledgers live in the `contributions` table.
#[derive(Clone)]
pub struct SqliteLedgerStore {
    pool: SqlitePool,
}

impl SqliteLedgerStore {
    pub fn new(pool: SqlitePool) -> Self {
        SqliteLedgerStore { pool }
    }
}

impl LedgerStore for SqliteLedgerStore {
    type Error = ServerError;

    async fn load_ledger(&self, item: ItemId) -> Result<ContributionLedger, ServerError> {
        let rows = db::contributions_for_item(&self.pool, item.0).await?;
        let mut entries = Vec::with_capacity(rows.len());
        for row in rows {
            entries.push(row.into_contribution()?);
        }
        Ok(ContributionLedger::from_entries(entries))
    }

    async fn append_contribution(
        &self,
        item: ItemId,
        contribution: &Contribution,
    ) -> Result<(), ServerError> {
        db::insert_contribution(&self.pool, item.0, contribution).await
    }
}

/// Identity collaborator: contributor ids resolve against the `users`
/// table. Anonymous entries never reach this — redaction happens in the
/// core's view projection before resolution.
#[derive(Clone)]
pub struct DbIdentityResolver {
    pool: SqlitePool,
}

impl DbIdentityResolver {
    pub fn new(pool: SqlitePool) -> Self {
        DbIdentityResolver { pool }
    }
}

impl IdentityResolver for DbIdentityResolver {
    type Error = ServerError;

    async fn resolve(
        &self,
        contributor: &ContributorId,
    ) -> Result<Option<ContributorProfile>, ServerError> {
        let row = db::get_user(&self.pool, &contributor.0).await?;
        Ok(row.map(|user| ContributorProfile {
            id: ContributorId(user.id),
            display_name: user.display_name,
            avatar_url: user.avatar_url,
        }))
    }
}
