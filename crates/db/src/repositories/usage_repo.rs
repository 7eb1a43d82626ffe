//! Repository for the `usage_ledger` table.
//!
//! Counter updates are a single atomic upsert: the unique index on
//! (account_id, period) collapses concurrent first-use row creation onto
//! one row, and the `DO UPDATE .. + 1` form increments under the row lock
//! the conflict resolution takes, so concurrent increments cannot lose
//! updates. No read-modify-write anywhere.

use keepsake_core::plan::QuotaAction;
use keepsake_core::types::DbId;
use sqlx::{PgPool, Postgres, Transaction};

use crate::models::usage::UsageLedgerEntry;

const COLUMNS: &str = "\
    id, account_id, period, created_count, edited_count, published_count, \
    created_at, updated_at";

/// Provides read and increment operations for usage counters.
pub struct UsageRepo;

impl UsageRepo {
    /// The ledger row for (account, period), if any action happened in
    /// that period yet.
    pub async fn find(
        pool: &PgPool,
        account_id: DbId,
        period: &str,
    ) -> Result<Option<UsageLedgerEntry>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM usage_ledger WHERE account_id = $1 AND period = $2"
        );
        sqlx::query_as::<_, UsageLedgerEntry>(&query)
            .bind(account_id)
            .bind(period)
            .fetch_optional(pool)
            .await
    }

    /// Atomically increment one action counter, creating the period row on
    /// first use. The column name comes from the closed [`QuotaAction`]
    /// enum, never from input.
    pub async fn increment(
        pool: &PgPool,
        account_id: DbId,
        period: &str,
        action: QuotaAction,
    ) -> Result<UsageLedgerEntry, sqlx::Error> {
        sqlx::query_as::<_, UsageLedgerEntry>(&Self::increment_sql(action))
            .bind(account_id)
            .bind(period)
            .fetch_one(pool)
            .await
    }

    /// [`Self::increment`] participating in the caller's transaction, for
    /// counting a publish inside the publish transaction.
    pub async fn increment_in_tx(
        tx: &mut Transaction<'_, Postgres>,
        account_id: DbId,
        period: &str,
        action: QuotaAction,
    ) -> Result<UsageLedgerEntry, sqlx::Error> {
        sqlx::query_as::<_, UsageLedgerEntry>(&Self::increment_sql(action))
            .bind(account_id)
            .bind(period)
            .fetch_one(&mut **tx)
            .await
    }

    fn increment_sql(action: QuotaAction) -> String {
        let col = action.ledger_column();
        format!(
            "INSERT INTO usage_ledger (account_id, period, {col}) \
             VALUES ($1, $2, 1) \
             ON CONFLICT (account_id, period) \
             DO UPDATE SET {col} = usage_ledger.{col} + 1 \
             RETURNING {COLUMNS}"
        )
    }
}
