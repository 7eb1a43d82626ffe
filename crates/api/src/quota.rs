//! The usage quota gate.
//!
//! Every governed action (create, edit, publish) passes through two calls:
//! [`check`] before any state changes, and [`record`] (or
//! [`record_in_tx`]) once the action succeeds. Checks always re-read
//! current state — counters are never cached across requests.

use keepsake_core::error::CoreError;
use keepsake_core::period::current_month_key;
use keepsake_core::plan::{check_ceiling, QuotaAction};
use keepsake_core::types::DbId;
use keepsake_db::models::account::Account;
use keepsake_db::models::plan::Plan;
use keepsake_db::repositories::{PlanRepo, UsageRepo};
use sqlx::{PgPool, Postgres, Transaction};

use crate::error::AppResult;

/// Resolve the plan governing an account right now.
///
/// An active subscription whose window contains now (and whose plan is
/// still active) wins; otherwise the designated free plan. A missing free
/// plan is a deployment fault, not a user error.
pub async fn effective_plan(pool: &PgPool, account_id: DbId) -> AppResult<Plan> {
    if let Some(plan) = PlanRepo::find_subscribed_plan(pool, account_id).await? {
        return Ok(plan);
    }
    match PlanRepo::find_free_plan(pool).await? {
        Some(plan) => Ok(plan),
        None => {
            tracing::error!("Fallback free plan is missing from the plans table");
            Err(CoreError::Internal("Default plan is not configured".into()).into())
        }
    }
}

/// Fail (without side effects) when the account has exhausted this
/// period's ceiling for `action`. Quota-exempt accounts always pass.
pub async fn check(pool: &PgPool, account: &Account, action: QuotaAction) -> AppResult<()> {
    if account.quota_exempt {
        return Ok(());
    }

    let plan = effective_plan(pool, account.id).await?;
    let ceiling = plan.ceiling(action);
    if ceiling == 0 {
        return Ok(());
    }

    let current = UsageRepo::find(pool, account.id, &current_month_key())
        .await?
        .map(|entry| entry.count(action))
        .unwrap_or(0);

    check_ceiling(action, ceiling, current)?;
    Ok(())
}

/// Count a completed action against the current period. Quota-exempt
/// accounts are never counted.
pub async fn record(pool: &PgPool, account: &Account, action: QuotaAction) -> AppResult<()> {
    if account.quota_exempt {
        return Ok(());
    }
    UsageRepo::increment(pool, account.id, &current_month_key(), action).await?;
    Ok(())
}

/// [`record`] inside the caller's transaction, so the counter commits or
/// rolls back with the action it counts.
pub async fn record_in_tx(
    tx: &mut Transaction<'_, Postgres>,
    account: &Account,
    action: QuotaAction,
) -> AppResult<()> {
    if account.quota_exempt {
        return Ok(());
    }
    UsageRepo::increment_in_tx(tx, account.id, &current_month_key(), action).await?;
    Ok(())
}
