//! Repository for the `plans` and `subscriptions` tables.

use keepsake_core::plan::FREE_PLAN_CODE;
use keepsake_core::types::DbId;
use sqlx::PgPool;

use crate::models::plan::{Plan, Subscription, SUBSCRIPTION_ACTIVE};

const PLAN_COLUMNS: &str = "\
    id, code, name, create_limit, edit_limit, publish_limit, \
    watermark_enabled, watermark_text, is_active, created_at, updated_at";

const SUBSCRIPTION_COLUMNS: &str =
    "id, account_id, plan_id, status, starts_at, ends_at, created_at, updated_at";

/// Provides plan and subscription lookups.
pub struct PlanRepo;

impl PlanRepo {
    /// Find a plan by its code.
    pub async fn find_by_code(pool: &PgPool, code: &str) -> Result<Option<Plan>, sqlx::Error> {
        let query = format!("SELECT {PLAN_COLUMNS} FROM plans WHERE code = $1");
        sqlx::query_as::<_, Plan>(&query)
            .bind(code)
            .fetch_optional(pool)
            .await
    }

    /// The designated fallback plan for accounts without a subscription.
    pub async fn find_free_plan(pool: &PgPool) -> Result<Option<Plan>, sqlx::Error> {
        Self::find_by_code(pool, FREE_PLAN_CODE).await
    }

    /// The plan of the account's active subscription whose window contains
    /// `NOW()`, if any. Inactive plans are skipped (fall back to free).
    ///
    /// When overlapping subscriptions exist, the one ending last wins.
    pub async fn find_subscribed_plan(
        pool: &PgPool,
        account_id: DbId,
    ) -> Result<Option<Plan>, sqlx::Error> {
        let query = "\
            SELECT p.id, p.code, p.name, p.create_limit, p.edit_limit, p.publish_limit, \
                   p.watermark_enabled, p.watermark_text, p.is_active, p.created_at, p.updated_at \
            FROM plans p \
            JOIN subscriptions s ON s.plan_id = p.id \
            WHERE s.account_id = $1 \
              AND s.status = $2 \
              AND s.starts_at <= NOW() AND NOW() < s.ends_at \
              AND p.is_active \
            ORDER BY s.ends_at DESC \
            LIMIT 1";
        sqlx::query_as::<_, Plan>(query)
            .bind(account_id)
            .bind(SUBSCRIPTION_ACTIVE)
            .fetch_optional(pool)
            .await
    }

    /// Create a subscription. Used by seeds and tests; billing owns the
    /// real write path.
    pub async fn create_subscription(
        pool: &PgPool,
        account_id: DbId,
        plan_id: DbId,
        starts_at: keepsake_core::types::Timestamp,
        ends_at: keepsake_core::types::Timestamp,
    ) -> Result<Subscription, sqlx::Error> {
        let query = format!(
            "INSERT INTO subscriptions (account_id, plan_id, status, starts_at, ends_at) \
             VALUES ($1, $2, $3, $4, $5) \
             RETURNING {SUBSCRIPTION_COLUMNS}"
        );
        sqlx::query_as::<_, Subscription>(&query)
            .bind(account_id)
            .bind(plan_id)
            .bind(SUBSCRIPTION_ACTIVE)
            .bind(starts_at)
            .bind(ends_at)
            .fetch_one(pool)
            .await
    }
}
