//! Plan tier and subscription models.

use keepsake_core::plan::QuotaAction;
use keepsake_core::types::{DbId, Timestamp};
use serde::Serialize;
use sqlx::FromRow;

/// Subscription status values matching the `subscriptions.status` CHECK.
pub const SUBSCRIPTION_ACTIVE: &str = "active";
pub const SUBSCRIPTION_CANCELLED: &str = "cancelled";
pub const SUBSCRIPTION_EXPIRED: &str = "expired";

/// A row from the `plans` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Plan {
    pub id: DbId,
    pub code: String,
    pub name: String,
    pub create_limit: i32,
    pub edit_limit: i32,
    pub publish_limit: i32,
    pub watermark_enabled: bool,
    pub watermark_text: Option<String>,
    pub is_active: bool,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

impl Plan {
    /// The monthly ceiling this plan sets for an action (0 = unlimited).
    pub fn ceiling(&self, action: QuotaAction) -> i32 {
        match action {
            QuotaAction::Create => self.create_limit,
            QuotaAction::Edit => self.edit_limit,
            QuotaAction::Publish => self.publish_limit,
        }
    }
}

/// A row from the `subscriptions` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Subscription {
    pub id: DbId,
    pub account_id: DbId,
    pub plan_id: DbId,
    pub status: String,
    pub starts_at: Timestamp,
    pub ends_at: Timestamp,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}
