//! Usage ledger model.

use keepsake_core::plan::QuotaAction;
use keepsake_core::types::{DbId, Timestamp};
use serde::Serialize;
use sqlx::FromRow;

/// A row from the `usage_ledger` table: one per (account, calendar month),
/// created lazily on the first governed action in that month.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct UsageLedgerEntry {
    pub id: DbId,
    pub account_id: DbId,
    /// Calendar-month key, e.g. `2026-08`.
    pub period: String,
    pub created_count: i32,
    pub edited_count: i32,
    pub published_count: i32,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

impl UsageLedgerEntry {
    /// The current counter for an action.
    pub fn count(&self, action: QuotaAction) -> i32 {
        match action {
            QuotaAction::Create => self.created_count,
            QuotaAction::Edit => self.edited_count,
            QuotaAction::Publish => self.published_count,
        }
    }
}
