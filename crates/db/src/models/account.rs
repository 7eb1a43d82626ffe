//! Account models.

use keepsake_core::types::{DbId, Timestamp};
use serde::Serialize;
use sqlx::FromRow;

/// A row from the `accounts` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Account {
    pub id: DbId,
    pub email: String,
    pub display_name: String,
    /// Administrative accounts bypass quota checks and increments.
    pub quota_exempt: bool,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}
