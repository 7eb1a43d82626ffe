//! Uploaded file asset model and status state machine.
//!
//! Status transitions:
//!
//! ```text
//! active -> delete_pending -> deleted
//!                |    ^          ^
//!                v    |          |
//!            delete_failed ------+
//! ```
//!
//! `delete_failed` is retry-eligible: every purge tick re-attempts due
//! failures. Asset rows are an audit trail and are never removed.

use keepsake_core::types::{DbId, Timestamp};
use serde::Serialize;
use sqlx::FromRow;

/// Status values matching the `file_assets.status` CHECK constraint.
pub const STATUS_ACTIVE: &str = "active";
pub const STATUS_DELETE_PENDING: &str = "delete_pending";
pub const STATUS_DELETE_FAILED: &str = "delete_failed";
pub const STATUS_DELETED: &str = "deleted";

/// A row from the `file_assets` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct FileAsset {
    pub id: DbId,
    pub owner_type: String,
    pub owner_id: DbId,
    pub account_id: DbId,
    pub storage_path: String,
    pub public_url: String,
    pub status: String,
    pub delete_requested_at: Option<Timestamp>,
    /// Physical deletion becomes eligible once this passes.
    pub purge_after: Option<Timestamp>,
    pub deleted_at: Option<Timestamp>,
    /// Truncated message of the most recent failed purge attempt.
    pub last_error: Option<String>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}
