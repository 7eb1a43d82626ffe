//! Repository for the `file_assets` table.
//!
//! Implements the asset deletion state machine. Physical deletion is the
//! purge job's business; this repository owns the claims and transitions.
//! Due assets are claimed with `FOR UPDATE SKIP LOCKED` inside the purge
//! transaction, so concurrent purge ticks skip rows that are mid-flight
//! instead of double-processing them.

use keepsake_core::types::DbId;
use sqlx::{PgPool, Postgres, Transaction};

use crate::models::file_asset::{
    FileAsset, STATUS_ACTIVE, STATUS_DELETED, STATUS_DELETE_FAILED, STATUS_DELETE_PENDING,
};

const COLUMNS: &str = "\
    id, owner_type, owner_id, account_id, storage_path, public_url, status, \
    delete_requested_at, purge_after, deleted_at, last_error, \
    created_at, updated_at";

/// Days between a deletion request and physical purge eligibility. The
/// grace window lets support undo an accidental delete before files are
/// gone.
pub const RETENTION_DAYS: i32 = 7;

/// Longest error text stored on a failed purge.
const MAX_ERROR_LENGTH: usize = 500;

/// Provides lifecycle operations for uploaded file assets.
pub struct FileAssetRepo;

impl FileAssetRepo {
    /// Record a successfully uploaded file as an `active` asset.
    ///
    /// Returns `None` without touching the database when the storage path
    /// or public URL is blank.
    pub async fn register(
        pool: &PgPool,
        owner_type: &str,
        owner_id: DbId,
        account_id: DbId,
        storage_path: &str,
        public_url: &str,
    ) -> Result<Option<FileAsset>, sqlx::Error> {
        if storage_path.trim().is_empty() || public_url.trim().is_empty() {
            return Ok(None);
        }
        let query = format!(
            "INSERT INTO file_assets (owner_type, owner_id, account_id, storage_path, public_url) \
             VALUES ($1, $2, $3, $4, $5) \
             RETURNING {COLUMNS}"
        );
        let asset = sqlx::query_as::<_, FileAsset>(&query)
            .bind(owner_type)
            .bind(owner_id)
            .bind(account_id)
            .bind(storage_path)
            .bind(public_url)
            .fetch_one(pool)
            .await?;
        Ok(Some(asset))
    }

    /// Find an asset by ID.
    pub async fn find_by_id(pool: &PgPool, id: DbId) -> Result<Option<FileAsset>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM file_assets WHERE id = $1");
        sqlx::query_as::<_, FileAsset>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// All assets of one owning document, oldest first.
    pub async fn list_for_owner(
        pool: &PgPool,
        owner_type: &str,
        owner_id: DbId,
    ) -> Result<Vec<FileAsset>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM file_assets \
             WHERE owner_type = $1 AND owner_id = $2 \
             ORDER BY created_at"
        );
        sqlx::query_as::<_, FileAsset>(&query)
            .bind(owner_type)
            .bind(owner_id)
            .fetch_all(pool)
            .await
    }

    /// Queue every live asset of an owner for deletion.
    ///
    /// `active` and `delete_failed` assets move to `delete_pending` with a
    /// fresh [`RETENTION_DAYS`] grace window and a cleared error; assets
    /// already `delete_pending` or `deleted` are untouched. Returns the
    /// number of assets queued.
    pub async fn schedule_deletion_in_tx(
        tx: &mut Transaction<'_, Postgres>,
        owner_type: &str,
        owner_id: DbId,
    ) -> Result<u64, sqlx::Error> {
        let result = sqlx::query(
            "UPDATE file_assets SET \
                status = $3, \
                delete_requested_at = NOW(), \
                purge_after = NOW() + make_interval(days => $4), \
                last_error = NULL \
             WHERE owner_type = $1 AND owner_id = $2 AND status IN ($5, $6)",
        )
        .bind(owner_type)
        .bind(owner_id)
        .bind(STATUS_DELETE_PENDING)
        .bind(RETENTION_DAYS)
        .bind(STATUS_ACTIVE)
        .bind(STATUS_DELETE_FAILED)
        .execute(&mut **tx)
        .await?;
        Ok(result.rows_affected())
    }

    /// [`Self::schedule_deletion_in_tx`] as a standalone operation.
    pub async fn schedule_deletion(
        pool: &PgPool,
        owner_type: &str,
        owner_id: DbId,
    ) -> Result<u64, sqlx::Error> {
        let mut tx = pool.begin().await?;
        let queued = Self::schedule_deletion_in_tx(&mut tx, owner_type, owner_id).await?;
        tx.commit().await?;
        Ok(queued)
    }

    /// Claim the next purge-eligible asset, if any.
    ///
    /// Eligible = `delete_pending` or `delete_failed` with `purge_after`
    /// in the past, excluding `skip` (assets the current purge run already
    /// attempted). Oldest-due first, then oldest-created, so retries of
    /// old failures are not starved by fresh deletions. `SKIP LOCKED`
    /// makes concurrent purge runs claim disjoint assets; the claim must
    /// stay inside the transaction that applies the outcome.
    pub async fn claim_next_due_in_tx(
        tx: &mut Transaction<'_, Postgres>,
        skip: &[DbId],
    ) -> Result<Option<FileAsset>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM file_assets \
             WHERE status IN ($1, $2) AND purge_after <= NOW() \
               AND NOT (id = ANY($3)) \
             ORDER BY purge_after ASC, created_at ASC \
             LIMIT 1 \
             FOR UPDATE SKIP LOCKED"
        );
        sqlx::query_as::<_, FileAsset>(&query)
            .bind(STATUS_DELETE_PENDING)
            .bind(STATUS_DELETE_FAILED)
            .bind(skip)
            .fetch_optional(&mut **tx)
            .await
    }

    /// Record a successful physical deletion.
    pub async fn mark_deleted_in_tx(
        tx: &mut Transaction<'_, Postgres>,
        id: DbId,
    ) -> Result<(), sqlx::Error> {
        sqlx::query(
            "UPDATE file_assets SET status = $2, deleted_at = NOW(), last_error = NULL \
             WHERE id = $1",
        )
        .bind(id)
        .bind(STATUS_DELETED)
        .execute(&mut **tx)
        .await?;
        Ok(())
    }

    /// Record a failed physical deletion.
    ///
    /// `purge_after` is left unchanged so the asset stays eligible and is
    /// retried on the next scheduler tick.
    pub async fn mark_failed_in_tx(
        tx: &mut Transaction<'_, Postgres>,
        id: DbId,
        error: &str,
    ) -> Result<(), sqlx::Error> {
        let message: String = error.chars().take(MAX_ERROR_LENGTH).collect();
        sqlx::query(
            "UPDATE file_assets SET status = $2, last_error = $3 WHERE id = $1",
        )
        .bind(id)
        .bind(STATUS_DELETE_FAILED)
        .bind(message)
        .execute(&mut **tx)
        .await?;
        Ok(())
    }

    /// Whether `url` is a live (`active`) asset owned by `account_id`.
    ///
    /// Drafts may only reference uploads of their own account; this is
    /// the check behind that rule.
    pub async fn is_owned_active_url(
        pool: &PgPool,
        account_id: DbId,
        url: &str,
    ) -> Result<bool, sqlx::Error> {
        let row: (bool,) = sqlx::query_as(
            "SELECT EXISTS(\
                SELECT 1 FROM file_assets \
                WHERE account_id = $1 AND public_url = $2 AND status = $3\
             )",
        )
        .bind(account_id)
        .bind(url)
        .bind(STATUS_ACTIVE)
        .fetch_one(pool)
        .await?;
        Ok(row.0)
    }
}
