//! Periodic physical deletion of scheduled file assets.
//!
//! Spawns a background loop that asks the repository for purge-eligible
//! assets (deletion requested, grace window elapsed) and deletes their
//! files from the storage backend. Runs on a fixed interval using
//! `tokio::time::interval`.
//!
//! Each asset is claimed with `FOR UPDATE SKIP LOCKED` inside its own
//! transaction and its outcome committed before the next claim, so a
//! crashed tick loses at most one in-flight asset (which stays eligible)
//! and overlapping runs process disjoint assets. A storage failure marks
//! the asset `delete_failed` and the loop moves on — the next tick
//! retries it for as long as it keeps failing.

use std::sync::Arc;
use std::time::Duration;

use keepsake_core::storage::StorageBackend;
use keepsake_db::repositories::FileAssetRepo;
use sqlx::PgPool;
use tokio_util::sync::CancellationToken;

/// Run the asset purge loop until `cancel` is triggered.
pub async fn run(
    pool: PgPool,
    storage: Arc<dyn StorageBackend>,
    interval_secs: u64,
    batch_size: u32,
    cancel: CancellationToken,
) {
    tracing::info!(interval_secs, batch_size, "Asset purge job started");

    let mut interval = tokio::time::interval(Duration::from_secs(interval_secs));

    loop {
        tokio::select! {
            _ = cancel.cancelled() => {
                tracing::info!("Asset purge job stopping");
                break;
            }
            _ = interval.tick() => {
                match purge_expired_assets(&pool, storage.as_ref(), batch_size).await {
                    Ok(0) => tracing::debug!("Asset purge: nothing due"),
                    Ok(processed) => tracing::info!(processed, "Asset purge: tick complete"),
                    Err(e) => tracing::error!(error = %e, "Asset purge: tick failed"),
                }
            }
        }
    }
}

/// Process up to `batch_size` purge-eligible assets, returning how many
/// were attempted.
///
/// Safe to call repeatedly and from overlapping runs: claims are
/// lock-scoped, every transition commits with its claim, and assets that
/// fail in this run are excluded from further claims within it (they stay
/// due for the next run, `purge_after` untouched).
pub async fn purge_expired_assets(
    pool: &PgPool,
    storage: &dyn StorageBackend,
    batch_size: u32,
) -> Result<u32, sqlx::Error> {
    let mut processed = 0u32;
    let mut attempted: Vec<i64> = Vec::new();

    while processed < batch_size {
        let mut tx = pool.begin().await?;
        let Some(asset) = FileAssetRepo::claim_next_due_in_tx(&mut tx, &attempted).await? else {
            tx.rollback().await?;
            break;
        };

        match storage.delete(&asset.storage_path).await {
            Ok(()) => {
                FileAssetRepo::mark_deleted_in_tx(&mut tx, asset.id).await?;
                tracing::debug!(
                    asset_id = asset.id,
                    path = %asset.storage_path,
                    "Asset purge: file deleted"
                );
            }
            Err(e) => {
                // Isolated failure: record it and keep going with the
                // rest of the batch.
                FileAssetRepo::mark_failed_in_tx(&mut tx, asset.id, &e.to_string()).await?;
                tracing::warn!(
                    asset_id = asset.id,
                    path = %asset.storage_path,
                    error = %e,
                    "Asset purge: delete failed, will retry next tick"
                );
            }
        }

        tx.commit().await?;
        attempted.push(asset.id);
        processed += 1;
    }

    Ok(processed)
}
