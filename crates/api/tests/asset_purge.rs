//! Tests for the background asset purge: grace-window respect, physical
//! deletion, isolated failure handling, and batch limits.

use async_trait::async_trait;
use sqlx::PgPool;

use keepsake_api::background::asset_purge::purge_expired_assets;
use keepsake_core::storage::{LocalStorage, StorageBackend, StorageError};
use keepsake_db::models::file_asset::{
    STATUS_ACTIVE, STATUS_DELETED, STATUS_DELETE_FAILED, STATUS_DELETE_PENDING,
};
use keepsake_db::repositories::{AccountRepo, FileAssetRepo};

/// A storage backend whose deletes always fail, simulating an outage.
struct FailingStorage;

#[async_trait]
impl StorageBackend for FailingStorage {
    async fn store(
        &self,
        _path: &str,
        _bytes: &[u8],
        _content_type: &str,
    ) -> Result<String, StorageError> {
        Err(StorageError::Backend("simulated outage".into()))
    }

    async fn delete(&self, _path: &str) -> Result<(), StorageError> {
        Err(StorageError::Backend("simulated outage".into()))
    }
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

async fn new_account(pool: &PgPool, email: &str) -> i64 {
    AccountRepo::create(pool, email, "Purge Tester")
        .await
        .unwrap()
        .id
}

async fn register(pool: &PgPool, account: i64, owner_id: i64, path: &str) -> i64 {
    FileAssetRepo::register(
        pool,
        "invitation",
        owner_id,
        account,
        path,
        &format!("http://media.local/{path}"),
    )
    .await
    .unwrap()
    .unwrap()
    .id
}

async fn make_due(pool: &PgPool, asset_id: i64) {
    sqlx::query("UPDATE file_assets SET purge_after = NOW() - INTERVAL '1 hour' WHERE id = $1")
        .bind(asset_id)
        .execute(pool)
        .await
        .unwrap();
}

async fn status_of(pool: &PgPool, asset_id: i64) -> String {
    FileAssetRepo::find_by_id(pool, asset_id)
        .await
        .unwrap()
        .unwrap()
        .status
}

// ---------------------------------------------------------------------------
// Test: assets inside the grace window are left alone
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../db/migrations")]
async fn test_purge_respects_grace_window(pool: PgPool) {
    let account = new_account(&pool, "grace@purge.test").await;
    let asset = register(&pool, account, 1, "uploads/grace/a.jpg").await;
    FileAssetRepo::schedule_deletion(&pool, "invitation", 1)
        .await
        .unwrap();

    let dir = tempfile::tempdir().unwrap();
    let storage = LocalStorage::new(dir.path(), "http://media.local");
    let processed = purge_expired_assets(&pool, &storage, 10).await.unwrap();

    assert_eq!(processed, 0);
    assert_eq!(status_of(&pool, asset).await, STATUS_DELETE_PENDING);
}

// ---------------------------------------------------------------------------
// Test: due assets are deleted from storage and finalized
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../db/migrations")]
async fn test_purge_deletes_due_assets(pool: PgPool) {
    let dir = tempfile::tempdir().unwrap();
    let storage = LocalStorage::new(dir.path(), "http://media.local");

    // Put a real file behind the asset row.
    storage
        .store("uploads/due/photo.jpg", b"bytes", "image/jpeg")
        .await
        .unwrap();

    let account = new_account(&pool, "due@purge.test").await;
    let asset = register(&pool, account, 2, "uploads/due/photo.jpg").await;
    FileAssetRepo::schedule_deletion(&pool, "invitation", 2)
        .await
        .unwrap();
    make_due(&pool, asset).await;

    let processed = purge_expired_assets(&pool, &storage, 10).await.unwrap();
    assert_eq!(processed, 1);

    assert!(!dir.path().join("uploads/due/photo.jpg").exists());
    let row = FileAssetRepo::find_by_id(&pool, asset).await.unwrap().unwrap();
    assert_eq!(row.status, STATUS_DELETED);
    assert!(row.deleted_at.is_some());
    assert!(row.last_error.is_none());
}

#[sqlx::test(migrations = "../db/migrations")]
async fn test_purge_treats_missing_file_as_success(pool: PgPool) {
    let dir = tempfile::tempdir().unwrap();
    let storage = LocalStorage::new(dir.path(), "http://media.local");

    let account = new_account(&pool, "missing@purge.test").await;
    // Registered path was never written (or a previous half-completed
    // purge already removed it).
    let asset = register(&pool, account, 3, "uploads/missing/gone.jpg").await;
    FileAssetRepo::schedule_deletion(&pool, "invitation", 3)
        .await
        .unwrap();
    make_due(&pool, asset).await;

    let processed = purge_expired_assets(&pool, &storage, 10).await.unwrap();
    assert_eq!(processed, 1);
    assert_eq!(status_of(&pool, asset).await, STATUS_DELETED);
}

// ---------------------------------------------------------------------------
// Test: failures are recorded, isolated, and retried
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../db/migrations")]
async fn test_purge_failure_is_recorded_and_retried(pool: PgPool) {
    let account = new_account(&pool, "outage@purge.test").await;
    let asset = register(&pool, account, 4, "uploads/outage/stuck.jpg").await;
    FileAssetRepo::schedule_deletion(&pool, "invitation", 4)
        .await
        .unwrap();
    make_due(&pool, asset).await;

    let before = FileAssetRepo::find_by_id(&pool, asset).await.unwrap().unwrap();

    // Outage: the attempt fails but the tick completes.
    let processed = purge_expired_assets(&pool, &FailingStorage, 10).await.unwrap();
    assert_eq!(processed, 1);

    let failed = FileAssetRepo::find_by_id(&pool, asset).await.unwrap().unwrap();
    assert_eq!(failed.status, STATUS_DELETE_FAILED);
    assert!(failed
        .last_error
        .as_deref()
        .unwrap()
        .contains("simulated outage"));
    assert_eq!(
        failed.purge_after, before.purge_after,
        "failure must not push the retry out"
    );

    // Next tick with a healthy backend: the retry converges.
    let dir = tempfile::tempdir().unwrap();
    let storage = LocalStorage::new(dir.path(), "http://media.local");
    let processed = purge_expired_assets(&pool, &storage, 10).await.unwrap();
    assert_eq!(processed, 1);
    assert_eq!(status_of(&pool, asset).await, STATUS_DELETED);
}

#[sqlx::test(migrations = "../db/migrations")]
async fn test_purge_failure_does_not_block_batch(pool: PgPool) {
    let dir = tempfile::tempdir().unwrap();
    let storage = LocalStorage::new(dir.path(), "http://media.local");

    let account = new_account(&pool, "batchfail@purge.test").await;
    let first = register(&pool, account, 5, "uploads/batchfail/a.jpg").await;
    let second = register(&pool, account, 5, "uploads/batchfail/b.jpg").await;
    FileAssetRepo::schedule_deletion(&pool, "invitation", 5)
        .await
        .unwrap();
    // Make `first` due earlier so it is attempted first.
    sqlx::query("UPDATE file_assets SET purge_after = NOW() - INTERVAL '2 hours' WHERE id = $1")
        .bind(first)
        .execute(&pool)
        .await
        .unwrap();
    make_due(&pool, second).await;

    // Every delete fails, yet both assets get their attempt.
    let processed = purge_expired_assets(&pool, &FailingStorage, 10).await.unwrap();
    assert_eq!(processed, 2, "one failing asset must not starve the rest");
    assert_eq!(status_of(&pool, first).await, STATUS_DELETE_FAILED);
    assert_eq!(status_of(&pool, second).await, STATUS_DELETE_FAILED);

    // Healthy again: both converge.
    let processed = purge_expired_assets(&pool, &storage, 10).await.unwrap();
    assert_eq!(processed, 2);
    assert_eq!(status_of(&pool, first).await, STATUS_DELETED);
    assert_eq!(status_of(&pool, second).await, STATUS_DELETED);
}

// ---------------------------------------------------------------------------
// Test: batch size bounds one tick
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../db/migrations")]
async fn test_purge_honors_batch_size(pool: PgPool) {
    let dir = tempfile::tempdir().unwrap();
    let storage = LocalStorage::new(dir.path(), "http://media.local");

    let account = new_account(&pool, "batch@purge.test").await;
    for i in 0..3 {
        let id = register(&pool, account, 6, &format!("uploads/batch/{i}.jpg")).await;
        FileAssetRepo::schedule_deletion(&pool, "invitation", 6)
            .await
            .unwrap();
        make_due(&pool, id).await;
    }

    let processed = purge_expired_assets(&pool, &storage, 2).await.unwrap();
    assert_eq!(processed, 2);

    let processed = purge_expired_assets(&pool, &storage, 2).await.unwrap();
    assert_eq!(processed, 1, "remainder handled on the next tick");
}

// ---------------------------------------------------------------------------
// Test: active assets are never touched
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../db/migrations")]
async fn test_purge_never_touches_active_assets(pool: PgPool) {
    let dir = tempfile::tempdir().unwrap();
    let storage = LocalStorage::new(dir.path(), "http://media.local");
    storage
        .store("uploads/live/keep.jpg", b"bytes", "image/jpeg")
        .await
        .unwrap();

    let account = new_account(&pool, "live@purge.test").await;
    let asset = register(&pool, account, 7, "uploads/live/keep.jpg").await;
    // No deletion scheduled.

    let processed = purge_expired_assets(&pool, &storage, 10).await.unwrap();
    assert_eq!(processed, 0);
    assert_eq!(status_of(&pool, asset).await, STATUS_ACTIVE);
    assert!(dir.path().join("uploads/live/keep.jpg").exists());
}
