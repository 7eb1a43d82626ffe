//! Integration tests for the file asset deletion state machine.

use chrono::Utc;
use sqlx::PgPool;

use keepsake_db::models::file_asset::{
    STATUS_ACTIVE, STATUS_DELETED, STATUS_DELETE_FAILED, STATUS_DELETE_PENDING,
};
use keepsake_db::repositories::file_asset_repo::RETENTION_DAYS;
use keepsake_db::repositories::{AccountRepo, FileAssetRepo};

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

async fn new_account(pool: &PgPool, email: &str) -> i64 {
    AccountRepo::create(pool, email, "Asset Tester")
        .await
        .unwrap()
        .id
}

async fn register(pool: &PgPool, account: i64, owner_id: i64, name: &str) -> i64 {
    FileAssetRepo::register(
        pool,
        "invitation",
        owner_id,
        account,
        &format!("uploads/{account}/{name}"),
        &format!("http://media.local/uploads/{account}/{name}"),
    )
    .await
    .unwrap()
    .expect("asset should be registered")
    .id
}

/// Force an asset's purge window into the past so it becomes due.
async fn make_due(pool: &PgPool, asset_id: i64) {
    sqlx::query("UPDATE file_assets SET purge_after = NOW() - INTERVAL '1 hour' WHERE id = $1")
        .bind(asset_id)
        .execute(pool)
        .await
        .unwrap();
}

// ---------------------------------------------------------------------------
// Test: register creates active rows, blanks are a no-op
// ---------------------------------------------------------------------------

#[sqlx::test]
async fn test_register_creates_active_asset(pool: PgPool) {
    let account = new_account(&pool, "register@example.com").await;

    let asset = FileAssetRepo::register(
        &pool,
        "invitation",
        1,
        account,
        "uploads/a/photo.jpg",
        "http://media.local/uploads/a/photo.jpg",
    )
    .await
    .unwrap()
    .expect("asset registered");

    assert_eq!(asset.status, STATUS_ACTIVE);
    assert!(asset.purge_after.is_none());
    assert!(asset.deleted_at.is_none());
}

#[sqlx::test]
async fn test_register_ignores_blank_path_or_url(pool: PgPool) {
    let account = new_account(&pool, "blank@example.com").await;

    let no_path = FileAssetRepo::register(&pool, "invitation", 1, account, "  ", "http://u")
        .await
        .unwrap();
    assert!(no_path.is_none());

    let no_url = FileAssetRepo::register(&pool, "invitation", 1, account, "uploads/x", "")
        .await
        .unwrap();
    assert!(no_url.is_none());
}

// ---------------------------------------------------------------------------
// Test: schedule_deletion queues live assets with a grace window
// ---------------------------------------------------------------------------

#[sqlx::test]
async fn test_schedule_deletion_queues_live_assets(pool: PgPool) {
    let account = new_account(&pool, "schedule@example.com").await;
    let first = register(&pool, account, 7, "one.jpg").await;
    let second = register(&pool, account, 7, "two.jpg").await;
    // Belongs to another document; must not be touched.
    let other_owner = register(&pool, account, 8, "other.jpg").await;

    let queued = FileAssetRepo::schedule_deletion(&pool, "invitation", 7)
        .await
        .unwrap();
    assert_eq!(queued, 2);

    for id in [first, second] {
        let asset = FileAssetRepo::find_by_id(&pool, id).await.unwrap().unwrap();
        assert_eq!(asset.status, STATUS_DELETE_PENDING);
        assert!(asset.delete_requested_at.is_some());

        let purge_after = asset.purge_after.expect("purge window set");
        let expected = Utc::now() + chrono::Duration::days(RETENTION_DAYS as i64);
        let drift = (purge_after - expected).num_seconds().abs();
        assert!(drift < 60, "purge_after should be ~{RETENTION_DAYS} days out");
    }

    let untouched = FileAssetRepo::find_by_id(&pool, other_owner)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(untouched.status, STATUS_ACTIVE);
}

#[sqlx::test]
async fn test_schedule_deletion_requeues_failed_assets(pool: PgPool) {
    let account = new_account(&pool, "requeue@example.com").await;
    let asset_id = register(&pool, account, 9, "flaky.jpg").await;

    // Drive the asset into delete_failed through the claim path.
    FileAssetRepo::schedule_deletion(&pool, "invitation", 9)
        .await
        .unwrap();
    make_due(&pool, asset_id).await;
    let mut tx = pool.begin().await.unwrap();
    let claimed = FileAssetRepo::claim_next_due_in_tx(&mut tx, &[])
        .await
        .unwrap()
        .expect("due asset claimed");
    FileAssetRepo::mark_failed_in_tx(&mut tx, claimed.id, "bucket unreachable")
        .await
        .unwrap();
    tx.commit().await.unwrap();

    // Re-scheduling (e.g. the owner is deleted again after a restore)
    // clears the error and resets the grace window.
    let queued = FileAssetRepo::schedule_deletion(&pool, "invitation", 9)
        .await
        .unwrap();
    assert_eq!(queued, 1);

    let asset = FileAssetRepo::find_by_id(&pool, asset_id)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(asset.status, STATUS_DELETE_PENDING);
    assert!(asset.last_error.is_none(), "error cleared on re-schedule");
}

// ---------------------------------------------------------------------------
// Test: claim honors the purge window and ordering
// ---------------------------------------------------------------------------

#[sqlx::test]
async fn test_claim_skips_assets_inside_grace_window(pool: PgPool) {
    let account = new_account(&pool, "window@example.com").await;
    register(&pool, account, 11, "graceful.jpg").await;

    FileAssetRepo::schedule_deletion(&pool, "invitation", 11)
        .await
        .unwrap();

    // purge_after is ~7 days out; nothing is due.
    let mut tx = pool.begin().await.unwrap();
    let claimed = FileAssetRepo::claim_next_due_in_tx(&mut tx, &[]).await.unwrap();
    assert!(claimed.is_none(), "asset inside grace window must not be claimed");
    tx.rollback().await.unwrap();
}

#[sqlx::test]
async fn test_claim_orders_oldest_due_first(pool: PgPool) {
    let account = new_account(&pool, "ordering@example.com").await;
    let newer = register(&pool, account, 12, "newer.jpg").await;
    let older = register(&pool, account, 12, "older.jpg").await;

    FileAssetRepo::schedule_deletion(&pool, "invitation", 12)
        .await
        .unwrap();
    sqlx::query("UPDATE file_assets SET purge_after = NOW() - INTERVAL '1 hour' WHERE id = $1")
        .bind(newer)
        .execute(&pool)
        .await
        .unwrap();
    sqlx::query("UPDATE file_assets SET purge_after = NOW() - INTERVAL '2 hours' WHERE id = $1")
        .bind(older)
        .execute(&pool)
        .await
        .unwrap();

    let mut tx = pool.begin().await.unwrap();
    let claimed = FileAssetRepo::claim_next_due_in_tx(&mut tx, &[])
        .await
        .unwrap()
        .unwrap();
    assert_eq!(claimed.id, older, "longest-due asset claimed first");
    tx.rollback().await.unwrap();
}

#[sqlx::test]
async fn test_concurrent_claims_take_disjoint_assets(pool: PgPool) {
    let account = new_account(&pool, "disjoint@example.com").await;
    let a = register(&pool, account, 13, "a.jpg").await;
    let b = register(&pool, account, 13, "b.jpg").await;

    FileAssetRepo::schedule_deletion(&pool, "invitation", 13)
        .await
        .unwrap();
    make_due(&pool, a).await;
    make_due(&pool, b).await;

    // First claim holds its row lock; a second transaction must skip it.
    let mut first = pool.begin().await.unwrap();
    let claimed_first = FileAssetRepo::claim_next_due_in_tx(&mut first, &[])
        .await
        .unwrap()
        .unwrap();

    let mut second = pool.begin().await.unwrap();
    let claimed_second = FileAssetRepo::claim_next_due_in_tx(&mut second, &[])
        .await
        .unwrap()
        .unwrap();

    assert_ne!(
        claimed_first.id, claimed_second.id,
        "SKIP LOCKED must hand out disjoint assets"
    );

    first.rollback().await.unwrap();
    second.rollback().await.unwrap();
}

// ---------------------------------------------------------------------------
// Test: purge outcomes
// ---------------------------------------------------------------------------

#[sqlx::test]
async fn test_mark_deleted_finalizes_asset(pool: PgPool) {
    let account = new_account(&pool, "done@example.com").await;
    let asset_id = register(&pool, account, 14, "bye.jpg").await;

    FileAssetRepo::schedule_deletion(&pool, "invitation", 14)
        .await
        .unwrap();
    make_due(&pool, asset_id).await;

    let mut tx = pool.begin().await.unwrap();
    let claimed = FileAssetRepo::claim_next_due_in_tx(&mut tx, &[])
        .await
        .unwrap()
        .unwrap();
    FileAssetRepo::mark_deleted_in_tx(&mut tx, claimed.id).await.unwrap();
    tx.commit().await.unwrap();

    let asset = FileAssetRepo::find_by_id(&pool, asset_id)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(asset.status, STATUS_DELETED);
    assert!(asset.deleted_at.is_some());
    assert!(asset.last_error.is_none());

    // Terminal: no longer claimable even though purge_after is past.
    let mut tx = pool.begin().await.unwrap();
    assert!(FileAssetRepo::claim_next_due_in_tx(&mut tx, &[]).await.unwrap().is_none());
    tx.rollback().await.unwrap();
}

#[sqlx::test]
async fn test_mark_failed_keeps_asset_eligible(pool: PgPool) {
    let account = new_account(&pool, "retry@example.com").await;
    let asset_id = register(&pool, account, 15, "stuck.jpg").await;

    FileAssetRepo::schedule_deletion(&pool, "invitation", 15)
        .await
        .unwrap();
    make_due(&pool, asset_id).await;

    let before = FileAssetRepo::find_by_id(&pool, asset_id)
        .await
        .unwrap()
        .unwrap();

    let mut tx = pool.begin().await.unwrap();
    let claimed = FileAssetRepo::claim_next_due_in_tx(&mut tx, &[])
        .await
        .unwrap()
        .unwrap();
    FileAssetRepo::mark_failed_in_tx(&mut tx, claimed.id, "storage backend down")
        .await
        .unwrap();
    tx.commit().await.unwrap();

    let failed = FileAssetRepo::find_by_id(&pool, asset_id)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(failed.status, STATUS_DELETE_FAILED);
    assert_eq!(failed.last_error.as_deref(), Some("storage backend down"));
    assert_eq!(
        failed.purge_after, before.purge_after,
        "failure must not move the purge window"
    );

    // Still due: the next tick picks it up again.
    let mut tx = pool.begin().await.unwrap();
    let reclaimed = FileAssetRepo::claim_next_due_in_tx(&mut tx, &[])
        .await
        .unwrap()
        .expect("failed asset is retried");
    assert_eq!(reclaimed.id, asset_id);
    tx.rollback().await.unwrap();
}

// ---------------------------------------------------------------------------
// Test: ownership vetting of referenced URLs
// ---------------------------------------------------------------------------

#[sqlx::test]
async fn test_is_owned_active_url(pool: PgPool) {
    let owner = new_account(&pool, "owner@example.com").await;
    let stranger = new_account(&pool, "stranger@example.com").await;
    register(&pool, owner, 16, "mine.jpg").await;
    let url = format!("http://media.local/uploads/{owner}/mine.jpg");

    assert!(FileAssetRepo::is_owned_active_url(&pool, owner, &url)
        .await
        .unwrap());
    assert!(!FileAssetRepo::is_owned_active_url(&pool, stranger, &url)
        .await
        .unwrap());

    // Once queued for deletion the URL is no longer a valid reference.
    FileAssetRepo::schedule_deletion(&pool, "invitation", 16)
        .await
        .unwrap();
    assert!(!FileAssetRepo::is_owned_active_url(&pool, owner, &url)
        .await
        .unwrap());
}
