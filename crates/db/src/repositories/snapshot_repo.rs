//! Repository for the `publication_snapshots` table.
//!
//! Snapshots are append-only: created inside the publish transaction,
//! never updated, never deleted. Old versions stay readable so a future
//! rollback only needs to re-run the publish repoint against an older
//! snapshot.

use keepsake_core::content::DocumentContent;
use keepsake_core::types::DbId;
use sqlx::types::Json;
use sqlx::{PgPool, Postgres, Transaction};

use crate::models::snapshot::PublicationSnapshot;

const COLUMNS: &str = "\
    id, owner_type, document_id, version, content, \
    watermark_enabled, watermark_text, published_at, created_at";

/// Provides create and read operations for publication snapshots.
pub struct SnapshotRepo;

impl SnapshotRepo {
    /// The next version number for a document: highest existing + 1,
    /// starting at 1. Must run inside the publish transaction, after the
    /// document row is locked, so concurrent publishes cannot observe the
    /// same maximum.
    pub async fn next_version_in_tx(
        tx: &mut Transaction<'_, Postgres>,
        owner_type: &str,
        document_id: DbId,
    ) -> Result<i32, sqlx::Error> {
        let row: (i32,) = sqlx::query_as(
            "SELECT COALESCE(MAX(version), 0) + 1 FROM publication_snapshots \
             WHERE owner_type = $1 AND document_id = $2",
        )
        .bind(owner_type)
        .bind(document_id)
        .fetch_one(&mut **tx)
        .await?;
        Ok(row.0)
    }

    /// Insert an immutable snapshot row.
    pub async fn create_in_tx(
        tx: &mut Transaction<'_, Postgres>,
        owner_type: &str,
        document_id: DbId,
        version: i32,
        content: &DocumentContent,
        watermark_enabled: bool,
        watermark_text: Option<&str>,
    ) -> Result<PublicationSnapshot, sqlx::Error> {
        let query = format!(
            "INSERT INTO publication_snapshots \
                (owner_type, document_id, version, content, watermark_enabled, watermark_text) \
             VALUES ($1, $2, $3, $4, $5, $6) \
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, PublicationSnapshot>(&query)
            .bind(owner_type)
            .bind(document_id)
            .bind(version)
            .bind(Json(content))
            .bind(watermark_enabled)
            .bind(watermark_text)
            .fetch_one(&mut **tx)
            .await
    }

    /// Find a snapshot by ID.
    pub async fn find_by_id(
        pool: &PgPool,
        id: DbId,
    ) -> Result<Option<PublicationSnapshot>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM publication_snapshots WHERE id = $1");
        sqlx::query_as::<_, PublicationSnapshot>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// All versions of a document, newest first.
    pub async fn list_for_document(
        pool: &PgPool,
        owner_type: &str,
        document_id: DbId,
    ) -> Result<Vec<PublicationSnapshot>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM publication_snapshots \
             WHERE owner_type = $1 AND document_id = $2 \
             ORDER BY version DESC"
        );
        sqlx::query_as::<_, PublicationSnapshot>(&query)
            .bind(owner_type)
            .bind(document_id)
            .fetch_all(pool)
            .await
    }
}
