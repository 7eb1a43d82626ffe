//! Repository for the `invitations` and `thankyou_cards` tables.
//!
//! Both tables share one row shape; [`DocumentKind`] selects the table
//! name. Table names are interpolated only from the closed enum, never
//! from request input. Slug uniqueness is ultimately enforced by the
//! partial unique indexes (`uq_invitations_slug`,
//! `uq_thankyou_cards_slug`); the availability check here is the early
//! error path.

use keepsake_core::content::{DocStatus, DocumentContent};
use keepsake_core::types::DbId;
use sqlx::types::Json;
use sqlx::{PgPool, Postgres, Transaction};

use crate::models::document::{Document, DocumentKind};

/// Column list shared by both document tables.
const COLUMNS: &str = "id, account_id, slug, content, published_snapshot_id, created_at, updated_at";

/// Provides CRUD and publish-pointer operations for documents.
pub struct DocumentRepo;

impl DocumentRepo {
    /// Insert a new draft for an account.
    pub async fn create(
        pool: &PgPool,
        kind: DocumentKind,
        account_id: DbId,
        content: &DocumentContent,
    ) -> Result<Document, sqlx::Error> {
        let query = format!(
            "INSERT INTO {table} (account_id, content) VALUES ($1, $2) RETURNING {COLUMNS}",
            table = kind.table()
        );
        sqlx::query_as::<_, Document>(&query)
            .bind(account_id)
            .bind(Json(content))
            .fetch_one(pool)
            .await
    }

    /// Find a document by ID regardless of lifecycle status.
    pub async fn find_by_id(
        pool: &PgPool,
        kind: DocumentKind,
        id: DbId,
    ) -> Result<Option<Document>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM {table} WHERE id = $1",
            table = kind.table()
        );
        sqlx::query_as::<_, Document>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// Find a non-deleted document by ID.
    pub async fn find_active(
        pool: &PgPool,
        kind: DocumentKind,
        id: DbId,
    ) -> Result<Option<Document>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM {table} \
             WHERE id = $1 AND content->>'status' IS DISTINCT FROM $2",
            table = kind.table()
        );
        sqlx::query_as::<_, Document>(&query)
            .bind(id)
            .bind(DocStatus::Deleted.as_str())
            .fetch_optional(pool)
            .await
    }

    /// List an account's non-deleted documents, newest first.
    pub async fn list_for_account(
        pool: &PgPool,
        kind: DocumentKind,
        account_id: DbId,
    ) -> Result<Vec<Document>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM {table} \
             WHERE account_id = $1 AND content->>'status' IS DISTINCT FROM $2 \
             ORDER BY created_at DESC",
            table = kind.table()
        );
        sqlx::query_as::<_, Document>(&query)
            .bind(account_id)
            .bind(DocStatus::Deleted.as_str())
            .fetch_all(pool)
            .await
    }

    /// Find a document by its slug (published-page lookup).
    pub async fn find_by_slug(
        pool: &PgPool,
        kind: DocumentKind,
        slug: &str,
    ) -> Result<Option<Document>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM {table} WHERE slug = $1",
            table = kind.table()
        );
        sqlx::query_as::<_, Document>(&query)
            .bind(slug)
            .fetch_optional(pool)
            .await
    }

    /// Whether another document of this kind already holds `slug`.
    ///
    /// `excluding` skips the document being updated so re-publishing under
    /// its own slug is not a conflict. This is the pre-check; the unique
    /// index re-arbitrates at commit.
    pub async fn slug_taken(
        pool: &PgPool,
        kind: DocumentKind,
        slug: &str,
        excluding: Option<DbId>,
    ) -> Result<bool, sqlx::Error> {
        let query = format!(
            "SELECT EXISTS(\
                SELECT 1 FROM {table} WHERE slug = $1 AND ($2::bigint IS NULL OR id <> $2)\
             )",
            table = kind.table()
        );
        let row: (bool,) = sqlx::query_as(&query)
            .bind(slug)
            .bind(excluding)
            .fetch_one(pool)
            .await?;
        Ok(row.0)
    }

    /// Replace a draft's content blob.
    pub async fn update_content(
        pool: &PgPool,
        kind: DocumentKind,
        id: DbId,
        content: &DocumentContent,
    ) -> Result<Option<Document>, sqlx::Error> {
        let query = format!(
            "UPDATE {table} SET content = $2 WHERE id = $1 RETURNING {COLUMNS}",
            table = kind.table()
        );
        sqlx::query_as::<_, Document>(&query)
            .bind(id)
            .bind(Json(content))
            .fetch_optional(pool)
            .await
    }

    /// Lock a document row for the remainder of the transaction.
    ///
    /// Serializes publishes (and the delete flow) per document: any
    /// concurrent writer touching `slug`/`published_snapshot_id` blocks
    /// here until the transaction commits or rolls back.
    pub async fn lock_in_tx(
        tx: &mut Transaction<'_, Postgres>,
        kind: DocumentKind,
        id: DbId,
    ) -> Result<Option<Document>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM {table} WHERE id = $1 FOR UPDATE",
            table = kind.table()
        );
        sqlx::query_as::<_, Document>(&query)
            .bind(id)
            .fetch_optional(&mut **tx)
            .await
    }

    /// Point a document at its new published snapshot and slug.
    ///
    /// The slug write races other publishers only through the unique
    /// index; a violation surfaces as a database error the caller maps to
    /// a duplicate-slug conflict.
    pub async fn set_published_in_tx(
        tx: &mut Transaction<'_, Postgres>,
        kind: DocumentKind,
        id: DbId,
        slug: &str,
        snapshot_id: DbId,
    ) -> Result<Document, sqlx::Error> {
        let query = format!(
            "UPDATE {table} SET slug = $2, published_snapshot_id = $3 \
             WHERE id = $1 RETURNING {COLUMNS}",
            table = kind.table()
        );
        sqlx::query_as::<_, Document>(&query)
            .bind(id)
            .bind(slug)
            .bind(snapshot_id)
            .fetch_one(&mut **tx)
            .await
    }

    /// Clear the published-snapshot reference. Slug, content, and history
    /// are untouched; the document stays editable.
    pub async fn clear_published(
        pool: &PgPool,
        kind: DocumentKind,
        id: DbId,
    ) -> Result<Option<Document>, sqlx::Error> {
        let query = format!(
            "UPDATE {table} SET published_snapshot_id = NULL \
             WHERE id = $1 RETURNING {COLUMNS}",
            table = kind.table()
        );
        sqlx::query_as::<_, Document>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// Soft-delete: release the slug and mark the content blob deleted.
    ///
    /// Callers must have verified the document is not published; the row
    /// (and its snapshot history) is retained forever.
    pub async fn soft_delete_in_tx(
        tx: &mut Transaction<'_, Postgres>,
        kind: DocumentKind,
        id: DbId,
        content: &DocumentContent,
    ) -> Result<Document, sqlx::Error> {
        let query = format!(
            "UPDATE {table} SET slug = NULL, content = $2 \
             WHERE id = $1 RETURNING {COLUMNS}",
            table = kind.table()
        );
        sqlx::query_as::<_, Document>(&query)
            .bind(id)
            .bind(Json(content))
            .fetch_one(&mut **tx)
            .await
    }
}
