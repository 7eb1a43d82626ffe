//! Publication snapshot model.
//!
//! Snapshots are immutable copies of document content created at publish
//! time. History is append-only: versions per document start at 1 and
//! increase by 1, and no snapshot is ever mutated or deleted.

use keepsake_core::content::DocumentContent;
use keepsake_core::types::{DbId, Timestamp};
use serde::Serialize;
use sqlx::types::Json;
use sqlx::FromRow;

/// A row from the `publication_snapshots` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct PublicationSnapshot {
    pub id: DbId,
    pub owner_type: String,
    pub document_id: DbId,
    pub version: i32,
    pub content: Json<DocumentContent>,
    /// Watermark policy frozen from the publishing account's plan at the
    /// moment of publish.
    pub watermark_enabled: bool,
    pub watermark_text: Option<String>,
    pub published_at: Timestamp,
    pub created_at: Timestamp,
}
