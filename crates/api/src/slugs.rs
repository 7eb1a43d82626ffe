//! Slug allocation: availability checks and auto-generation.
//!
//! Normalization and validation are pure (`keepsake_core::slug`); this
//! module adds the database side. The availability check here is only the
//! early error path — the partial unique index re-arbitrates at commit,
//! and a violation there surfaces as the same duplicate-slug conflict.

use keepsake_core::error::CoreError;
use keepsake_core::slug;
use keepsake_core::types::DbId;
use keepsake_db::models::document::{Document, DocumentKind};
use keepsake_db::repositories::DocumentRepo;
use sqlx::PgPool;

use crate::error::AppResult;

/// How many fully random candidates to try before giving up.
const MAX_RANDOM_ATTEMPTS: usize = 4;

/// Error when no other document of this kind may hold `slug`.
pub async fn ensure_available(
    pool: &PgPool,
    kind: DocumentKind,
    slug: &str,
    excluding: Option<DbId>,
) -> AppResult<()> {
    if DocumentRepo::slug_taken(pool, kind, slug, excluding).await? {
        return Err(CoreError::Conflict(format!("Slug '{slug}' is already taken")).into());
    }
    Ok(())
}

/// Normalize, validate, and availability-check an explicitly requested
/// slug for the given document.
pub async fn resolve_requested(
    pool: &PgPool,
    kind: DocumentKind,
    document_id: DbId,
    raw: &str,
) -> AppResult<String> {
    let slug = slug::normalize_and_validate(raw)?;
    ensure_available(pool, kind, &slug, Some(document_id)).await?;
    Ok(slug)
}

/// Pick a slug for a document that has none and was published without an
/// explicit request.
///
/// Candidate order is a usability preference: the name-based candidate
/// reads best, a short random suffix rescues it when taken, and fully
/// random candidates always converge. Each candidate is verified
/// available immediately before use.
pub async fn auto_generate(
    pool: &PgPool,
    kind: DocumentKind,
    document: &Document,
) -> AppResult<String> {
    let content = &document.content;
    let name_parts: Vec<&str> = match kind {
        DocumentKind::Invitation => [&content.groom_name, &content.bride_name]
            .into_iter()
            .flatten()
            .map(String::as_str)
            .collect(),
        DocumentKind::ThankyouCard => content
            .recipient_name
            .as_deref()
            .into_iter()
            .collect(),
    };

    if let Some(base) = slug::from_names(&name_parts) {
        if !DocumentRepo::slug_taken(pool, kind, &base, Some(document.id)).await? {
            return Ok(base);
        }
        let suffixed = slug::with_short_token(&base);
        if !DocumentRepo::slug_taken(pool, kind, &suffixed, Some(document.id)).await? {
            return Ok(suffixed);
        }
    }

    for _ in 0..MAX_RANDOM_ATTEMPTS {
        let candidate = slug::random_candidate(kind.slug_prefix());
        if !DocumentRepo::slug_taken(pool, kind, &candidate, Some(document.id)).await? {
            return Ok(candidate);
        }
    }

    Err(CoreError::Internal("Failed to allocate a unique slug".into()).into())
}
