//! The publication engine.
//!
//! Publishing converts the current draft content into an immutable,
//! versioned snapshot and atomically repoints the document's published
//! reference. The whole operation runs in one transaction under the
//! document's row lock, so concurrent publishes of the same document
//! serialize: no duplicate versions, no torn slug/pointer updates.

use keepsake_core::error::CoreError;
use keepsake_core::plan::QuotaAction;
use keepsake_core::slug;
use keepsake_core::types::DbId;
use keepsake_db::models::account::Account;
use keepsake_db::models::document::{Document, DocumentKind};
use keepsake_db::repositories::{DocumentRepo, SnapshotRepo};
use serde::Serialize;

use crate::error::{AppError, AppResult};
use crate::quota;
use crate::slugs;
use crate::state::AppState;

/// Result of a successful publish.
#[derive(Debug, Clone, Serialize)]
pub struct PublishOutcome {
    pub slug: String,
    pub share_url: String,
    pub version: i32,
    pub snapshot_id: DbId,
}

/// Publish a document, optionally under an explicitly requested slug.
///
/// Order of operations:
/// 1. quota pre-check for publish (fails fast, nothing changed);
/// 2. slug resolution: explicit request, else the document's existing
///    slug re-validated, else auto-generation;
/// 3. effective plan resolved now — its watermark policy is frozen into
///    this snapshot only;
/// 4. under the document row lock: next version, snapshot insert,
///    slug/pointer repoint, publish counter — all or nothing.
///
/// Re-publishing appends a new version; earlier snapshots are retained
/// untouched.
pub async fn publish(
    state: &AppState,
    kind: DocumentKind,
    document_id: DbId,
    account: &Account,
    requested_slug: Option<&str>,
) -> AppResult<PublishOutcome> {
    quota::check(&state.pool, account, QuotaAction::Publish).await?;

    let document = DocumentRepo::find_by_id(&state.pool, kind, document_id)
        .await?
        .ok_or(CoreError::NotFound {
            entity: kind.entity(),
            id: document_id,
        })?;
    owned_by(&document, account)?;
    if document.is_deleted() {
        return Err(CoreError::Conflict("A deleted document cannot be published".into()).into());
    }

    let resolved_slug = match requested_slug {
        Some(raw) => slugs::resolve_requested(&state.pool, kind, document_id, raw).await?,
        None => match document.slug.as_deref() {
            // Re-validate and re-check the held slug in case rules changed
            // or availability shifted while unpublished.
            Some(existing) => {
                slug::validate(existing)?;
                slugs::ensure_available(&state.pool, kind, existing, Some(document_id)).await?;
                existing.to_string()
            }
            None => slugs::auto_generate(&state.pool, kind, &document).await?,
        },
    };

    let plan = quota::effective_plan(&state.pool, account.id).await?;

    let mut tx = state.pool.begin().await?;

    let locked = DocumentRepo::lock_in_tx(&mut tx, kind, document_id)
        .await?
        .ok_or(CoreError::NotFound {
            entity: kind.entity(),
            id: document_id,
        })?;
    // Re-check under the lock: a concurrent delete may have won the race.
    if locked.is_deleted() {
        return Err(CoreError::Conflict("A deleted document cannot be published".into()).into());
    }

    let version = SnapshotRepo::next_version_in_tx(&mut tx, kind.owner_type(), document_id).await?;
    let snapshot = SnapshotRepo::create_in_tx(
        &mut tx,
        kind.owner_type(),
        document_id,
        version,
        &locked.content,
        plan.watermark_enabled,
        plan.watermark_text.as_deref(),
    )
    .await?;

    DocumentRepo::set_published_in_tx(&mut tx, kind, document_id, &resolved_slug, snapshot.id)
        .await?;

    quota::record_in_tx(&mut tx, account, QuotaAction::Publish).await?;

    tx.commit().await?;

    tracing::info!(
        document_id,
        kind = kind.owner_type(),
        slug = %resolved_slug,
        version,
        "Document published"
    );

    Ok(PublishOutcome {
        share_url: share_url(state, kind, &resolved_slug),
        slug: resolved_slug,
        version,
        snapshot_id: snapshot.id,
    })
}

/// Take a document offline: clears the published reference only. Slug,
/// content, and snapshot history are untouched; the document remains
/// editable and can be re-published later.
pub async fn unpublish(
    state: &AppState,
    kind: DocumentKind,
    document_id: DbId,
    account: &Account,
) -> AppResult<Document> {
    let document = DocumentRepo::find_by_id(&state.pool, kind, document_id)
        .await?
        .ok_or(CoreError::NotFound {
            entity: kind.entity(),
            id: document_id,
        })?;
    owned_by(&document, account)?;

    let updated = DocumentRepo::clear_published(&state.pool, kind, document_id)
        .await?
        .ok_or(CoreError::NotFound {
            entity: kind.entity(),
            id: document_id,
        })?;

    tracing::info!(document_id, kind = kind.owner_type(), "Document unpublished");
    Ok(updated)
}

/// The public share URL for a published slug.
pub fn share_url(state: &AppState, kind: DocumentKind, slug: &str) -> String {
    format!(
        "{}/{}/{slug}",
        state.config.frontend_origin,
        kind.share_path()
    )
}

/// Error unless the account owns the document.
pub fn owned_by(document: &Document, account: &Account) -> Result<(), AppError> {
    if document.account_id != account.id {
        return Err(
            CoreError::Forbidden("Document belongs to a different account".into()).into(),
        );
    }
    Ok(())
}
