//! Kind-generic document orchestration.
//!
//! This is the thin orchestration layer behind both document resources: it wires
//! the quota gate, slug allocator, publication engine, and asset lifecycle
//! around plain CRUD. All functions take the [`DocumentKind`] so the
//! invitation and thank-you-card resources share one implementation.

use axum::extract::Multipart;
use keepsake_core::content::{ContentPatch, DocumentContent};
use keepsake_core::error::CoreError;
use keepsake_core::plan::QuotaAction;
use keepsake_core::storage::upload_path;
use keepsake_core::types::DbId;
use keepsake_db::models::account::Account;
use keepsake_db::models::document::{Document, DocumentKind};
use keepsake_db::models::file_asset::FileAsset;
use keepsake_db::models::snapshot::PublicationSnapshot;
use keepsake_db::repositories::{DocumentRepo, FileAssetRepo, SnapshotRepo};

use serde::Deserialize;

use crate::error::{AppError, AppResult};
use crate::publish::{self, owned_by};
use crate::quota;
use crate::state::AppState;

/// Body of a publish request. The slug is optional: omitted, the
/// document's existing slug is reused or one is auto-generated.
#[derive(Debug, Default, Deserialize)]
pub struct PublishRequest {
    pub slug: Option<String>,
}

/// Create a draft, optionally pre-filled from an initial content patch.
pub async fn create(
    state: &AppState,
    account: &Account,
    kind: DocumentKind,
    patch: ContentPatch,
) -> AppResult<Document> {
    quota::check(&state.pool, account, QuotaAction::Create).await?;

    vet_referenced_urls(state, account, &patch).await?;
    let mut content = DocumentContent::default();
    content.apply(patch);

    let document = DocumentRepo::create(&state.pool, kind, account.id, &content).await?;
    quota::record(&state.pool, account, QuotaAction::Create).await?;

    tracing::info!(document_id = document.id, kind = kind.owner_type(), "Draft created");
    Ok(document)
}

/// Fetch one of the account's non-deleted documents.
pub async fn get(
    state: &AppState,
    account: &Account,
    kind: DocumentKind,
    id: DbId,
) -> AppResult<Document> {
    let document = DocumentRepo::find_active(&state.pool, kind, id)
        .await?
        .ok_or(CoreError::NotFound {
            entity: kind.entity(),
            id,
        })?;
    owned_by(&document, account)?;
    Ok(document)
}

/// List the account's non-deleted documents, newest first.
pub async fn list(
    state: &AppState,
    account: &Account,
    kind: DocumentKind,
) -> AppResult<Vec<Document>> {
    Ok(DocumentRepo::list_for_account(&state.pool, kind, account.id).await?)
}

/// Apply a field-wise content patch to a draft.
///
/// Referenced upload URLs must belong to the acting account and still be
/// live; everything else is free-form.
pub async fn update(
    state: &AppState,
    account: &Account,
    kind: DocumentKind,
    id: DbId,
    patch: ContentPatch,
) -> AppResult<Document> {
    quota::check(&state.pool, account, QuotaAction::Edit).await?;

    let document = get(state, account, kind, id).await?;
    vet_referenced_urls(state, account, &patch).await?;

    let mut content = document.content.0.clone();
    content.apply(patch);

    let updated = DocumentRepo::update_content(&state.pool, kind, id, &content)
        .await?
        .ok_or(CoreError::NotFound {
            entity: kind.entity(),
            id,
        })?;
    quota::record(&state.pool, account, QuotaAction::Edit).await?;
    Ok(updated)
}

/// Soft-delete a document and queue its uploads for purging.
///
/// Rejected while the document is published — unpublish first. Deleting
/// an already-deleted document is a no-op. The row itself is retained
/// forever; only the slug is released.
pub async fn delete(
    state: &AppState,
    account: &Account,
    kind: DocumentKind,
    id: DbId,
) -> AppResult<()> {
    let document = DocumentRepo::find_by_id(&state.pool, kind, id)
        .await?
        .ok_or(CoreError::NotFound {
            entity: kind.entity(),
            id,
        })?;
    owned_by(&document, account)?;
    if document.is_deleted() {
        return Ok(());
    }

    let mut tx = state.pool.begin().await?;

    // The row lock serializes against a concurrent publish; re-check the
    // published pointer under it.
    let locked = DocumentRepo::lock_in_tx(&mut tx, kind, id)
        .await?
        .ok_or(CoreError::NotFound {
            entity: kind.entity(),
            id,
        })?;
    if locked.is_published() {
        return Err(CoreError::Conflict(
            "A published document cannot be deleted; unpublish it first".into(),
        )
        .into());
    }
    if locked.is_deleted() {
        return Ok(());
    }

    let mut content = locked.content.0.clone();
    content.mark_deleted();
    DocumentRepo::soft_delete_in_tx(&mut tx, kind, id, &content).await?;

    let queued =
        FileAssetRepo::schedule_deletion_in_tx(&mut tx, kind.owner_type(), id).await?;

    tx.commit().await?;

    tracing::info!(
        document_id = id,
        kind = kind.owner_type(),
        assets_queued = queued,
        "Document soft-deleted"
    );
    Ok(())
}

/// Publish (delegates to the publication engine).
pub async fn do_publish(
    state: &AppState,
    account: &Account,
    kind: DocumentKind,
    id: DbId,
    requested_slug: Option<&str>,
) -> AppResult<publish::PublishOutcome> {
    publish::publish(state, kind, id, account, requested_slug).await
}

/// Unpublish (delegates to the publication engine).
pub async fn do_unpublish(
    state: &AppState,
    account: &Account,
    kind: DocumentKind,
    id: DbId,
) -> AppResult<Document> {
    publish::unpublish(state, kind, id, account).await
}

/// Snapshot history of a document, newest first.
pub async fn versions(
    state: &AppState,
    account: &Account,
    kind: DocumentKind,
    id: DbId,
) -> AppResult<Vec<PublicationSnapshot>> {
    let document = get(state, account, kind, id).await?;
    Ok(SnapshotRepo::list_for_document(&state.pool, kind.owner_type(), document.id).await?)
}

/// Store a multipart upload and register it as an asset of the document.
///
/// Expects a single `file` part. The file lands in the storage backend
/// under `uploads/<account>/<uuid>.<ext>` and the returned asset carries
/// the public URL drafts may reference.
pub async fn upload(
    state: &AppState,
    account: &Account,
    kind: DocumentKind,
    id: DbId,
    mut multipart: Multipart,
) -> AppResult<FileAsset> {
    // Uploads only attach to documents the account can still edit.
    get(state, account, kind, id).await?;

    let field = multipart
        .next_field()
        .await
        .map_err(|e| AppError::BadRequest(format!("Invalid multipart body: {e}")))?
        .ok_or_else(|| AppError::BadRequest("Expected a 'file' part".into()))?;

    if field.name() != Some("file") {
        return Err(AppError::BadRequest("Expected a 'file' part".into()));
    }
    let filename = field
        .file_name()
        .map(str::to_string)
        .ok_or_else(|| AppError::BadRequest("Upload must have a filename".into()))?;
    let content_type = field
        .content_type()
        .map(str::to_string)
        .unwrap_or_else(|| "application/octet-stream".into());
    let bytes = field
        .bytes()
        .await
        .map_err(|e| AppError::BadRequest(format!("Failed to read upload: {e}")))?;
    if bytes.is_empty() {
        return Err(AppError::BadRequest("Upload is empty".into()));
    }

    let path = upload_path(account.id, &filename);
    let public_url = state
        .storage
        .store(&path, &bytes, &content_type)
        .await
        .map_err(|e| AppError::InternalError(format!("Failed to store upload: {e}")))?;

    let asset = FileAssetRepo::register(
        &state.pool,
        kind.owner_type(),
        id,
        account.id,
        &path,
        &public_url,
    )
    .await?
    .ok_or_else(|| AppError::InternalError("Upload produced no storage location".into()))?;

    tracing::info!(
        asset_id = asset.id,
        document_id = id,
        kind = kind.owner_type(),
        "File uploaded"
    );
    Ok(asset)
}

/// Reject a patch that references upload URLs the account does not own
/// (or that are no longer live).
async fn vet_referenced_urls(
    state: &AppState,
    account: &Account,
    patch: &ContentPatch,
) -> AppResult<()> {
    let urls = patch
        .photo_urls
        .iter()
        .flatten()
        .chain(patch.cover_image_url.as_ref());
    for url in urls {
        if !FileAssetRepo::is_owned_active_url(&state.pool, account.id, url).await? {
            return Err(CoreError::Validation(format!(
                "URL '{url}' is not one of your active uploads"
            ))
            .into());
        }
    }
    Ok(())
}
