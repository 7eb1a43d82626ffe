//! Handlers for the `/invitations` resource.
//!
//! Thin bindings of the kind-generic document service to
//! [`DocumentKind::Invitation`].

use axum::extract::{Multipart, Path, State};
use axum::http::StatusCode;
use axum::Json;
use keepsake_core::content::ContentPatch;
use keepsake_core::types::DbId;
use keepsake_db::models::document::{Document, DocumentKind};
use keepsake_db::models::file_asset::FileAsset;
use keepsake_db::models::snapshot::PublicationSnapshot;

use crate::error::AppResult;
use crate::handlers::documents::{self, PublishRequest};
use crate::identity::ActingAccount;
use crate::publish::PublishOutcome;
use crate::response::DataResponse;
use crate::state::AppState;

const KIND: DocumentKind = DocumentKind::Invitation;

/// POST /api/v1/invitations
pub async fn create(
    State(state): State<AppState>,
    ActingAccount(account): ActingAccount,
    body: Option<Json<ContentPatch>>,
) -> AppResult<(StatusCode, Json<DataResponse<Document>>)> {
    let patch = body.map(|Json(p)| p).unwrap_or_default();
    let document = documents::create(&state, &account, KIND, patch).await?;
    Ok((StatusCode::CREATED, Json(DataResponse { data: document })))
}

/// GET /api/v1/invitations
pub async fn list(
    State(state): State<AppState>,
    ActingAccount(account): ActingAccount,
) -> AppResult<Json<DataResponse<Vec<Document>>>> {
    let items = documents::list(&state, &account, KIND).await?;
    Ok(Json(DataResponse { data: items }))
}

/// GET /api/v1/invitations/{id}
pub async fn get(
    State(state): State<AppState>,
    ActingAccount(account): ActingAccount,
    Path(id): Path<DbId>,
) -> AppResult<Json<DataResponse<Document>>> {
    let document = documents::get(&state, &account, KIND, id).await?;
    Ok(Json(DataResponse { data: document }))
}

/// PATCH /api/v1/invitations/{id}
pub async fn update(
    State(state): State<AppState>,
    ActingAccount(account): ActingAccount,
    Path(id): Path<DbId>,
    Json(patch): Json<ContentPatch>,
) -> AppResult<Json<DataResponse<Document>>> {
    let document = documents::update(&state, &account, KIND, id, patch).await?;
    Ok(Json(DataResponse { data: document }))
}

/// DELETE /api/v1/invitations/{id}
pub async fn delete(
    State(state): State<AppState>,
    ActingAccount(account): ActingAccount,
    Path(id): Path<DbId>,
) -> AppResult<StatusCode> {
    documents::delete(&state, &account, KIND, id).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// POST /api/v1/invitations/{id}/publish
pub async fn publish(
    State(state): State<AppState>,
    ActingAccount(account): ActingAccount,
    Path(id): Path<DbId>,
    body: Option<Json<PublishRequest>>,
) -> AppResult<Json<DataResponse<PublishOutcome>>> {
    let requested = body.and_then(|Json(b)| b.slug);
    let outcome =
        documents::do_publish(&state, &account, KIND, id, requested.as_deref()).await?;
    Ok(Json(DataResponse { data: outcome }))
}

/// POST /api/v1/invitations/{id}/unpublish
pub async fn unpublish(
    State(state): State<AppState>,
    ActingAccount(account): ActingAccount,
    Path(id): Path<DbId>,
) -> AppResult<Json<DataResponse<Document>>> {
    let document = documents::do_unpublish(&state, &account, KIND, id).await?;
    Ok(Json(DataResponse { data: document }))
}

/// GET /api/v1/invitations/{id}/versions
pub async fn versions(
    State(state): State<AppState>,
    ActingAccount(account): ActingAccount,
    Path(id): Path<DbId>,
) -> AppResult<Json<DataResponse<Vec<PublicationSnapshot>>>> {
    let history = documents::versions(&state, &account, KIND, id).await?;
    Ok(Json(DataResponse { data: history }))
}

/// POST /api/v1/invitations/{id}/assets
pub async fn upload(
    State(state): State<AppState>,
    ActingAccount(account): ActingAccount,
    Path(id): Path<DbId>,
    multipart: Multipart,
) -> AppResult<(StatusCode, Json<DataResponse<FileAsset>>)> {
    let asset = documents::upload(&state, &account, KIND, id, multipart).await?;
    Ok((StatusCode::CREATED, Json(DataResponse { data: asset })))
}
