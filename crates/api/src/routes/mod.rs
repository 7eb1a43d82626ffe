pub mod cards;
pub mod health;
pub mod invitations;

use axum::Router;

use crate::state::AppState;

/// Build the `/api/v1` route tree.
///
/// Route hierarchy:
///
/// ```text
/// /invitations                     list, create
/// /invitations/{id}                get, update (PATCH), soft delete
/// /invitations/{id}/publish        publish (optional slug in body)
/// /invitations/{id}/unpublish      take offline
/// /invitations/{id}/versions       snapshot history
/// /invitations/{id}/assets         multipart upload
///
/// /cards/...                       same surface for thank-you cards
/// ```
pub fn api_routes() -> Router<AppState> {
    Router::new()
        .nest("/invitations", invitations::router())
        .nest("/cards", cards::router())
}
