//! Route definitions for the `/invitations` resource.

use axum::routing::{get, post};
use axum::Router;

use crate::handlers::invitations;
use crate::state::AppState;

/// Routes mounted at `/invitations`.
///
/// ```text
/// GET    /                   -> list
/// POST   /                   -> create
/// GET    /{id}               -> get
/// PATCH  /{id}               -> update
/// DELETE /{id}               -> delete (soft)
/// POST   /{id}/publish       -> publish
/// POST   /{id}/unpublish     -> unpublish
/// GET    /{id}/versions      -> versions
/// POST   /{id}/assets        -> upload
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(invitations::list).post(invitations::create))
        .route(
            "/{id}",
            get(invitations::get)
                .patch(invitations::update)
                .delete(invitations::delete),
        )
        .route("/{id}/publish", post(invitations::publish))
        .route("/{id}/unpublish", post(invitations::unpublish))
        .route("/{id}/versions", get(invitations::versions))
        .route("/{id}/assets", post(invitations::upload))
}
