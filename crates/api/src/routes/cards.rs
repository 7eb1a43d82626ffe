//! Route definitions for the `/cards` resource.

use axum::routing::{get, post};
use axum::Router;

use crate::handlers::cards;
use crate::state::AppState;

/// Routes mounted at `/cards`. Same surface as `/invitations`.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(cards::list).post(cards::create))
        .route(
            "/{id}",
            get(cards::get).patch(cards::update).delete(cards::delete),
        )
        .route("/{id}/publish", post(cards::publish))
        .route("/{id}/unpublish", post(cards::unpublish))
        .route("/{id}/versions", get(cards::versions))
        .route("/{id}/assets", post(cards::upload))
}
