//! Acting-account extraction.
//!
//! Session/authentication mechanics live in front of this service; requests
//! arrive with the authenticated account id in the `X-Account-Id` header.
//! The extractor resolves it to a full [`Account`] row so handlers get the
//! quota-exempt flag without a second lookup.

use axum::extract::FromRequestParts;
use axum::http::request::Parts;
use keepsake_core::error::CoreError;
use keepsake_core::types::DbId;
use keepsake_db::models::account::Account;
use keepsake_db::repositories::AccountRepo;

use crate::error::AppError;
use crate::state::AppState;

/// Header carrying the authenticated account id.
pub const ACCOUNT_ID_HEADER: &str = "x-account-id";

/// The account a request acts as.
#[derive(Debug, Clone)]
pub struct ActingAccount(pub Account);

impl FromRequestParts<AppState> for ActingAccount {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let id: DbId = parts
            .headers
            .get(ACCOUNT_ID_HEADER)
            .and_then(|v| v.to_str().ok())
            .ok_or_else(|| AppError::BadRequest("Missing X-Account-Id header".into()))?
            .parse()
            .map_err(|_| AppError::BadRequest("X-Account-Id must be a numeric id".into()))?;

        let account = AccountRepo::find_by_id(&state.pool, id)
            .await?
            .ok_or(AppError::Core(CoreError::NotFound {
                entity: "Account",
                id,
            }))?;

        Ok(ActingAccount(account))
    }
}
