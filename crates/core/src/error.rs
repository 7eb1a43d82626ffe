use crate::types::DbId;

/// Domain-level errors shared by the repository and API layers.
///
/// Every variant is recoverable at the transaction boundary: the caller
/// aborts the surrounding transaction and surfaces the error, leaving
/// counters, slugs, and asset states untouched.
#[derive(Debug, thiserror::Error)]
pub enum CoreError {
    #[error("Entity not found: {entity} with id {id}")]
    NotFound { entity: &'static str, id: DbId },

    #[error("Validation failed: {0}")]
    Validation(String),

    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("Forbidden: {0}")]
    Forbidden(String),

    #[error("Internal error: {0}")]
    Internal(String),
}
