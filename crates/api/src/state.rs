use std::sync::Arc;

use keepsake_core::storage::StorageBackend;

use crate::config::ServerConfig;

/// Shared application state available to all Axum handlers via `State<AppState>`.
///
/// This is cheaply cloneable (inner data is behind `Arc` or is already `Clone`).
#[derive(Clone)]
pub struct AppState {
    /// Database connection pool.
    pub pool: keepsake_db::DbPool,
    /// Server configuration (share-URL origin, purge settings, timeouts).
    pub config: Arc<ServerConfig>,
    /// Physical file storage for uploads and the purge job.
    pub storage: Arc<dyn StorageBackend>,
}
