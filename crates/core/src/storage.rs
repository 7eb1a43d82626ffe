//! Storage backend seam for uploaded media.
//!
//! The rest of the system only ever touches files through this trait: the
//! upload path stores bytes, the purge job deletes them. Deleting a path
//! that is already gone is success — purge retries must converge even when
//! a previous attempt half-completed.

use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use async_trait::async_trait;

/// Errors from the physical storage backend.
///
/// Never surfaced to a request synchronously; purge failures are recorded
/// on the asset row and retried on the next scheduler tick.
#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Storage backend error: {0}")]
    Backend(String),
}

/// Physical file storage: local filesystem today, the seam for object
/// stores later.
#[async_trait]
pub trait StorageBackend: Send + Sync {
    /// Store `bytes` under `path`, returning the public URL the file is
    /// served from.
    async fn store(
        &self,
        path: &str,
        bytes: &[u8],
        content_type: &str,
    ) -> Result<String, StorageError>;

    /// Physically delete the file at `path`. A missing file is success.
    async fn delete(&self, path: &str) -> Result<(), StorageError>;
}

/// Build the storage path for a new upload:
/// `uploads/<account_id>/<uuid>.<ext>`.
pub fn upload_path(account_id: i64, original_filename: &str) -> String {
    let ext = Path::new(original_filename)
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| e.to_ascii_lowercase())
        .unwrap_or_else(|| "bin".to_string());
    format!("uploads/{account_id}/{}.{ext}", uuid::Uuid::new_v4())
}

/// Local-filesystem backend serving files from a root directory under a
/// public base URL.
pub struct LocalStorage {
    root: PathBuf,
    public_base: String,
}

impl LocalStorage {
    pub fn new(root: impl Into<PathBuf>, public_base: impl Into<String>) -> Self {
        Self {
            root: root.into(),
            public_base: public_base.into().trim_end_matches('/').to_string(),
        }
    }

    fn absolute(&self, path: &str) -> PathBuf {
        self.root.join(path)
    }
}

#[async_trait]
impl StorageBackend for LocalStorage {
    async fn store(
        &self,
        path: &str,
        bytes: &[u8],
        _content_type: &str,
    ) -> Result<String, StorageError> {
        let target = self.absolute(path);
        if let Some(parent) = target.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }
        tokio::fs::write(&target, bytes).await?;
        Ok(format!("{}/{path}", self.public_base))
    }

    async fn delete(&self, path: &str) -> Result<(), StorageError> {
        match tokio::fs::remove_file(self.absolute(path)).await {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }
}
