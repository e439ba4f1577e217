//! File-backed token store: one JSON record on disk.
//!
//! Writes go to a sibling temp file which is then renamed over the record, so
//! a concurrent load never observes a half-written file. An internal mutex
//! additionally serializes reads against writes within this process. On Unix
//! the record is created with mode 0600.

use async_trait::async_trait;
use remilk_types::{AuthToken, GatewayError, TokenStore, traits::Result};
use std::path::{Path, PathBuf};
use tokio::sync::Mutex;

/// A persistent [`TokenStore`] backed by a single JSON file.
pub struct FileTokenStore {
    path: PathBuf,
    /// Serializes file reads against writes.
    lock: Mutex<()>,
}

impl FileTokenStore {
    /// Creates a store rooted at `path`. The parent directory is created on
    /// first save, not here.
    #[must_use]
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            lock: Mutex::new(()),
        }
    }

    /// The record's path on disk.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn storage_err(e: impl std::fmt::Display) -> GatewayError {
        GatewayError::Internal(format!("token store: {e}"))
    }
}

#[async_trait]
impl TokenStore for FileTokenStore {
    /// Loads the record; a missing file is `None`, not an error.
    async fn load(&self) -> Result<Option<AuthToken>> {
        let _guard = self.lock.lock().await;
        match tokio::fs::read(&self.path).await {
            Ok(bytes) => {
                let token = serde_json::from_slice(&bytes)
                    .map_err(|e| Self::storage_err(format!("corrupt record: {e}")))?;
                Ok(Some(token))
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(Self::storage_err(e)),
        }
    }

    /// Persists the record via temp file + rename, mode 0600 on Unix.
    async fn save(&self, token: &AuthToken) -> Result<()> {
        let _guard = self.lock.lock().await;
        if let Some(parent) = self.path.parent() {
            tokio::fs::create_dir_all(parent)
                .await
                .map_err(Self::storage_err)?;
        }

        let bytes = serde_json::to_vec_pretty(token).map_err(Self::storage_err)?;
        let tmp = self.path.with_extension("json.tmp");
        tokio::fs::write(&tmp, &bytes).await.map_err(Self::storage_err)?;

        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt as _;
            tokio::fs::set_permissions(&tmp, std::fs::Permissions::from_mode(0o600))
                .await
                .map_err(Self::storage_err)?;
        }

        tokio::fs::rename(&tmp, &self.path)
            .await
            .map_err(Self::storage_err)
    }

    /// Removes the record; removing a missing record is not an error.
    async fn delete(&self) -> Result<()> {
        let _guard = self.lock.lock().await;
        match tokio::fs::remove_file(&self.path).await {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(Self::storage_err(e)),
        }
    }
}
