//! Local filesystem object storage.

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use tokio::fs;
use tracing::debug;

use filekeep_core::error::{AppError, ErrorKind};
use filekeep_core::result::AppResult;
use filekeep_core::traits::ObjectStorage;

/// Object storage rooted at a local directory.
#[derive(Debug, Clone)]
pub struct LocalObjectStorage {
    /// Root directory for all stored objects.
    root: PathBuf,
}

impl LocalObjectStorage {
    /// Create a new local storage rooted at the given path.
    pub async fn new(root_path: impl AsRef<Path>) -> AppResult<Self> {
        let root = root_path.as_ref().to_path_buf();
        fs::create_dir_all(&root).await.map_err(|e| {
            AppError::with_source(
                ErrorKind::Storage,
                format!("Failed to create storage root: {}", root.display()),
                e,
            )
        })?;
        Ok(Self { root })
    }

    /// Root directory.
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Resolve a relative object path inside the root.
    fn resolve(&self, path: &str) -> AppResult<PathBuf> {
        let clean = path.trim_start_matches('/');
        if clean.is_empty() || clean.split('/').any(|part| part == "..") {
            return Err(AppError::validation(format!("Invalid object path: {path}")));
        }
        Ok(self.root.join(clean))
    }

    /// Copy a local file into storage under `path`, returning its size.
    pub async fn import(&self, source: &Path, path: &str) -> AppResult<u64> {
        let target = self.resolve(path)?;
        if let Some(parent) = target.parent() {
            fs::create_dir_all(parent).await.map_err(|e| {
                AppError::with_source(
                    ErrorKind::Storage,
                    format!("Failed to create parent directory: {}", parent.display()),
                    e,
                )
            })?;
        }
        let bytes = fs::copy(source, &target).await.map_err(|e| {
            if e.kind() == std::io::ErrorKind::NotFound {
                AppError::not_found(format!("Source file not found: {}", source.display()))
            } else {
                AppError::with_source(
                    ErrorKind::Storage,
                    format!("Failed to store object: {path}"),
                    e,
                )
            }
        })?;
        debug!(path, bytes, "Imported object");
        Ok(bytes)
    }
}

#[async_trait]
impl ObjectStorage for LocalObjectStorage {
    fn provider_type(&self) -> &str {
        "local"
    }

    async fn exists(&self, path: &str) -> AppResult<bool> {
        let full_path = self.resolve(path)?;
        fs::try_exists(&full_path).await.map_err(|e| {
            AppError::with_source(ErrorKind::Storage, format!("Failed to stat object: {path}"), e)
        })
    }

    async fn remove(&self, path: &str) -> AppResult<()> {
        let full_path = self.resolve(path)?;
        match fs::remove_file(&full_path).await {
            Ok(()) => {
                debug!(path, "Removed object");
                Ok(())
            }
            // Already gone.
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(AppError::with_source(
                ErrorKind::Storage,
                format!("Failed to delete object: {path}"),
                e,
            )),
        }
    }
}
