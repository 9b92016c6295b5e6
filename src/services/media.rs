//! File storage for uploaded photos, logos and floor plans
//!
//! Files land under `<root>/<prefix>/<uuid>-<sanitized name>`; the returned
//! relative path is what gets stored on the owning record.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use tracing::{debug, warn};
use uuid::Uuid;

use crate::config::MediaConfig;
use crate::models::UploadPrefix;
use crate::utils::validation::sanitize_file_name;

#[derive(Debug, Clone)]
pub struct MediaStore {
    root: PathBuf,
    max_upload_bytes: usize,
}

impl MediaStore {
    pub fn new(config: &MediaConfig) -> Self {
        Self {
            root: config.root.clone(),
            max_upload_bytes: config.max_upload_bytes,
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn max_upload_bytes(&self) -> usize {
        self.max_upload_bytes
    }

    /// Write `bytes` and return the path relative to the media root
    pub async fn store(
        &self,
        prefix: UploadPrefix,
        original_name: &str,
        bytes: &[u8],
    ) -> Result<String> {
        let dir = self.root.join(prefix.as_str());
        tokio::fs::create_dir_all(&dir)
            .await
            .with_context(|| format!("Failed to create media directory {}", dir.display()))?;

        let file_name = format!("{}-{}", Uuid::new_v4(), sanitize_file_name(original_name));
        let target = dir.join(&file_name);
        tokio::fs::write(&target, bytes)
            .await
            .with_context(|| format!("Failed to write upload {}", target.display()))?;

        debug!(path = %target.display(), size = bytes.len(), "Stored upload");
        Ok(format!("{}/{}", prefix.as_str(), file_name))
    }

    /// Remove a stored file; missing files are ignored
    pub async fn remove(&self, relative: &str) {
        let Some(path) = self.resolve(relative) else {
            warn!(path = %relative, "Refusing to remove path outside media root");
            return;
        };
        match tokio::fs::remove_file(&path).await {
            Ok(()) => debug!(path = %path.display(), "Removed upload"),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
            Err(e) => warn!(path = %path.display(), error = %e, "Failed to remove upload"),
        }
    }

    fn resolve(&self, relative: &str) -> Option<PathBuf> {
        let rel = Path::new(relative);
        if rel.is_absolute()
            || rel
                .components()
                .any(|c| !matches!(c, std::path::Component::Normal(_)))
        {
            return None;
        }
        Some(self.root.join(rel))
    }
}
