use super::types::ImageBatch;
use anyhow::{Context, Result};
use std::path::{Path, PathBuf};

/// Writes materialized batches to disk for later inspection.
///
/// Layout: `<root>/<correlation_id>/image_<n>.jpeg`, `n` starting at 1.
pub struct AuditImageStore {
    root: PathBuf,
}

impl AuditImageStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    #[must_use]
    pub fn root(&self) -> &Path {
        &self.root
    }

    pub async fn persist(&self, batch: &ImageBatch) -> Result<Vec<PathBuf>> {
        let batch_dir = self.root.join(&batch.correlation_id);
        tokio::fs::create_dir_all(&batch_dir)
            .await
            .with_context(|| format!("Failed to create audit directory {}", batch_dir.display()))?;

        let mut paths = Vec::with_capacity(batch.len());
        for (index, blob) in batch.images.iter().enumerate() {
            let path = batch_dir.join(format!("image_{}.jpeg", index + 1));
            tokio::fs::write(&path, &blob.bytes)
                .await
                .with_context(|| format!("Failed to write audit image {}", path.display()))?;
            paths.push(path);
        }

        tracing::debug!(
            correlation_id = batch.correlation_id.as_str(),
            dir = %batch_dir.display(),
            "Saved audit images"
        );
        Ok(paths)
    }
}
