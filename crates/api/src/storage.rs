//! Event images on the local filesystem.

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use openmic_core::store::{BlobStore, StoreError, StoreResult};
use openmic_core::types::new_id;

/// [`BlobStore`] writing one file per blob under a root directory.
#[derive(Debug, Clone)]
pub struct LocalBlobStore {
    root: PathBuf,
}

impl LocalBlobStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }
}

/// File extension for an image content type. Unknown subtypes get `bin`.
fn extension_for(content_type: &str) -> &'static str {
    let mime = content_type.split(';').next().unwrap_or_default().trim();
    match mime {
        "image/jpeg" | "image/jpg" => "jpg",
        "image/png" => "png",
        "image/gif" => "gif",
        "image/webp" => "webp",
        _ => "bin",
    }
}

/// Stored names are generated here, so anything with a path separator or a
/// leading dot did not come from [`LocalBlobStore::put`].
fn is_plain_filename(filename: &str) -> bool {
    !filename.is_empty()
        && !filename.starts_with('.')
        && !filename.contains(['/', '\\'])
}

#[async_trait]
impl BlobStore for LocalBlobStore {
    async fn put(&self, bytes: Vec<u8>, content_type: &str) -> StoreResult<String> {
        tokio::fs::create_dir_all(&self.root)
            .await
            .map_err(StoreError::backend)?;

        let filename = format!("{}.{}", new_id().simple(), extension_for(content_type));
        tokio::fs::write(self.root.join(&filename), &bytes)
            .await
            .map_err(StoreError::backend)?;

        tracing::debug!(%filename, size = bytes.len(), "Blob stored");
        Ok(filename)
    }

    async fn delete(&self, filename: &str) -> StoreResult<()> {
        if !is_plain_filename(filename) {
            return Err(StoreError::Unavailable(format!(
                "refusing to delete '{filename}'"
            )));
        }
        match tokio::fs::remove_file(self.root.join(filename)).await {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(StoreError::backend(e)),
        }
    }
}
