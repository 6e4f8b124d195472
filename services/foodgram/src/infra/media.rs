use std::path::{Component, Path, PathBuf};

use anyhow::Context as _;
use uuid::Uuid;

use foodgram_domain::image::DecodedImage;

use crate::domain::repository::{MediaFolder, MediaStore};
use crate::error::FoodgramError;

/// Images stored as files below `root`, named `<folder>/<uuid>.<ext>`.
#[derive(Clone)]
pub struct FsMediaStore {
    pub root: PathBuf,
}

impl FsMediaStore {
    /// Resolve a stored relative path, refusing anything that escapes the root.
    fn resolve(&self, path: &str) -> Option<PathBuf> {
        let relative = Path::new(path);
        relative
            .components()
            .all(|c| matches!(c, Component::Normal(_)))
            .then(|| self.root.join(relative))
    }
}

impl MediaStore for FsMediaStore {
    async fn save(
        &self,
        folder: MediaFolder,
        image: &DecodedImage,
    ) -> Result<String, FoodgramError> {
        let relative = format!("{}/{}.{}", folder.as_path(), Uuid::new_v4(), image.extension);
        let full = self.root.join(&relative);
        if let Some(parent) = full.parent() {
            tokio::fs::create_dir_all(parent)
                .await
                .with_context(|| format!("create media directory {}", parent.display()))?;
        }
        tokio::fs::write(&full, &image.bytes)
            .await
            .with_context(|| format!("write media file {}", full.display()))?;
        Ok(relative)
    }

    async fn remove(&self, path: &str) {
        let Some(full) = self.resolve(path) else {
            tracing::warn!(path, "refusing to remove media outside the media root");
            return;
        };
        match tokio::fs::remove_file(&full).await {
            Ok(()) => {}
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
            Err(e) => tracing::warn!(path, error = %e, "failed to remove media file"),
        }
    }
}
