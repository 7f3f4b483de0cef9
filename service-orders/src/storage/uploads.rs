//! Photo uploads directory
//!
//! A single flat directory shared by all service orders. Orders store a
//! relative reference; only its base name is used to locate the file, so a
//! reference can never point outside the directory.
//!
//! Example: reference "uploads/os_foto_1a2b3c4d5e.jpg" resolves to
//! "<root>/os_foto_1a2b3c4d5e.jpg"

use crate::config::{PHOTO_FILE_PREFIX, PHOTO_SUFFIX_LEN};
use crate::error::{AppError, Result};
use std::path::{Path, PathBuf};
use tokio::fs;
use uuid::Uuid;

/// Flat store for photo attachments
#[derive(Debug, Clone)]
pub struct UploadsStore {
    root: PathBuf,
}

impl UploadsStore {
    /// Create an uploads store at the given root directory
    pub fn new(root: PathBuf) -> Self {
        Self { root }
    }

    /// Initialize the uploads store (create directory if needed)
    pub async fn initialize(&self) -> Result<()> {
        fs::create_dir_all(&self.root).await?;
        tracing::info!("Uploads directory initialized at: {:?}", self.root);
        Ok(())
    }

    /// Copy a picked file into the store under a fresh unique name.
    ///
    /// Returns the reference to keep on the service order.
    pub async fn store_photo(&self, source: &Path) -> Result<String> {
        if !source.is_file() {
            return Err(AppError::Generic(format!(
                "Photo source is not a file: {}",
                source.display()
            )));
        }

        let extension = source
            .extension()
            .and_then(|ext| ext.to_str())
            .map(|ext| format!(".{}", ext.to_lowercase()))
            .unwrap_or_default();

        let unique = Uuid::new_v4().simple().to_string();
        let name = format!(
            "{}{}{}",
            PHOTO_FILE_PREFIX,
            &unique[..PHOTO_SUFFIX_LEN],
            extension
        );

        // Copy to a temp name first so a half-written file is never visible
        let target = self.root.join(&name);
        let temp_path = target.with_extension("tmp");
        fs::copy(source, &temp_path).await?;
        fs::rename(&temp_path, &target).await?;

        tracing::debug!("Stored photo {:?} as {}", source, name);

        Ok(name)
    }

    /// Path a stored reference points to, or `None` when the reference has
    /// no usable file name.
    pub fn resolve(&self, reference: &str) -> Option<PathBuf> {
        base_name(reference).map(|name| self.root.join(name))
    }

    /// Check if the file behind a reference exists
    pub async fn exists(&self, reference: &str) -> bool {
        match self.resolve(reference) {
            Some(path) => fs::metadata(path).await.map(|m| m.is_file()).unwrap_or(false),
            None => false,
        }
    }

    /// Remove the file behind a reference. A missing file is not an error;
    /// returns whether something was removed.
    pub async fn remove(&self, reference: &str) -> Result<bool> {
        let Some(path) = self.resolve(reference) else {
            return Ok(false);
        };

        match fs::remove_file(&path).await {
            Ok(()) => {
                tracing::debug!("Removed photo: {:?}", path);
                Ok(true)
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                tracing::debug!("Photo already gone: {:?}", path);
                Ok(false)
            }
            Err(e) => Err(e.into()),
        }
    }

    /// Remove the file behind a reference, logging instead of failing
    pub async fn remove_quietly(&self, reference: &str) {
        if let Err(e) = self.remove(reference).await {
            tracing::warn!("Failed to remove photo {}: {}", reference, e);
        }
    }

    /// Get uploads root directory
    pub fn root(&self) -> &Path {
        &self.root
    }
}

/// Last path component of a reference, accepting either separator
pub fn base_name(reference: &str) -> Option<&str> {
    let name = reference.trim().rsplit(['/', '\\']).next()?;

    match name {
        "" | "." | ".." => None,
        name => Some(name),
    }
}
