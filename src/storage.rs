use std::path::{Path, PathBuf};

use thiserror::Error;
use tracing::{info, warn};
use url::Url;
use uuid::Uuid;

use crate::config::StorageConfig;

/// Image formats accepted for sigil uploads, recognised by magic bytes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImageKind {
    Png,
    Jpeg,
    Gif,
    Webp,
}

impl ImageKind {
    pub fn sniff(bytes: &[u8]) -> Option<Self> {
        if bytes.starts_with(b"\x89PNG\r\n\x1a\n") {
            Some(ImageKind::Png)
        } else if bytes.starts_with(&[0xFF, 0xD8, 0xFF]) {
            Some(ImageKind::Jpeg)
        } else if bytes.starts_with(b"GIF87a") || bytes.starts_with(b"GIF89a") {
            Some(ImageKind::Gif)
        } else if bytes.len() >= 12 && &bytes[0..4] == b"RIFF" && &bytes[8..12] == b"WEBP" {
            Some(ImageKind::Webp)
        } else {
            None
        }
    }

    pub fn content_type(&self) -> &'static str {
        match self {
            ImageKind::Png => "image/png",
            ImageKind::Jpeg => "image/jpeg",
            ImageKind::Gif => "image/gif",
            ImageKind::Webp => "image/webp",
        }
    }

    pub fn extension(&self) -> &'static str {
        match self {
            ImageKind::Png => "png",
            ImageKind::Jpeg => "jpg",
            ImageKind::Gif => "gif",
            ImageKind::Webp => "webp",
        }
    }
}

#[derive(Debug, Error)]
pub enum StorageError {
    #[error("failed to write {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid media URL: {0}")]
    InvalidUrl(String),
}

/// Uploaded images on local disk, served back under the media URL
#[derive(Debug, Clone)]
pub struct MediaStorage {
    root: PathBuf,
    base_url: Url,
}

impl MediaStorage {
    /// Directory under the media root that sigil images go in
    pub const UPLOAD_DIR: &'static str = "sigils";

    pub fn new(root: impl Into<PathBuf>, media_url: &str) -> Result<Self, StorageError> {
        // Url::join drops the last segment unless the base ends in a slash
        let normalized = if media_url.ends_with('/') {
            media_url.to_string()
        } else {
            format!("{}/", media_url)
        };
        let base_url = Url::parse(&normalized).map_err(|_| StorageError::InvalidUrl(media_url.to_string()))?;

        Ok(Self {
            root: root.into(),
            base_url,
        })
    }

    pub fn from_config(config: &StorageConfig) -> Result<Self, StorageError> {
        Self::new(config.media_root.clone(), &config.media_url)
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Write an image for `record_id`, returning its path relative to the media root
    pub async fn save(&self, record_id: Uuid, kind: ImageKind, bytes: &[u8]) -> Result<String, StorageError> {
        let relative = format!("{}/{}.{}", Self::UPLOAD_DIR, record_id, kind.extension());
        let dir = self.root.join(Self::UPLOAD_DIR);
        let path = self.root.join(&relative);

        tokio::fs::create_dir_all(&dir)
            .await
            .map_err(|source| StorageError::Io { path: dir.clone(), source })?;
        tokio::fs::write(&path, bytes)
            .await
            .map_err(|source| StorageError::Io { path: path.clone(), source })?;

        info!("Stored sigil image {} ({} bytes)", relative, bytes.len());
        Ok(relative)
    }

    /// Best-effort removal of a stored image
    pub async fn remove(&self, relative: &str) {
        let path = self.root.join(relative);
        if let Err(e) = tokio::fs::remove_file(&path).await {
            warn!("Failed to remove orphaned image {}: {}", path.display(), e);
        }
    }

    /// Public URL for a stored path
    pub fn url_for(&self, relative: &str) -> String {
        self.base_url
            .join(relative)
            .map(String::from)
            .unwrap_or_else(|_| format!("{}{}", self.base_url, relative))
    }
}
