//! Local filesystem storage for uploaded images.
//!
//! Files land in `{upload_dir}/{avatars,posts}/` under a random name that
//! keeps only a known image extension. They are served back by the HTTP
//! layer under `/uploads`.

use std::path::{Path, PathBuf};

use tokio::fs;
use tracing::{debug, info};
use uuid::Uuid;

use cybershare_core::config::StorageConfig;
use cybershare_core::error::{AppError, ErrorKind};
use cybershare_core::result::AppResult;

/// URL prefix the upload directory is mounted at.
pub const PUBLIC_PREFIX: &str = "/uploads";

/// What an image is used for; decides its sub-directory.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImageKind {
    Avatar,
    PostImage,
}

impl ImageKind {
    fn dir(self) -> &'static str {
        match self {
            Self::Avatar => "avatars",
            Self::PostImage => "posts",
        }
    }
}

/// A stored image and the URL it is reachable at.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoredImage {
    pub file_name: String,
    pub url: String,
}

/// Writes validated images below the configured upload directory.
#[derive(Debug, Clone)]
pub struct ImageStore {
    root: PathBuf,
    public_base_url: String,
    max_bytes: usize,
}

impl ImageStore {
    /// Directories are created on first write.
    pub fn new(config: &StorageConfig) -> Self {
        Self {
            root: PathBuf::from(&config.upload_dir),
            public_base_url: config.public_base_url.trim_end_matches('/').to_string(),
            max_bytes: config.max_image_bytes,
        }
    }

    /// Root directory served under `/uploads`.
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Largest accepted upload in bytes.
    pub fn max_bytes(&self) -> usize {
        self.max_bytes
    }

    /// Validate and persist one image.
    ///
    /// Avatars get a root-relative URL; post images get an absolute one so
    /// they survive being embedded in post HTML.
    pub async fn save(
        &self,
        kind: ImageKind,
        content_type: Option<&str>,
        original_name: Option<&str>,
        data: &[u8],
    ) -> AppResult<StoredImage> {
        let content_type = content_type.unwrap_or_default();
        if !content_type.starts_with("image/") {
            return Err(AppError::validation("File must be an image"));
        }
        if data.is_empty() {
            return Err(AppError::validation("File is empty"));
        }
        if data.len() > self.max_bytes {
            return Err(AppError::validation(format!(
                "Image exceeds the {} byte limit",
                self.max_bytes
            )));
        }

        let file_name = format!(
            "{}.{}",
            Uuid::new_v4(),
            extension(original_name, content_type)
        );
        let dir = self.root.join(kind.dir());
        fs::create_dir_all(&dir).await.map_err(|e| {
            AppError::with_source(
                ErrorKind::Storage,
                format!("Failed to create upload directory: {}", dir.display()),
                e,
            )
        })?;

        let path = dir.join(&file_name);
        fs::write(&path, data).await.map_err(|e| {
            AppError::with_source(
                ErrorKind::Storage,
                format!("Failed to write upload: {}", path.display()),
                e,
            )
        })?;
        debug!(path = %path.display(), bytes = data.len(), "Wrote upload");

        let relative = format!("{PUBLIC_PREFIX}/{}/{file_name}", kind.dir());
        let url = match kind {
            ImageKind::Avatar => relative,
            ImageKind::PostImage => format!("{}{relative}", self.public_base_url),
        };
        info!(kind = ?kind, file = %file_name, "Image stored");
        Ok(StoredImage { file_name, url })
    }
}

/// Extension for the stored file: the client's, when it is a known image
/// type, else one derived from the content type.
fn extension(original_name: Option<&str>, content_type: &str) -> &'static str {
    let from_name = original_name
        .and_then(|name| Path::new(name).extension())
        .and_then(|ext| ext.to_str())
        .map(str::to_ascii_lowercase);
    match from_name.as_deref() {
        Some("png") => "png",
        Some("jpg" | "jpeg") => "jpg",
        Some("gif") => "gif",
        Some("webp") => "webp",
        _ => match content_type {
            "image/png" => "png",
            "image/gif" => "gif",
            "image/webp" => "webp",
            _ => "jpg",
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn store(dir: &Path) -> ImageStore {
        ImageStore::new(&StorageConfig {
            upload_dir: dir.to_string_lossy().into_owned(),
            public_base_url: "https://cdn.example.com/".into(),
            max_image_bytes: 16,
        })
    }

    #[tokio::test]
    async fn test_post_image_written_with_absolute_url() {
        let dir = tempfile::tempdir().unwrap();
        let stored = store(dir.path())
            .save(ImageKind::PostImage, Some("image/png"), Some("Cat.PNG"), b"png-bytes")
            .await
            .unwrap();
        assert!(stored.file_name.ends_with(".png"));
        assert_eq!(
            stored.url,
            format!("https://cdn.example.com/uploads/posts/{}", stored.file_name)
        );
        let written = std::fs::read(dir.path().join("posts").join(&stored.file_name)).unwrap();
        assert_eq!(written, b"png-bytes");
    }

    #[tokio::test]
    async fn test_avatar_url_is_root_relative() {
        let dir = tempfile::tempdir().unwrap();
        let stored = store(dir.path())
            .save(ImageKind::Avatar, Some("image/jpeg"), Some("../../etc/passwd"), b"jpg")
            .await
            .unwrap();
        assert!(stored.url.starts_with("/uploads/avatars/"));
        assert!(stored.file_name.ends_with(".jpg"));
        assert!(!stored.file_name.contains('/'));
    }

    #[tokio::test]
    async fn test_rejects_non_image_empty_and_oversized() {
        let dir = tempfile::tempdir().unwrap();
        let store = store(dir.path());
        for (content_type, data) in [
            (Some("text/plain"), &b"hello"[..]),
            (None, &b"hello"[..]),
            (Some("image/png"), &b""[..]),
            (Some("image/png"), &[0u8; 17][..]),
        ] {
            let err = store
                .save(ImageKind::PostImage, content_type, None, data)
                .await
                .unwrap_err();
            assert_eq!(err.kind, ErrorKind::Validation);
        }
    }
}
