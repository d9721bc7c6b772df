//! `[storage]` section: where uploaded images live and how they are linked.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StorageConfig {
    /// Root directory; avatars and post images go in `avatars/` and `posts/` below it.
    #[serde(default = "default_upload_dir")]
    pub upload_dir: String,
    /// Origin prepended to `/uploads/...` when building public file URLs.
    #[serde(default = "default_public_base_url")]
    pub public_base_url: String,
    /// Largest accepted image in bytes.
    #[serde(default = "default_max_image_bytes")]
    pub max_image_bytes: usize,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            upload_dir: default_upload_dir(),
            public_base_url: default_public_base_url(),
            max_image_bytes: default_max_image_bytes(),
        }
    }
}

fn default_upload_dir() -> String {
    "uploads".to_string()
}

fn default_public_base_url() -> String {
    "http://localhost:8080".to_string()
}

fn default_max_image_bytes() -> usize {
    5 * 1024 * 1024
}
