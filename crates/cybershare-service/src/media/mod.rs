//! Uploaded images: avatars and inline post pictures.

pub mod store;

pub use store::{ImageKind, ImageStore, StoredImage};
