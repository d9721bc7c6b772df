//! Post domain entities.

pub mod model;
pub mod status;

pub use model::{CreatePost, Post, PostRecord, PostTagRow, UpdatePost};
pub use status::PostStatus;
