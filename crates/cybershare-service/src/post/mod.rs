//! Post authoring, discovery and view tracking.

pub mod service;
pub mod view;

pub use service::{CreatePostInput, PostService, UpdatePostInput};
pub use view::{CategoryRef, PostDetail};
