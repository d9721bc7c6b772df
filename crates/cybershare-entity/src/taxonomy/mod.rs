//! Categories and tags.

pub mod category;
pub mod tag;

pub use category::{Category, CategoryWithCount};
pub use tag::{Tag, TagRef, TagWithCount};
