//! Categories and tags.

pub mod category;
pub mod tag;

pub use category::{CategoryInput, CategoryService};
pub use tag::{TagInput, TagService};
