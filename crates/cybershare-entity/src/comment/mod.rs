//! Comment domain entities.

pub mod model;
pub mod tree;

pub use model::{Comment, CommentRecord};
pub use tree::{CommentNode, build_comment_tree};
