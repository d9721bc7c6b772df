//! Core type definitions used across the CyberShare workspace.

pub mod pagination;
pub mod response;
pub mod tree;

pub use pagination::{PageRequest, PageResponse};
pub use response::ApiErrorResponse;
pub use tree::{TreeNode, build_tree, subtree_size};
