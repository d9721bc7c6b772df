//! Threading of flat comment lists.

use uuid::Uuid;

use cybershare_core::types::{TreeNode, build_tree};

use crate::models::Comment;

impl TreeNode for Comment {
    type Id = Uuid;

    fn node_id(&self) -> Uuid {
        self.id
    }

    fn parent_id(&self) -> Option<Uuid> {
        self.parent_id
    }

    fn children_mut(&mut self) -> &mut Vec<Self> {
        &mut self.children
    }
}

/// Nest a flat, oldest-first list of comments into reply trees.
///
/// Replies whose parent is missing or appears later become roots.
pub fn build_comment_tree(flat: Vec<Comment>) -> Vec<Comment> {
    build_tree(flat)
}

/// Number of comments in a forest, replies included.
pub fn count_comments(tree: &[Comment]) -> usize {
    tree.iter().map(|c| 1 + count_comments(&c.children)).sum()
}
