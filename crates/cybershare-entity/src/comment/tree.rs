//! Threaded comment view.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use cybershare_core::types::{TreeNode, build_tree};

use super::model::CommentRecord;
use crate::user::AuthorRef;

/// A comment with its nested replies.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CommentNode {
    pub id: Uuid,
    pub post_id: Uuid,
    pub parent_id: Option<Uuid>,
    pub author: AuthorRef,
    pub content: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub children: Vec<CommentNode>,
}

impl From<CommentRecord> for CommentNode {
    fn from(record: CommentRecord) -> Self {
        let c = record.comment;
        Self {
            id: c.id,
            post_id: c.post_id,
            parent_id: c.parent_id,
            author: AuthorRef {
                id: c.author_id,
                username: record.author_username,
                display_name: record.author_display_name,
                avatar_url: record.author_avatar_url,
            },
            content: c.content,
            created_at: c.created_at,
            updated_at: c.updated_at,
            children: Vec::new(),
        }
    }
}

impl TreeNode for CommentNode {
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

/// Assemble flat comment rows (oldest first) into a forest.
pub fn build_comment_tree(records: Vec<CommentRecord>) -> Vec<CommentNode> {
    build_tree(records.into_iter().map(CommentNode::from).collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::comment::Comment;

    fn record(id: Uuid, parent_id: Option<Uuid>, post_id: Uuid) -> CommentRecord {
        let now = Utc::now();
        CommentRecord {
            comment: Comment {
                id,
                post_id,
                author_id: Uuid::new_v4(),
                parent_id,
                content: format!("comment {id}"),
                created_at: now,
                updated_at: now,
            },
            author_username: "reader".into(),
            author_display_name: None,
            author_avatar_url: None,
        }
    }

    #[test]
    fn test_replies_nest_under_parent() {
        let post = Uuid::new_v4();
        let root = Uuid::new_v4();
        let reply = Uuid::new_v4();
        let nested = Uuid::new_v4();
        let tree = build_comment_tree(vec![
            record(root, None, post),
            record(reply, Some(root), post),
            record(nested, Some(reply), post),
        ]);
        assert_eq!(tree.len(), 1);
        assert_eq!(tree[0].children[0].id, reply);
        assert_eq!(tree[0].children[0].children[0].id, nested);
    }

    #[test]
    fn test_orphan_becomes_root() {
        let post = Uuid::new_v4();
        let tree = build_comment_tree(vec![record(Uuid::new_v4(), Some(Uuid::new_v4()), post)]);
        assert_eq!(tree.len(), 1);
        assert!(tree[0].children.is_empty());
    }
}
