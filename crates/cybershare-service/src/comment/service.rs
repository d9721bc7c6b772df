//! Comment service: tree listing, create with notifications, edit, delete.

use std::sync::Arc;

use tracing::info;
use uuid::Uuid;

use cybershare_core::AppError;
use cybershare_core::result::AppResult;
use cybershare_database::repositories::{CommentRepository, PostRepository};
use cybershare_entity::comment::{Comment, CommentNode, build_comment_tree};
use cybershare_entity::notification::NotificationKind;

use crate::context::RequestContext;
use crate::notification::{NotificationService, message};
use crate::text::non_blank;

/// Handles comment use cases.
#[derive(Debug, Clone)]
pub struct CommentService {
    comment_repo: Arc<CommentRepository>,
    post_repo: Arc<PostRepository>,
    notifications: Arc<NotificationService>,
}

impl CommentService {
    /// Creates a new comment service.
    pub fn new(
        comment_repo: Arc<CommentRepository>,
        post_repo: Arc<PostRepository>,
        notifications: Arc<NotificationService>,
    ) -> Self {
        Self {
            comment_repo,
            post_repo,
            notifications,
        }
    }

    /// All comments of the post with `slug`, as a tree.
    pub async fn tree_for_post(&self, slug: &str) -> AppResult<Vec<CommentNode>> {
        let post = self
            .post_repo
            .find_record_by_slug(slug)
            .await?
            .ok_or_else(|| AppError::not_found("Post not found"))?;
        let records = self.comment_repo.find_by_post(post.post.id).await?;
        Ok(build_comment_tree(records))
    }

    /// Add a comment or a reply.
    pub async fn create(
        &self,
        ctx: &RequestContext,
        post_id: Uuid,
        content: &str,
        parent_id: Option<Uuid>,
    ) -> AppResult<CommentNode> {
        let content = non_blank("Comment", content)?;
        let post = self
            .post_repo
            .find_by_id(post_id)
            .await?
            .ok_or_else(|| AppError::not_found("Post not found"))?;

        let parent = match parent_id {
            Some(parent_id) => {
                let parent = self.find(parent_id).await?;
                if parent.post_id != post_id {
                    return Err(AppError::validation(
                        "Parent comment does not belong to this post",
                    ));
                }
                Some(parent)
            }
            None => None,
        };

        let comment = self
            .comment_repo
            .create(post_id, ctx.user_id, parent_id, content)
            .await?;

        match &parent {
            None => {
                self.notifications
                    .notify(
                        post.author_id,
                        Some(ctx.user_id),
                        NotificationKind::Comment,
                        Some(post.id),
                        message::commented_on_post(&ctx.username, &post.title),
                    )
                    .await
            }
            Some(parent) => {
                self.notifications
                    .notify(
                        parent.author_id,
                        Some(ctx.user_id),
                        NotificationKind::Reply,
                        Some(post.id),
                        message::replied_to_comment(&ctx.username),
                    )
                    .await
            }
        }

        info!(comment_id = %comment.id, post_id = %post_id, user_id = %ctx.user_id, "Comment created");
        self.node(comment.id).await
    }

    /// Edit a comment. Only its author may do this.
    pub async fn update(&self, ctx: &RequestContext, id: Uuid, content: &str) -> AppResult<CommentNode> {
        let comment = self.find(id).await?;
        if comment.author_id != ctx.user_id {
            return Err(AppError::authorization("You can only edit your own comments"));
        }
        let content = non_blank("Comment", content)?;
        self.comment_repo.update_content(id, content).await?;
        info!(comment_id = %id, user_id = %ctx.user_id, "Comment updated");
        self.node(id).await
    }

    /// Delete a comment and all replies beneath it. Authors and admins only.
    /// Returns the number of removed comments.
    pub async fn delete(&self, ctx: &RequestContext, id: Uuid) -> AppResult<u64> {
        let comment = self.find(id).await?;
        if comment.author_id != ctx.user_id && !ctx.is_admin() {
            return Err(AppError::authorization("You can only delete your own comments"));
        }
        let removed = self.comment_repo.delete_subtree(&comment).await?;
        info!(comment_id = %id, post_id = %comment.post_id, removed, "Comment subtree deleted");
        Ok(removed)
    }

    async fn find(&self, id: Uuid) -> AppResult<Comment> {
        self.comment_repo
            .find_by_id(id)
            .await?
            .ok_or_else(|| AppError::not_found("Comment not found"))
    }

    async fn node(&self, id: Uuid) -> AppResult<CommentNode> {
        self.comment_repo
            .find_record_by_id(id)
            .await?
            .map(CommentNode::from)
            .ok_or_else(|| AppError::not_found("Comment not found"))
    }
}
