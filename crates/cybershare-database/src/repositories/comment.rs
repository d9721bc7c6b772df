//! Comment repository implementation.

use sqlx::PgPool;
use uuid::Uuid;

use cybershare_core::error::AppError;
use cybershare_core::result::AppResult;
use cybershare_entity::comment::{Comment, CommentRecord};

use super::db_error;

const RECORD_SELECT: &str = "SELECT c.*, u.username AS author_username, \
    u.display_name AS author_display_name, u.avatar_url AS author_avatar_url \
    FROM comments c JOIN users u ON u.id = c.author_id";

/// Repository for threaded comments.
#[derive(Debug, Clone)]
pub struct CommentRepository {
    pool: PgPool,
}

impl CommentRepository {
    /// Create a new comment repository.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Find a comment by id.
    pub async fn find_by_id(&self, id: Uuid) -> AppResult<Option<Comment>> {
        sqlx::query_as::<_, Comment>("SELECT * FROM comments WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(db_error("Failed to find comment"))
    }

    /// Find a comment with its author columns.
    pub async fn find_record_by_id(&self, id: Uuid) -> AppResult<Option<CommentRecord>> {
        sqlx::query_as::<_, CommentRecord>(&format!("{RECORD_SELECT} WHERE c.id = $1"))
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(db_error("Failed to find comment"))
    }

    /// All comments on a post, oldest first.
    pub async fn find_by_post(&self, post_id: Uuid) -> AppResult<Vec<CommentRecord>> {
        sqlx::query_as::<_, CommentRecord>(&format!(
            "{RECORD_SELECT} WHERE c.post_id = $1 ORDER BY c.created_at ASC, c.id ASC"
        ))
        .bind(post_id)
        .fetch_all(&self.pool)
        .await
        .map_err(db_error("Failed to list comments"))
    }

    /// Insert a comment and bump the post's comment counter.
    pub async fn create(
        &self,
        post_id: Uuid,
        author_id: Uuid,
        parent_id: Option<Uuid>,
        content: &str,
    ) -> AppResult<Comment> {
        let mut tx = self.pool.begin().await.map_err(db_error("Failed to begin transaction"))?;

        let comment = sqlx::query_as::<_, Comment>(
            "INSERT INTO comments (post_id, author_id, parent_id, content) \
             VALUES ($1, $2, $3, $4) RETURNING *",
        )
        .bind(post_id)
        .bind(author_id)
        .bind(parent_id)
        .bind(content)
        .fetch_one(&mut *tx)
        .await
        .map_err(db_error("Failed to create comment"))?;

        sqlx::query("UPDATE posts SET comments_count = comments_count + 1 WHERE id = $1")
            .bind(post_id)
            .execute(&mut *tx)
            .await
            .map_err(db_error("Failed to increment comment count"))?;

        tx.commit().await.map_err(db_error("Failed to commit comment"))?;
        Ok(comment)
    }

    /// Replace the comment text.
    pub async fn update_content(&self, id: Uuid, content: &str) -> AppResult<Comment> {
        sqlx::query_as::<_, Comment>(
            "UPDATE comments SET content = $2, updated_at = NOW() WHERE id = $1 RETURNING *",
        )
        .bind(id)
        .bind(content)
        .fetch_optional(&self.pool)
        .await
        .map_err(db_error("Failed to update comment"))?
        .ok_or_else(|| AppError::not_found("Comment not found"))
    }

    /// Delete a comment with all of its replies. The post counter drops by
    /// the number of removed rows and never goes below zero.
    pub async fn delete_subtree(&self, comment: &Comment) -> AppResult<u64> {
        let mut tx = self.pool.begin().await.map_err(db_error("Failed to begin transaction"))?;

        sqlx::query("SELECT id FROM posts WHERE id = $1 FOR UPDATE")
            .bind(comment.post_id)
            .execute(&mut *tx)
            .await
            .map_err(db_error("Failed to lock post"))?;

        let removed: i64 = sqlx::query_scalar(
            "WITH RECURSIVE subtree AS ( \
                 SELECT id FROM comments WHERE id = $1 \
                 UNION ALL \
                 SELECT c.id FROM comments c JOIN subtree s ON c.parent_id = s.id) \
             SELECT COUNT(*) FROM subtree",
        )
        .bind(comment.id)
        .fetch_one(&mut *tx)
        .await
        .map_err(db_error("Failed to measure comment thread"))?;

        sqlx::query("DELETE FROM comments WHERE id = $1")
            .bind(comment.id)
            .execute(&mut *tx)
            .await
            .map_err(db_error("Failed to delete comment"))?;

        sqlx::query(
            "UPDATE posts SET comments_count = GREATEST(comments_count - $2, 0) WHERE id = $1",
        )
        .bind(comment.post_id)
        .bind(removed)
        .execute(&mut *tx)
        .await
        .map_err(db_error("Failed to decrement comment count"))?;

        tx.commit().await.map_err(db_error("Failed to commit comment deletion"))?;
        Ok(removed as u64)
    }
}
