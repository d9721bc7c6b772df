//! Follow repository implementation.

use sqlx::PgPool;
use uuid::Uuid;

use cybershare_core::error::{AppError, ErrorKind};
use cybershare_core::result::AppResult;
use cybershare_core::types::{PageRequest, PageResponse};
use cybershare_entity::social::{Follow, FollowStats};
use cybershare_entity::user::AuthorRef;

use super::{db_error, unique_violation};

/// Repository for the follower graph.
#[derive(Debug, Clone)]
pub struct FollowRepository {
    pool: PgPool,
}

impl FollowRepository {
    /// Create a new follow repository.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Whether `follower_id` follows `following_id`.
    pub async fn exists(&self, follower_id: Uuid, following_id: Uuid) -> AppResult<bool> {
        sqlx::query_scalar::<_, bool>(
            "SELECT EXISTS(SELECT 1 FROM follows WHERE follower_id = $1 AND following_id = $2)",
        )
        .bind(follower_id)
        .bind(following_id)
        .fetch_one(&self.pool)
        .await
        .map_err(db_error("Failed to check follow"))
    }

    /// Insert a follow edge.
    pub async fn create(&self, follower_id: Uuid, following_id: Uuid) -> AppResult<Follow> {
        sqlx::query_as::<_, Follow>(
            "INSERT INTO follows (follower_id, following_id) VALUES ($1, $2) RETURNING *",
        )
        .bind(follower_id)
        .bind(following_id)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| match unique_violation(&e) {
            Some("follows_pair_key") => AppError::validation("Already following"),
            _ => AppError::with_source(ErrorKind::Database, "Failed to create follow", e),
        })
    }

    /// Remove a follow edge. Returns whether one existed.
    pub async fn delete(&self, follower_id: Uuid, following_id: Uuid) -> AppResult<bool> {
        let result = sqlx::query("DELETE FROM follows WHERE follower_id = $1 AND following_id = $2")
            .bind(follower_id)
            .bind(following_id)
            .execute(&self.pool)
            .await
            .map_err(db_error("Failed to delete follow"))?;
        Ok(result.rows_affected() > 0)
    }

    /// Users following `user_id`, most recent first.
    pub async fn followers(
        &self,
        user_id: Uuid,
        page: &PageRequest,
    ) -> AppResult<PageResponse<AuthorRef>> {
        self.edge_page(
            "SELECT u.id, u.username, u.display_name, u.avatar_url FROM follows f \
             JOIN users u ON u.id = f.follower_id WHERE f.following_id = $1 \
             ORDER BY f.created_at DESC LIMIT $2 OFFSET $3",
            "SELECT COUNT(*) FROM follows WHERE following_id = $1",
            user_id,
            page,
        )
        .await
    }

    /// Users that `user_id` follows, most recent first.
    pub async fn following(
        &self,
        user_id: Uuid,
        page: &PageRequest,
    ) -> AppResult<PageResponse<AuthorRef>> {
        self.edge_page(
            "SELECT u.id, u.username, u.display_name, u.avatar_url FROM follows f \
             JOIN users u ON u.id = f.following_id WHERE f.follower_id = $1 \
             ORDER BY f.created_at DESC LIMIT $2 OFFSET $3",
            "SELECT COUNT(*) FROM follows WHERE follower_id = $1",
            user_id,
            page,
        )
        .await
    }

    /// Follower and following counts.
    pub async fn stats(&self, user_id: Uuid) -> AppResult<FollowStats> {
        let (followers, following): (i64, i64) = sqlx::query_as(
            "SELECT \
                (SELECT COUNT(*) FROM follows WHERE following_id = $1), \
                (SELECT COUNT(*) FROM follows WHERE follower_id = $1)",
        )
        .bind(user_id)
        .fetch_one(&self.pool)
        .await
        .map_err(db_error("Failed to load follow stats"))?;

        Ok(FollowStats {
            followers,
            following,
        })
    }

    async fn edge_page(
        &self,
        select: &str,
        count: &str,
        user_id: Uuid,
        page: &PageRequest,
    ) -> AppResult<PageResponse<AuthorRef>> {
        let total: i64 = sqlx::query_scalar(count)
            .bind(user_id)
            .fetch_one(&self.pool)
            .await
            .map_err(db_error("Failed to count follows"))?;

        let users = sqlx::query_as::<_, AuthorRef>(select)
            .bind(user_id)
            .bind(page.limit())
            .bind(page.offset())
            .fetch_all(&self.pool)
            .await
            .map_err(db_error("Failed to list follows"))?;

        Ok(PageResponse::new(users, page, total as u64))
    }
}
