//! Aggregate platform statistics for the admin dashboard.

use serde::{Deserialize, Serialize};
use sqlx::{FromRow, PgPool};

use cybershare_core::result::AppResult;

use super::db_error;

/// Platform-wide counters.
#[derive(Debug, Clone, Default, Serialize, Deserialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct PlatformStatistics {
    pub total_users: i64,
    pub active_users: i64,
    pub banned_users: i64,
    pub total_posts: i64,
    pub published_posts: i64,
    pub pending_posts: i64,
    pub hidden_posts: i64,
    pub new_users_this_week: i64,
    pub new_posts_this_week: i64,
    pub total_views: i64,
    pub total_likes: i64,
    pub total_comments: i64,
}

/// Read-only aggregate queries.
#[derive(Debug, Clone)]
pub struct StatsRepository {
    pool: PgPool,
}

impl StatsRepository {
    /// Create a new stats repository.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Compute every dashboard counter in a single round trip.
    pub async fn platform(&self) -> AppResult<PlatformStatistics> {
        sqlx::query_as::<_, PlatformStatistics>(
            "SELECT \
                (SELECT COUNT(*) FROM users) AS total_users, \
                (SELECT COUNT(*) FROM users WHERE status = 'active') AS active_users, \
                (SELECT COUNT(*) FROM users WHERE status = 'banned') AS banned_users, \
                (SELECT COUNT(*) FROM posts) AS total_posts, \
                (SELECT COUNT(*) FROM posts WHERE status = 'published') AS published_posts, \
                (SELECT COUNT(*) FROM posts WHERE status = 'pending_review') AS pending_posts, \
                (SELECT COUNT(*) FROM posts WHERE status = 'hidden') AS hidden_posts, \
                (SELECT COUNT(*) FROM users WHERE created_at >= NOW() - INTERVAL '7 days') \
                    AS new_users_this_week, \
                (SELECT COUNT(*) FROM posts WHERE created_at >= NOW() - INTERVAL '7 days') \
                    AS new_posts_this_week, \
                (SELECT COALESCE(SUM(views), 0)::BIGINT FROM posts) AS total_views, \
                (SELECT COUNT(*) FROM likes) AS total_likes, \
                (SELECT COUNT(*) FROM comments) AS total_comments",
        )
        .fetch_one(&self.pool)
        .await
        .map_err(db_error("Failed to compute statistics"))
    }
}
