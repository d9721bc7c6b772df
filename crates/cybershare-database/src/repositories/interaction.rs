//! Like and bookmark repository.
//!
//! Toggles lock the post row with `SELECT ... FOR UPDATE` so concurrent
//! toggles on the same post serialize and the counters stay consistent.

use sqlx::{PgPool, Postgres, Transaction};
use uuid::Uuid;

use cybershare_core::error::AppError;
use cybershare_core::result::AppResult;
use cybershare_entity::social::InteractionStatus;

use super::db_error;

#[derive(Debug, Clone, Copy)]
enum Kind {
    Like,
    Bookmark,
}

impl Kind {
    fn table(self) -> &'static str {
        match self {
            Self::Like => "likes",
            Self::Bookmark => "bookmarks",
        }
    }

    fn counter(self) -> &'static str {
        match self {
            Self::Like => "likes_count",
            Self::Bookmark => "bookmarks_count",
        }
    }
}

/// Outcome of a toggle: whether the row now exists, plus fresh counters.
#[derive(Debug, Clone, Copy)]
pub struct ToggleOutcome {
    pub active: bool,
    pub status: InteractionStatus,
}

/// Repository for likes and bookmarks.
#[derive(Debug, Clone)]
pub struct InteractionRepository {
    pool: PgPool,
}

impl InteractionRepository {
    /// Create a new interaction repository.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Like the post, or remove the like if present.
    pub async fn toggle_like(&self, user_id: Uuid, post_id: Uuid) -> AppResult<ToggleOutcome> {
        self.toggle(Kind::Like, user_id, post_id).await
    }

    /// Bookmark the post, or remove the bookmark if present.
    pub async fn toggle_bookmark(&self, user_id: Uuid, post_id: Uuid) -> AppResult<ToggleOutcome> {
        self.toggle(Kind::Bookmark, user_id, post_id).await
    }

    /// Current counters and the viewer's flags. Anonymous viewers get `false` flags.
    pub async fn status(&self, user_id: Option<Uuid>, post_id: Uuid) -> AppResult<InteractionStatus> {
        let row: Option<(bool, bool, i64, i64, i64)> = sqlx::query_as(
            "SELECT \
                EXISTS(SELECT 1 FROM likes WHERE post_id = p.id AND user_id = $2), \
                EXISTS(SELECT 1 FROM bookmarks WHERE post_id = p.id AND user_id = $2), \
                p.likes_count, p.bookmarks_count, p.comments_count \
             FROM posts p WHERE p.id = $1",
        )
        .bind(post_id)
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(db_error("Failed to load interaction status"))?;

        let (liked, bookmarked, likes_count, bookmarks_count, comments_count) =
            row.ok_or_else(|| AppError::not_found("Post not found"))?;
        Ok(InteractionStatus {
            liked,
            bookmarked,
            likes_count,
            bookmarks_count,
            comments_count,
        })
    }

    async fn toggle(&self, kind: Kind, user_id: Uuid, post_id: Uuid) -> AppResult<ToggleOutcome> {
        let mut tx = self.pool.begin().await.map_err(db_error("Failed to begin transaction"))?;

        let locked: Option<Uuid> = sqlx::query_scalar("SELECT id FROM posts WHERE id = $1 FOR UPDATE")
            .bind(post_id)
            .fetch_optional(&mut *tx)
            .await
            .map_err(db_error("Failed to lock post"))?;
        if locked.is_none() {
            return Err(AppError::not_found("Post not found"));
        }

        let removed = sqlx::query(&format!(
            "DELETE FROM {} WHERE user_id = $1 AND post_id = $2",
            kind.table()
        ))
        .bind(user_id)
        .bind(post_id)
        .execute(&mut *tx)
        .await
        .map_err(db_error("Failed to remove interaction"))?
        .rows_affected()
            > 0;

        let delta: i64 = if removed {
            -1
        } else {
            sqlx::query(&format!(
                "INSERT INTO {} (user_id, post_id) VALUES ($1, $2)",
                kind.table()
            ))
            .bind(user_id)
            .bind(post_id)
            .execute(&mut *tx)
            .await
            .map_err(db_error("Failed to add interaction"))?;
            1
        };

        sqlx::query(&format!(
            "UPDATE posts SET {c} = GREATEST({c} + $2, 0) WHERE id = $1",
            c = kind.counter()
        ))
        .bind(post_id)
        .bind(delta)
        .execute(&mut *tx)
        .await
        .map_err(db_error("Failed to adjust counter"))?;

        let status = load_status(&mut tx, user_id, post_id).await?;
        tx.commit().await.map_err(db_error("Failed to commit interaction"))?;

        Ok(ToggleOutcome {
            active: !removed,
            status,
        })
    }
}

async fn load_status(
    tx: &mut Transaction<'_, Postgres>,
    user_id: Uuid,
    post_id: Uuid,
) -> AppResult<InteractionStatus> {
    let (liked, bookmarked, likes_count, bookmarks_count, comments_count): (bool, bool, i64, i64, i64) =
        sqlx::query_as(
            "SELECT \
                EXISTS(SELECT 1 FROM likes WHERE post_id = p.id AND user_id = $2), \
                EXISTS(SELECT 1 FROM bookmarks WHERE post_id = p.id AND user_id = $2), \
                p.likes_count, p.bookmarks_count, p.comments_count \
             FROM posts p WHERE p.id = $1",
        )
        .bind(post_id)
        .bind(user_id)
        .fetch_one(&mut **tx)
        .await
        .map_err(db_error("Failed to load interaction status"))?;

    Ok(InteractionStatus {
        liked,
        bookmarked,
        likes_count,
        bookmarks_count,
        comments_count,
    })
}
