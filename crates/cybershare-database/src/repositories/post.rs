//! Post repository implementation.

use chrono::{DateTime, Utc};
use sqlx::{PgPool, Postgres, Transaction};
use uuid::Uuid;

use cybershare_core::error::{AppError, ErrorKind};
use cybershare_core::result::AppResult;
use cybershare_core::types::{PageRequest, PageResponse};
use cybershare_entity::post::{CreatePost, Post, PostRecord, PostStatus, PostTagRow, UpdatePost};

use super::{db_error, unique_violation};

const RECORD_SELECT: &str = "SELECT p.*, \
    u.username AS author_username, u.display_name AS author_display_name, \
    u.avatar_url AS author_avatar_url, \
    c.name AS category_name, c.slug AS category_slug \
    FROM posts p \
    JOIN users u ON u.id = p.author_id \
    LEFT JOIN categories c ON c.id = p.category_id";

const RECORD_COUNT: &str = "SELECT COUNT(*) FROM posts p";

const PUBLISHED_FILTER: &str = "p.status = 'published' \
    AND ($1::uuid IS NULL OR p.author_id = $1) \
    AND ($2::uuid IS NULL OR p.category_id = $2) \
    AND (($3::uuid IS NULL AND $4::text IS NULL) OR EXISTS ( \
        SELECT 1 FROM post_tags pt JOIN tags t ON t.id = pt.tag_id \
        WHERE pt.post_id = p.id \
          AND ($3::uuid IS NULL OR t.id = $3) \
          AND ($4::text IS NULL OR t.slug = $4)))";

/// Filters for the public post listing.
#[derive(Debug, Clone, Default)]
pub struct PostFilter {
    pub author_id: Option<Uuid>,
    pub category_id: Option<Uuid>,
    pub tag_id: Option<Uuid>,
    pub tag_slug: Option<String>,
}

/// Repository for posts, their tags and view records.
#[derive(Debug, Clone)]
pub struct PostRepository {
    pool: PgPool,
}

impl PostRepository {
    /// Create a new post repository.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Find a bare post row.
    pub async fn find_by_id(&self, id: Uuid) -> AppResult<Option<Post>> {
        sqlx::query_as::<_, Post>("SELECT * FROM posts WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(db_error("Failed to find post"))
    }

    /// Find a post with author and category columns.
    pub async fn find_record_by_id(&self, id: Uuid) -> AppResult<Option<PostRecord>> {
        sqlx::query_as::<_, PostRecord>(&format!("{RECORD_SELECT} WHERE p.id = $1"))
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(db_error("Failed to find post"))
    }

    /// Find a post by slug with author and category columns.
    pub async fn find_record_by_slug(&self, slug: &str) -> AppResult<Option<PostRecord>> {
        sqlx::query_as::<_, PostRecord>(&format!("{RECORD_SELECT} WHERE p.slug = $1"))
            .bind(slug)
            .fetch_optional(&self.pool)
            .await
            .map_err(db_error("Failed to find post by slug"))
    }

    /// Whether a slug is taken by a post other than `exclude`.
    pub async fn slug_exists(&self, slug: &str, exclude: Option<Uuid>) -> AppResult<bool> {
        sqlx::query_scalar::<_, bool>(
            "SELECT EXISTS(SELECT 1 FROM posts WHERE slug = $1 AND ($2::uuid IS NULL OR id <> $2))",
        )
        .bind(slug)
        .bind(exclude)
        .fetch_one(&self.pool)
        .await
        .map_err(db_error("Failed to check post slug"))
    }

    /// Insert a post and attach its tags in one transaction.
    pub async fn create(&self, data: &CreatePost, tag_ids: &[Uuid]) -> AppResult<Post> {
        let mut tx = self.pool.begin().await.map_err(db_error("Failed to begin transaction"))?;

        let published_at = data.status.is_public().then(Utc::now);
        let post = sqlx::query_as::<_, Post>(
            "INSERT INTO posts (author_id, category_id, title, slug, summary, content, \
                                cover_image_url, status, published_at) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9) RETURNING *",
        )
        .bind(data.author_id)
        .bind(data.category_id)
        .bind(&data.title)
        .bind(&data.slug)
        .bind(&data.summary)
        .bind(&data.content)
        .bind(&data.cover_image_url)
        .bind(data.status)
        .bind(published_at)
        .fetch_one(&mut *tx)
        .await
        .map_err(|e| match unique_violation(&e) {
            Some("posts_slug_key") => {
                AppError::conflict(format!("Slug '{}' is already in use", data.slug))
            }
            _ => AppError::with_source(ErrorKind::Database, "Failed to create post", e),
        })?;

        replace_tags(&mut tx, post.id, tag_ids).await?;
        tx.commit().await.map_err(db_error("Failed to commit post"))?;
        Ok(post)
    }

    /// Overwrite editable columns. `tag_ids` replaces the tag set when given.
    pub async fn update(
        &self,
        id: Uuid,
        data: &UpdatePost,
        tag_ids: Option<&[Uuid]>,
    ) -> AppResult<Post> {
        let mut tx = self.pool.begin().await.map_err(db_error("Failed to begin transaction"))?;

        let post = sqlx::query_as::<_, Post>(
            "UPDATE posts SET category_id = $2, title = $3, slug = $4, summary = $5, \
                              content = $6, cover_image_url = $7, status = $8, \
                              published_at = $9, updated_at = NOW() \
             WHERE id = $1 RETURNING *",
        )
        .bind(id)
        .bind(data.category_id)
        .bind(&data.title)
        .bind(&data.slug)
        .bind(&data.summary)
        .bind(&data.content)
        .bind(&data.cover_image_url)
        .bind(data.status)
        .bind(data.published_at)
        .fetch_optional(&mut *tx)
        .await
        .map_err(|e| match unique_violation(&e) {
            Some("posts_slug_key") => {
                AppError::conflict(format!("Slug '{}' is already in use", data.slug))
            }
            _ => AppError::with_source(ErrorKind::Database, "Failed to update post", e),
        })?
        .ok_or_else(|| AppError::not_found("Post not found"))?;

        if let Some(tag_ids) = tag_ids {
            replace_tags(&mut tx, id, tag_ids).await?;
        }
        tx.commit().await.map_err(db_error("Failed to commit post"))?;
        Ok(post)
    }

    /// Change the moderation status. `published_at` is only set once.
    pub async fn update_status(&self, id: Uuid, status: PostStatus) -> AppResult<Post> {
        sqlx::query_as::<_, Post>(
            "UPDATE posts SET status = $2, \
                 published_at = CASE WHEN $2 = 'published'::post_status \
                                     THEN COALESCE(published_at, NOW()) \
                                     ELSE published_at END, \
                 updated_at = NOW() \
             WHERE id = $1 RETURNING *",
        )
        .bind(id)
        .bind(status)
        .fetch_optional(&self.pool)
        .await
        .map_err(db_error("Failed to update post status"))?
        .ok_or_else(|| AppError::not_found("Post not found"))
    }

    /// Delete a post. Returns whether a row was removed.
    pub async fn delete(&self, id: Uuid) -> AppResult<bool> {
        let result = sqlx::query("DELETE FROM posts WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(db_error("Failed to delete post"))?;
        Ok(result.rows_affected() > 0)
    }

    /// Tags of every post in `post_ids`, ordered by name.
    pub async fn tags_for_posts(&self, post_ids: &[Uuid]) -> AppResult<Vec<PostTagRow>> {
        if post_ids.is_empty() {
            return Ok(Vec::new());
        }
        sqlx::query_as::<_, PostTagRow>(
            "SELECT pt.post_id, t.id AS tag_id, t.name, t.slug \
             FROM post_tags pt JOIN tags t ON t.id = pt.tag_id \
             WHERE pt.post_id = ANY($1) ORDER BY t.name",
        )
        .bind(post_ids)
        .fetch_all(&self.pool)
        .await
        .map_err(db_error("Failed to load post tags"))
    }

    /// Published posts matching `filter`, newest first.
    pub async fn find_published(
        &self,
        filter: &PostFilter,
        page: &PageRequest,
    ) -> AppResult<PageResponse<PostRecord>> {
        let total: i64 = sqlx::query_scalar(&format!("{RECORD_COUNT} WHERE {PUBLISHED_FILTER}"))
            .bind(filter.author_id)
            .bind(filter.category_id)
            .bind(filter.tag_id)
            .bind(&filter.tag_slug)
            .fetch_one(&self.pool)
            .await
            .map_err(db_error("Failed to count posts"))?;

        let items = sqlx::query_as::<_, PostRecord>(&format!(
            "{RECORD_SELECT} WHERE {PUBLISHED_FILTER} \
             ORDER BY p.published_at DESC NULLS LAST, p.created_at DESC LIMIT $5 OFFSET $6"
        ))
        .bind(filter.author_id)
        .bind(filter.category_id)
        .bind(filter.tag_id)
        .bind(&filter.tag_slug)
        .bind(page.limit())
        .bind(page.offset())
        .fetch_all(&self.pool)
        .await
        .map_err(db_error("Failed to list posts"))?;

        Ok(PageResponse::new(items, page, total as u64))
    }

    /// Posts written by `author_id`, any status unless filtered.
    pub async fn find_by_author(
        &self,
        author_id: Uuid,
        status: Option<PostStatus>,
        page: &PageRequest,
    ) -> AppResult<PageResponse<PostRecord>> {
        let clause = "p.author_id = $1 AND ($2::post_status IS NULL OR p.status = $2)";
        let total: i64 = sqlx::query_scalar(&format!("{RECORD_COUNT} WHERE {clause}"))
            .bind(author_id)
            .bind(status)
            .fetch_one(&self.pool)
            .await
            .map_err(db_error("Failed to count author posts"))?;

        let items = sqlx::query_as::<_, PostRecord>(&format!(
            "{RECORD_SELECT} WHERE {clause} ORDER BY p.created_at DESC LIMIT $3 OFFSET $4"
        ))
        .bind(author_id)
        .bind(status)
        .bind(page.limit())
        .bind(page.offset())
        .fetch_all(&self.pool)
        .await
        .map_err(db_error("Failed to list author posts"))?;

        Ok(PageResponse::new(items, page, total as u64))
    }

    /// All posts, optionally filtered by status. Used by moderators.
    pub async fn find_by_status(
        &self,
        status: Option<PostStatus>,
        page: &PageRequest,
    ) -> AppResult<PageResponse<PostRecord>> {
        let clause = "($1::post_status IS NULL OR p.status = $1)";
        let total: i64 = sqlx::query_scalar(&format!("{RECORD_COUNT} WHERE {clause}"))
            .bind(status)
            .fetch_one(&self.pool)
            .await
            .map_err(db_error("Failed to count posts"))?;

        let items = sqlx::query_as::<_, PostRecord>(&format!(
            "{RECORD_SELECT} WHERE {clause} ORDER BY p.created_at DESC LIMIT $2 OFFSET $3"
        ))
        .bind(status)
        .bind(page.limit())
        .bind(page.offset())
        .fetch_all(&self.pool)
        .await
        .map_err(db_error("Failed to list posts"))?;

        Ok(PageResponse::new(items, page, total as u64))
    }

    /// Case-insensitive search over title, summary and content.
    pub async fn search(
        &self,
        query: &str,
        page: &PageRequest,
    ) -> AppResult<PageResponse<PostRecord>> {
        let pattern = format!("%{}%", query.trim());
        let clause = "p.status = 'published' \
             AND (p.title ILIKE $1 OR p.summary ILIKE $1 OR p.content ILIKE $1)";

        let total: i64 = sqlx::query_scalar(&format!("{RECORD_COUNT} WHERE {clause}"))
            .bind(&pattern)
            .fetch_one(&self.pool)
            .await
            .map_err(db_error("Failed to count search results"))?;

        let items = sqlx::query_as::<_, PostRecord>(&format!(
            "{RECORD_SELECT} WHERE {clause} ORDER BY p.published_at DESC LIMIT $2 OFFSET $3"
        ))
        .bind(&pattern)
        .bind(page.limit())
        .bind(page.offset())
        .fetch_all(&self.pool)
        .await
        .map_err(db_error("Failed to search posts"))?;

        Ok(PageResponse::new(items, page, total as u64))
    }

    /// Published posts since `since`, ranked by views + likes*3 + comments*5.
    pub async fn trending(
        &self,
        since: DateTime<Utc>,
        page: &PageRequest,
    ) -> AppResult<PageResponse<PostRecord>> {
        let clause = "p.status = 'published' AND p.published_at >= $1";

        let total: i64 = sqlx::query_scalar(&format!("{RECORD_COUNT} WHERE {clause}"))
            .bind(since)
            .fetch_one(&self.pool)
            .await
            .map_err(db_error("Failed to count trending posts"))?;

        let items = sqlx::query_as::<_, PostRecord>(&format!(
            "{RECORD_SELECT} WHERE {clause} \
             ORDER BY (p.views + p.likes_count * 3 + p.comments_count * 5) DESC, \
                      p.published_at DESC \
             LIMIT $2 OFFSET $3"
        ))
        .bind(since)
        .bind(page.limit())
        .bind(page.offset())
        .fetch_all(&self.pool)
        .await
        .map_err(db_error("Failed to load trending posts"))?;

        Ok(PageResponse::new(items, page, total as u64))
    }

    /// Published posts by authors that `follower_id` follows.
    pub async fn feed(
        &self,
        follower_id: Uuid,
        page: &PageRequest,
    ) -> AppResult<PageResponse<PostRecord>> {
        let clause = "p.status = 'published' AND p.author_id IN \
             (SELECT following_id FROM follows WHERE follower_id = $1)";

        let total: i64 = sqlx::query_scalar(&format!("{RECORD_COUNT} WHERE {clause}"))
            .bind(follower_id)
            .fetch_one(&self.pool)
            .await
            .map_err(db_error("Failed to count feed"))?;

        let items = sqlx::query_as::<_, PostRecord>(&format!(
            "{RECORD_SELECT} WHERE {clause} ORDER BY p.published_at DESC LIMIT $2 OFFSET $3"
        ))
        .bind(follower_id)
        .bind(page.limit())
        .bind(page.offset())
        .fetch_all(&self.pool)
        .await
        .map_err(db_error("Failed to load feed"))?;

        Ok(PageResponse::new(items, page, total as u64))
    }

    /// Published posts sharing the category or a tag with `post`,
    /// ranked by shared tag count then recency.
    pub async fn similar(&self, post: &Post, limit: i64) -> AppResult<Vec<PostRecord>> {
        sqlx::query_as::<_, PostRecord>(&format!(
            "{RECORD_SELECT} \
             LEFT JOIN LATERAL ( \
                 SELECT COUNT(*) AS shared FROM post_tags a \
                 JOIN post_tags b ON b.tag_id = a.tag_id AND b.post_id = $1 \
                 WHERE a.post_id = p.id) s ON TRUE \
             WHERE p.status = 'published' AND p.id <> $1 \
               AND (s.shared > 0 OR ($2::uuid IS NOT NULL AND p.category_id = $2)) \
             ORDER BY s.shared DESC, p.published_at DESC \
             LIMIT $3"
        ))
        .bind(post.id)
        .bind(post.category_id)
        .bind(limit)
        .fetch_all(&self.pool)
        .await
        .map_err(db_error("Failed to load similar posts"))
    }

    /// Posts bookmarked by `user_id`, newest bookmark first.
    pub async fn bookmarked_by(
        &self,
        user_id: Uuid,
        page: &PageRequest,
    ) -> AppResult<PageResponse<PostRecord>> {
        let total: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM bookmarks WHERE user_id = $1")
            .bind(user_id)
            .fetch_one(&self.pool)
            .await
            .map_err(db_error("Failed to count bookmarks"))?;

        let items = sqlx::query_as::<_, PostRecord>(&format!(
            "{RECORD_SELECT} JOIN bookmarks b ON b.post_id = p.id AND b.user_id = $1 \
             ORDER BY b.created_at DESC LIMIT $2 OFFSET $3"
        ))
        .bind(user_id)
        .bind(page.limit())
        .bind(page.offset())
        .fetch_all(&self.pool)
        .await
        .map_err(db_error("Failed to list bookmarks"))?;

        Ok(PageResponse::new(items, page, total as u64))
    }

    /// Record a view unless this user (or, when anonymous, this IP) has
    /// already viewed the post. Returns the current view count.
    pub async fn record_view(
        &self,
        post_id: Uuid,
        user_id: Option<Uuid>,
        ip_address: Option<&str>,
    ) -> AppResult<i64> {
        let mut tx = self.pool.begin().await.map_err(db_error("Failed to begin transaction"))?;

        let views: i64 = sqlx::query_scalar("SELECT views FROM posts WHERE id = $1 FOR UPDATE")
            .bind(post_id)
            .fetch_optional(&mut *tx)
            .await
            .map_err(db_error("Failed to lock post"))?
            .ok_or_else(|| AppError::not_found("Post not found"))?;

        let seen: bool = match (user_id, ip_address) {
            (Some(uid), _) => sqlx::query_scalar::<_, bool>(
                "SELECT EXISTS(SELECT 1 FROM post_views WHERE post_id = $1 AND user_id = $2)",
            )
            .bind(post_id)
            .bind(uid),
            (None, ip) => sqlx::query_scalar::<_, bool>(
                "SELECT EXISTS(SELECT 1 FROM post_views \
                 WHERE post_id = $1 AND user_id IS NULL AND ip_address = $2)",
            )
            .bind(post_id)
            .bind(ip),
        }
        .fetch_one(&mut *tx)
        .await
        .map_err(db_error("Failed to check post view"))?;

        if seen {
            tx.commit().await.map_err(db_error("Failed to commit view"))?;
            return Ok(views);
        }

        sqlx::query("INSERT INTO post_views (post_id, user_id, ip_address) VALUES ($1, $2, $3)")
            .bind(post_id)
            .bind(user_id)
            .bind(ip_address)
            .execute(&mut *tx)
            .await
            .map_err(db_error("Failed to insert post view"))?;

        let views: i64 =
            sqlx::query_scalar("UPDATE posts SET views = views + 1 WHERE id = $1 RETURNING views")
                .bind(post_id)
                .fetch_one(&mut *tx)
                .await
                .map_err(db_error("Failed to increment views"))?;

        tx.commit().await.map_err(db_error("Failed to commit view"))?;
        Ok(views)
    }
}

async fn replace_tags(
    tx: &mut Transaction<'_, Postgres>,
    post_id: Uuid,
    tag_ids: &[Uuid],
) -> AppResult<()> {
    sqlx::query("DELETE FROM post_tags WHERE post_id = $1")
        .bind(post_id)
        .execute(&mut **tx)
        .await
        .map_err(db_error("Failed to clear post tags"))?;

    if !tag_ids.is_empty() {
        sqlx::query(
            "INSERT INTO post_tags (post_id, tag_id) \
             SELECT $1, tag_id FROM UNNEST($2::uuid[]) AS tag_id ON CONFLICT DO NOTHING",
        )
        .bind(post_id)
        .bind(tag_ids)
        .execute(&mut **tx)
        .await
        .map_err(db_error("Failed to attach post tags"))?;
    }
    Ok(())
}
