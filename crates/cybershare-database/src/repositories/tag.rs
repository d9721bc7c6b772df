//! Tag repository implementation.

use sqlx::PgPool;
use uuid::Uuid;

use cybershare_core::error::{AppError, ErrorKind};
use cybershare_core::result::AppResult;
use cybershare_entity::taxonomy::{Tag, TagWithCount};

use super::{db_error, unique_violation};

/// Repository for post tags.
#[derive(Debug, Clone)]
pub struct TagRepository {
    pool: PgPool,
}

impl TagRepository {
    /// Create a new tag repository.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Find a tag by id.
    pub async fn find_by_id(&self, id: Uuid) -> AppResult<Option<Tag>> {
        sqlx::query_as::<_, Tag>("SELECT * FROM tags WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(db_error("Failed to find tag"))
    }

    /// Find a tag by name (case-insensitive).
    pub async fn find_by_name(&self, name: &str) -> AppResult<Option<Tag>> {
        sqlx::query_as::<_, Tag>("SELECT * FROM tags WHERE LOWER(name) = LOWER($1)")
            .bind(name)
            .fetch_optional(&self.pool)
            .await
            .map_err(db_error("Failed to find tag by name"))
    }

    /// Whether a tag other than `exclude` has this name.
    pub async fn name_exists(&self, name: &str, exclude: Option<Uuid>) -> AppResult<bool> {
        sqlx::query_scalar::<_, bool>(
            "SELECT EXISTS(SELECT 1 FROM tags \
             WHERE LOWER(name) = LOWER($1) AND ($2::uuid IS NULL OR id <> $2))",
        )
        .bind(name)
        .bind(exclude)
        .fetch_one(&self.pool)
        .await
        .map_err(db_error("Failed to check tag name"))
    }

    /// Whether a tag other than `exclude` has this slug.
    pub async fn slug_exists(&self, slug: &str, exclude: Option<Uuid>) -> AppResult<bool> {
        sqlx::query_scalar::<_, bool>(
            "SELECT EXISTS(SELECT 1 FROM tags WHERE slug = $1 AND ($2::uuid IS NULL OR id <> $2))",
        )
        .bind(slug)
        .bind(exclude)
        .fetch_one(&self.pool)
        .await
        .map_err(db_error("Failed to check tag slug"))
    }

    /// Up to `limit` tags whose name contains `query`, or the first
    /// `limit` tags by name when `query` is empty.
    pub async fn search(&self, query: &str, limit: i64) -> AppResult<Vec<Tag>> {
        let pattern = format!("%{}%", query.trim());
        sqlx::query_as::<_, Tag>("SELECT * FROM tags WHERE name ILIKE $1 ORDER BY name ASC LIMIT $2")
            .bind(pattern)
            .bind(limit)
            .fetch_all(&self.pool)
            .await
            .map_err(db_error("Failed to search tags"))
    }

    /// Tags ranked by published post count.
    pub async fn top(&self, limit: i64) -> AppResult<Vec<TagWithCount>> {
        sqlx::query_as::<_, TagWithCount>(
            "SELECT t.*, COUNT(p.id) AS post_count FROM tags t \
             LEFT JOIN post_tags pt ON pt.tag_id = t.id \
             LEFT JOIN posts p ON p.id = pt.post_id AND p.status = 'published' \
             GROUP BY t.id ORDER BY post_count DESC, t.name ASC LIMIT $1",
        )
        .bind(limit)
        .fetch_all(&self.pool)
        .await
        .map_err(db_error("Failed to load top tags"))
    }

    /// Insert a tag.
    pub async fn create(&self, name: &str, slug: &str, description: Option<&str>) -> AppResult<Tag> {
        sqlx::query_as::<_, Tag>(
            "INSERT INTO tags (name, slug, description) VALUES ($1, $2, $3) RETURNING *",
        )
        .bind(name)
        .bind(slug)
        .bind(description)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| map_write_error(e, name))
    }

    /// Overwrite a tag.
    pub async fn update(
        &self,
        id: Uuid,
        name: &str,
        slug: &str,
        description: Option<&str>,
    ) -> AppResult<Tag> {
        sqlx::query_as::<_, Tag>(
            "UPDATE tags SET name = $2, slug = $3, description = $4 WHERE id = $1 RETURNING *",
        )
        .bind(id)
        .bind(name)
        .bind(slug)
        .bind(description)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| map_write_error(e, name))?
        .ok_or_else(|| AppError::not_found("Tag not found"))
    }

    /// Delete a tag and detach it from every post.
    pub async fn delete(&self, id: Uuid) -> AppResult<bool> {
        let result = sqlx::query("DELETE FROM tags WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(db_error("Failed to delete tag"))?;
        Ok(result.rows_affected() > 0)
    }
}

fn map_write_error(e: sqlx::Error, name: &str) -> AppError {
    match unique_violation(&e) {
        Some("tags_name_key") | Some("tags_slug_key") => {
            AppError::conflict(format!("Tag '{name}' already exists"))
        }
        _ => AppError::with_source(ErrorKind::Database, "Failed to save tag", e),
    }
}
