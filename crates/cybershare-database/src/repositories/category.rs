//! Category repository implementation.

use sqlx::PgPool;
use uuid::Uuid;

use cybershare_core::error::{AppError, ErrorKind};
use cybershare_core::result::AppResult;
use cybershare_entity::taxonomy::{Category, CategoryWithCount};

use super::{db_error, unique_violation};

/// Repository for post categories.
#[derive(Debug, Clone)]
pub struct CategoryRepository {
    pool: PgPool,
}

impl CategoryRepository {
    /// Create a new category repository.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// All categories ordered by name.
    pub async fn find_all(&self) -> AppResult<Vec<Category>> {
        sqlx::query_as::<_, Category>("SELECT * FROM categories ORDER BY name ASC")
            .fetch_all(&self.pool)
            .await
            .map_err(db_error("Failed to list categories"))
    }

    /// Find a category by id.
    pub async fn find_by_id(&self, id: Uuid) -> AppResult<Option<Category>> {
        sqlx::query_as::<_, Category>("SELECT * FROM categories WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(db_error("Failed to find category"))
    }

    /// Find a category by slug.
    pub async fn find_by_slug(&self, slug: &str) -> AppResult<Option<Category>> {
        sqlx::query_as::<_, Category>("SELECT * FROM categories WHERE slug = $1")
            .bind(slug)
            .fetch_optional(&self.pool)
            .await
            .map_err(db_error("Failed to find category by slug"))
    }

    /// Whether a category other than `exclude` has this name.
    pub async fn name_exists(&self, name: &str, exclude: Option<Uuid>) -> AppResult<bool> {
        sqlx::query_scalar::<_, bool>(
            "SELECT EXISTS(SELECT 1 FROM categories \
             WHERE LOWER(name) = LOWER($1) AND ($2::uuid IS NULL OR id <> $2))",
        )
        .bind(name)
        .bind(exclude)
        .fetch_one(&self.pool)
        .await
        .map_err(db_error("Failed to check category name"))
    }

    /// Whether a category other than `exclude` has this slug.
    pub async fn slug_exists(&self, slug: &str, exclude: Option<Uuid>) -> AppResult<bool> {
        sqlx::query_scalar::<_, bool>(
            "SELECT EXISTS(SELECT 1 FROM categories WHERE slug = $1 AND ($2::uuid IS NULL OR id <> $2))",
        )
        .bind(slug)
        .bind(exclude)
        .fetch_one(&self.pool)
        .await
        .map_err(db_error("Failed to check category slug"))
    }

    /// Categories ranked by published post count.
    pub async fn top(&self, limit: i64) -> AppResult<Vec<CategoryWithCount>> {
        sqlx::query_as::<_, CategoryWithCount>(
            "SELECT c.*, COUNT(p.id) AS post_count FROM categories c \
             LEFT JOIN posts p ON p.category_id = c.id AND p.status = 'published' \
             GROUP BY c.id ORDER BY post_count DESC, c.name ASC LIMIT $1",
        )
        .bind(limit)
        .fetch_all(&self.pool)
        .await
        .map_err(db_error("Failed to load top categories"))
    }

    /// Insert a category.
    pub async fn create(
        &self,
        name: &str,
        slug: &str,
        description: Option<&str>,
        cover_image_url: Option<&str>,
    ) -> AppResult<Category> {
        sqlx::query_as::<_, Category>(
            "INSERT INTO categories (name, slug, description, cover_image_url) \
             VALUES ($1, $2, $3, $4) RETURNING *",
        )
        .bind(name)
        .bind(slug)
        .bind(description)
        .bind(cover_image_url)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| map_write_error(e, name))
    }

    /// Overwrite a category.
    pub async fn update(
        &self,
        id: Uuid,
        name: &str,
        slug: &str,
        description: Option<&str>,
        cover_image_url: Option<&str>,
    ) -> AppResult<Category> {
        sqlx::query_as::<_, Category>(
            "UPDATE categories SET name = $2, slug = $3, description = $4, cover_image_url = $5 \
             WHERE id = $1 RETURNING *",
        )
        .bind(id)
        .bind(name)
        .bind(slug)
        .bind(description)
        .bind(cover_image_url)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| map_write_error(e, name))?
        .ok_or_else(|| AppError::not_found("Category not found"))
    }

    /// Delete a category; its posts become uncategorized.
    pub async fn delete(&self, id: Uuid) -> AppResult<bool> {
        let result = sqlx::query("DELETE FROM categories WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(db_error("Failed to delete category"))?;
        Ok(result.rows_affected() > 0)
    }
}

fn map_write_error(e: sqlx::Error, name: &str) -> AppError {
    match unique_violation(&e) {
        Some("categories_name_key") | Some("categories_slug_key") => {
            AppError::conflict(format!("Category '{name}' already exists"))
        }
        _ => AppError::with_source(ErrorKind::Database, "Failed to save category", e),
    }
}
