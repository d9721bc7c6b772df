//! Category service with cached public listings.

use std::sync::Arc;

use tracing::{info, warn};
use uuid::Uuid;

use cybershare_cache::{CacheManager, keys};
use cybershare_core::AppError;
use cybershare_core::result::AppResult;
use cybershare_core::traits::CacheProvider;
use cybershare_database::repositories::CategoryRepository;
use cybershare_entity::taxonomy::{Category, CategoryWithCount};

use crate::slug::{slugify, unique_slug};

/// Category create/update payload.
#[derive(Debug, Clone)]
pub struct CategoryInput {
    pub name: String,
    pub description: Option<String>,
    pub cover_image_url: Option<String>,
}

/// Manages post categories.
#[derive(Debug, Clone)]
pub struct CategoryService {
    category_repo: Arc<CategoryRepository>,
    cache: Arc<CacheManager>,
}

impl CategoryService {
    /// Creates a new category service.
    pub fn new(category_repo: Arc<CategoryRepository>, cache: Arc<CacheManager>) -> Self {
        Self {
            category_repo,
            cache,
        }
    }

    /// All categories by name.
    pub async fn list(&self) -> AppResult<Vec<Category>> {
        let key = keys::category_list();
        if let Some(hit) = self.cached::<Vec<Category>>(&key).await {
            return Ok(hit);
        }
        let categories = self.category_repo.find_all().await?;
        self.store(&key, &categories).await;
        Ok(categories)
    }

    /// Categories ranked by published post count.
    pub async fn top(&self, limit: i64) -> AppResult<Vec<CategoryWithCount>> {
        let key = keys::top_categories(limit);
        if let Some(hit) = self.cached::<Vec<CategoryWithCount>>(&key).await {
            return Ok(hit);
        }
        let categories = self.category_repo.top(limit).await?;
        self.store(&key, &categories).await;
        Ok(categories)
    }

    /// Gets a category by id.
    pub async fn get(&self, id: Uuid) -> AppResult<Category> {
        self.category_repo
            .find_by_id(id)
            .await?
            .ok_or_else(|| AppError::not_found("Category not found"))
    }

    /// Gets a category by slug.
    pub async fn get_by_slug(&self, slug: &str) -> AppResult<Category> {
        self.category_repo
            .find_by_slug(slug)
            .await?
            .ok_or_else(|| AppError::not_found("Category not found"))
    }

    /// Creates a category. Names are unique.
    pub async fn create(&self, input: CategoryInput) -> AppResult<Category> {
        let name = input.name.trim();
        if self.category_repo.name_exists(name, None).await? {
            return Err(AppError::conflict(format!("Category '{name}' already exists")));
        }
        let slug = self.free_slug(name, None).await?;

        let category = self
            .category_repo
            .create(
                name,
                &slug,
                input.description.as_deref(),
                input.cover_image_url.as_deref(),
            )
            .await?;

        self.invalidate().await;
        info!(category_id = %category.id, slug = %category.slug, "Category created");
        Ok(category)
    }

    /// Replaces a category's fields. A new name regenerates the slug.
    pub async fn update(&self, id: Uuid, input: CategoryInput) -> AppResult<Category> {
        let current = self.get(id).await?;
        let name = input.name.trim();

        if self.category_repo.name_exists(name, Some(id)).await? {
            return Err(AppError::conflict(format!("Category '{name}' already exists")));
        }
        let slug = if name == current.name {
            current.slug
        } else {
            self.free_slug(name, Some(id)).await?
        };

        let category = self
            .category_repo
            .update(
                id,
                name,
                &slug,
                input.description.as_deref(),
                input.cover_image_url.as_deref(),
            )
            .await?;

        self.invalidate().await;
        info!(category_id = %id, "Category updated");
        Ok(category)
    }

    /// Deletes a category. Its posts become uncategorized.
    pub async fn delete(&self, id: Uuid) -> AppResult<()> {
        if !self.category_repo.delete(id).await? {
            return Err(AppError::not_found("Category not found"));
        }
        self.invalidate().await;
        info!(category_id = %id, "Category deleted");
        Ok(())
    }

    async fn free_slug(&self, name: &str, exclude: Option<Uuid>) -> AppResult<String> {
        let repo = &self.category_repo;
        unique_slug(&slugify(name), |candidate| async move {
            repo.slug_exists(&candidate, exclude).await
        })
        .await
    }

    async fn cached<T: serde::de::DeserializeOwned + Send>(&self, key: &str) -> Option<T> {
        match self.cache.get_json::<T>(key).await {
            Ok(hit) => hit,
            Err(e) => {
                warn!(key = %key, error = %e, "Category cache read failed");
                None
            }
        }
    }

    async fn store<T: serde::Serialize + Send + Sync>(&self, key: &str, value: &T) {
        let ttl = self.cache.ttl().taxonomy();
        if let Err(e) = self.cache.set_json(key, value, ttl).await {
            warn!(key = %key, error = %e, "Category cache write failed");
        }
    }

    async fn invalidate(&self) {
        if let Err(e) = self.cache.delete_pattern(&keys::category_pattern()).await {
            warn!(error = %e, "Failed to invalidate category cache");
        }
    }
}
