//! Tag service: search, ranking, admin CRUD and find-or-create for posts.

use std::sync::Arc;

use tracing::{debug, info, warn};
use uuid::Uuid;

use cybershare_cache::{CacheManager, keys};
use cybershare_core::AppError;
use cybershare_core::result::AppResult;
use cybershare_core::traits::CacheProvider;
use cybershare_database::repositories::TagRepository;
use cybershare_entity::taxonomy::{Tag, TagWithCount};

use crate::slug::{slugify, unique_slug};

/// Tag create/update payload.
#[derive(Debug, Clone)]
pub struct TagInput {
    pub name: String,
    pub description: Option<String>,
}

/// Manages tags.
#[derive(Debug, Clone)]
pub struct TagService {
    tag_repo: Arc<TagRepository>,
    cache: Arc<CacheManager>,
    search_limit: i64,
}

impl TagService {
    /// Creates a new tag service returning at most `search_limit` search hits.
    pub fn new(tag_repo: Arc<TagRepository>, cache: Arc<CacheManager>, search_limit: i64) -> Self {
        Self {
            tag_repo,
            cache,
            search_limit,
        }
    }

    /// Tags whose name contains `query`; all tags (up to the limit) when empty.
    pub async fn search(&self, query: Option<&str>) -> AppResult<Vec<Tag>> {
        self.tag_repo
            .search(query.unwrap_or_default(), self.search_limit)
            .await
    }

    /// Tags ranked by published post count.
    pub async fn top(&self, limit: i64) -> AppResult<Vec<TagWithCount>> {
        let key = keys::top_tags(limit);
        match self.cache.get_json::<Vec<TagWithCount>>(&key).await {
            Ok(Some(hit)) => return Ok(hit),
            Ok(None) => {}
            Err(e) => warn!(error = %e, "Tag cache read failed"),
        }
        let tags = self.tag_repo.top(limit).await?;
        let ttl = self.cache.ttl().taxonomy();
        if let Err(e) = self.cache.set_json(&key, &tags, ttl).await {
            warn!(error = %e, "Tag cache write failed");
        }
        Ok(tags)
    }

    /// Creates a tag. Names are unique case-insensitively.
    pub async fn create(&self, input: TagInput) -> AppResult<Tag> {
        let name = input.name.trim();
        if self.tag_repo.name_exists(name, None).await? {
            return Err(AppError::conflict(format!("Tag '{name}' already exists")));
        }
        let tag = self.insert(name, input.description.as_deref()).await?;
        info!(tag_id = %tag.id, slug = %tag.slug, "Tag created");
        Ok(tag)
    }

    /// Replaces a tag's name and description.
    pub async fn update(&self, id: Uuid, input: TagInput) -> AppResult<Tag> {
        let current = self
            .tag_repo
            .find_by_id(id)
            .await?
            .ok_or_else(|| AppError::not_found("Tag not found"))?;
        let name = input.name.trim();

        if self.tag_repo.name_exists(name, Some(id)).await? {
            return Err(AppError::conflict(format!("Tag '{name}' already exists")));
        }
        let slug = if name == current.name {
            current.slug
        } else {
            self.free_slug(name, Some(id)).await?
        };

        let tag = self
            .tag_repo
            .update(id, name, &slug, input.description.as_deref())
            .await?;
        self.invalidate().await;
        info!(tag_id = %id, "Tag updated");
        Ok(tag)
    }

    /// Deletes a tag and detaches it from all posts.
    pub async fn delete(&self, id: Uuid) -> AppResult<()> {
        if !self.tag_repo.delete(id).await? {
            return Err(AppError::not_found("Tag not found"));
        }
        self.invalidate().await;
        info!(tag_id = %id, "Tag deleted");
        Ok(())
    }

    /// Resolve tag names to ids, creating missing tags. Blank and
    /// duplicate names are ignored.
    pub async fn find_or_create(&self, names: &[String]) -> AppResult<Vec<Uuid>> {
        let mut ids = Vec::with_capacity(names.len());
        let mut seen: Vec<String> = Vec::with_capacity(names.len());

        for raw in names {
            let name = raw.trim();
            if name.is_empty() || seen.iter().any(|s| s.eq_ignore_ascii_case(name)) {
                continue;
            }
            seen.push(name.to_string());

            let id = match self.tag_repo.find_by_name(name).await? {
                Some(tag) => tag.id,
                None => {
                    let tag = self.insert(name, None).await?;
                    debug!(tag_id = %tag.id, name = %tag.name, "Tag created from post");
                    tag.id
                }
            };
            if !ids.contains(&id) {
                ids.push(id);
            }
        }
        Ok(ids)
    }

    async fn insert(&self, name: &str, description: Option<&str>) -> AppResult<Tag> {
        let slug = self.free_slug(name, None).await?;
        let tag = self.tag_repo.create(name, &slug, description).await?;
        self.invalidate().await;
        Ok(tag)
    }

    async fn free_slug(&self, name: &str, exclude: Option<Uuid>) -> AppResult<String> {
        let repo = &self.tag_repo;
        unique_slug(&slugify(name), |candidate| async move {
            repo.slug_exists(&candidate, exclude).await
        })
        .await
    }

    async fn invalidate(&self) {
        if let Err(e) = self.cache.delete_pattern(&keys::tag_pattern()).await {
            warn!(error = %e, "Failed to invalidate tag cache");
        }
    }
}
