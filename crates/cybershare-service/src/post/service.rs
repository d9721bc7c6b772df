//! Post service: authoring, visibility rules, discovery and view counting.

use std::sync::Arc;

use chrono::{DateTime, Duration, Utc};
use tracing::info;
use uuid::Uuid;

use cybershare_core::AppError;
use cybershare_core::result::AppResult;
use cybershare_core::types::{PageRequest, PageResponse};
use cybershare_database::repositories::{PostFilter, PostRepository, UserRepository};
use cybershare_entity::post::{CreatePost, Post, PostRecord, PostStatus, UpdatePost};

use super::view::{self, PostDetail};
use crate::context::RequestContext;
use crate::slug::{slugify, unique_slug};
use crate::taxonomy::{CategoryService, TagService};
use crate::text::non_blank;

/// Input for [`PostService::create`].
#[derive(Debug, Clone, Default)]
pub struct CreatePostInput {
    pub title: String,
    pub content: String,
    pub summary: Option<String>,
    pub category_id: Option<Uuid>,
    pub cover_image_url: Option<String>,
    pub status: Option<PostStatus>,
    pub tags: Vec<String>,
}

/// Input for [`PostService::update`]. `None` keeps the current value.
#[derive(Debug, Clone, Default)]
pub struct UpdatePostInput {
    pub title: Option<String>,
    pub content: Option<String>,
    pub summary: Option<String>,
    pub category_id: Option<Uuid>,
    pub cover_image_url: Option<String>,
    pub status: Option<PostStatus>,
    pub tags: Option<Vec<String>>,
}

/// Handles post use cases.
#[derive(Debug, Clone)]
pub struct PostService {
    post_repo: Arc<PostRepository>,
    user_repo: Arc<UserRepository>,
    categories: Arc<CategoryService>,
    tags: Arc<TagService>,
    trending_window_days: i64,
}

impl PostService {
    /// Creates a new post service.
    pub fn new(
        post_repo: Arc<PostRepository>,
        user_repo: Arc<UserRepository>,
        categories: Arc<CategoryService>,
        tags: Arc<TagService>,
        trending_window_days: i64,
    ) -> Self {
        Self {
            post_repo,
            user_repo,
            categories,
            tags,
            trending_window_days,
        }
    }

    /// Create a post owned by the caller.
    pub async fn create(&self, ctx: &RequestContext, input: CreatePostInput) -> AppResult<PostDetail> {
        let title = non_blank("Title", &input.title)?.to_string();
        non_blank("Content", &input.content)?;
        if let Some(category_id) = input.category_id {
            self.categories.get(category_id).await?;
        }

        let slug = self.free_slug(&slugify(&title), None).await?;
        let tag_ids = self.tags.find_or_create(&input.tags).await?;

        let post = self
            .post_repo
            .create(
                &CreatePost {
                    author_id: ctx.user_id,
                    category_id: input.category_id,
                    title,
                    slug,
                    summary: input.summary,
                    content: input.content,
                    cover_image_url: input.cover_image_url,
                    status: input.status.unwrap_or_default(),
                },
                &tag_ids,
            )
            .await?;

        info!(post_id = %post.id, user_id = %ctx.user_id, status = %post.status, "Post created");
        self.detail(post.id).await
    }

    /// Update a post. Only its author may do this.
    pub async fn update(
        &self,
        ctx: &RequestContext,
        id: Uuid,
        input: UpdatePostInput,
    ) -> AppResult<PostDetail> {
        let current = self.find(id).await?;
        if !current.is_authored_by(ctx.user_id) {
            return Err(AppError::authorization("You can only edit your own posts"));
        }

        let (title, slug) = match input.title {
            Some(title) => {
                let title = non_blank("Title", &title)?.to_string();
                let base = slugify(&title);
                let slug = if current.slug.starts_with(&base) {
                    current.slug.clone()
                } else {
                    self.free_slug(&base, Some(id)).await?
                };
                (title, slug)
            }
            None => (current.title.clone(), current.slug.clone()),
        };

        if let Some(content) = &input.content {
            non_blank("Content", content)?;
        }

        let category_id = match input.category_id {
            Some(category_id) => Some(self.categories.get(category_id).await?.id),
            None => current.category_id,
        };

        let status = input.status.unwrap_or(current.status);
        let published_at = first_publication(&current, status, Utc::now());

        let tag_ids = match &input.tags {
            Some(names) => Some(self.tags.find_or_create(names).await?),
            None => None,
        };

        let data = UpdatePost {
            category_id,
            title,
            slug,
            summary: input.summary.or(current.summary),
            content: input.content.unwrap_or(current.content),
            cover_image_url: input.cover_image_url.or(current.cover_image_url),
            status,
            published_at,
        };
        self.post_repo.update(id, &data, tag_ids.as_deref()).await?;

        info!(post_id = %id, user_id = %ctx.user_id, "Post updated");
        self.detail(id).await
    }

    /// Delete a post. Only its author may do this.
    pub async fn delete(&self, ctx: &RequestContext, id: Uuid) -> AppResult<()> {
        let post = self.find(id).await?;
        if !post.is_authored_by(ctx.user_id) {
            return Err(AppError::authorization("You can only delete your own posts"));
        }
        self.post_repo.delete(id).await?;
        info!(post_id = %id, user_id = %ctx.user_id, "Post deleted");
        Ok(())
    }

    /// A post by id, subject to visibility rules.
    pub async fn get(&self, viewer: Option<&RequestContext>, id: Uuid) -> AppResult<PostDetail> {
        let record = self
            .post_repo
            .find_record_by_id(id)
            .await?
            .ok_or_else(not_found)?;
        self.visible(viewer, record).await
    }

    /// A post by slug, subject to visibility rules.
    pub async fn get_by_slug(
        &self,
        viewer: Option<&RequestContext>,
        slug: &str,
    ) -> AppResult<PostDetail> {
        let record = self
            .post_repo
            .find_record_by_slug(slug)
            .await?
            .ok_or_else(not_found)?;
        self.visible(viewer, record).await
    }

    /// Published posts, optionally narrowed to an author, category or tag.
    pub async fn list_published(
        &self,
        author: Option<&str>,
        filter: PostFilter,
        page: &PageRequest,
    ) -> AppResult<PageResponse<PostDetail>> {
        let mut filter = filter;
        if let Some(username) = author.filter(|a| !a.is_empty()) {
            match self.user_repo.find_by_username(username).await? {
                Some(user) => filter.author_id = Some(user.id),
                None => return Ok(PageResponse::empty(page)),
            }
        }
        let records = self.post_repo.find_published(&filter, page).await?;
        self.with_tags(records).await
    }

    /// The caller's own posts, optionally filtered by status.
    pub async fn my_posts(
        &self,
        ctx: &RequestContext,
        status: Option<PostStatus>,
        page: &PageRequest,
    ) -> AppResult<PageResponse<PostDetail>> {
        let records = self
            .post_repo
            .find_by_author(ctx.user_id, status, page)
            .await?;
        self.with_tags(records).await
    }

    /// Every post, optionally filtered by status. Moderation only.
    pub async fn list_by_status(
        &self,
        status: Option<PostStatus>,
        page: &PageRequest,
    ) -> AppResult<PageResponse<PostDetail>> {
        let records = self.post_repo.find_by_status(status, page).await?;
        self.with_tags(records).await
    }

    /// Count a view, deduplicated per user or, for anonymous readers, per IP.
    pub async fn record_view(
        &self,
        id: Uuid,
        viewer: Option<Uuid>,
        ip_address: Option<&str>,
    ) -> AppResult<i64> {
        self.post_repo.record_view(id, viewer, ip_address).await
    }

    /// Full-text-ish search over published posts.
    pub async fn search(&self, query: &str, page: &PageRequest) -> AppResult<PageResponse<PostDetail>> {
        let query = query.trim();
        if query.is_empty() {
            return Ok(PageResponse::empty(page));
        }
        let records = self.post_repo.search(query, page).await?;
        self.with_tags(records).await
    }

    /// Published posts ranked by engagement since `since`.
    pub async fn trending(
        &self,
        since: Option<DateTime<Utc>>,
        page: &PageRequest,
    ) -> AppResult<PageResponse<PostDetail>> {
        let since =
            since.unwrap_or_else(|| Utc::now() - Duration::days(self.trending_window_days));
        let records = self.post_repo.trending(since, page).await?;
        self.with_tags(records).await
    }

    /// Published posts by authors the caller follows.
    pub async fn feed(
        &self,
        ctx: &RequestContext,
        page: &PageRequest,
    ) -> AppResult<PageResponse<PostDetail>> {
        let records = self.post_repo.feed(ctx.user_id, page).await?;
        self.with_tags(records).await
    }

    /// Published posts related to `id` by category or tags.
    pub async fn similar(&self, id: Uuid, limit: i64) -> AppResult<Vec<PostDetail>> {
        let post = self.find(id).await?;
        let records = self.post_repo.similar(&post, limit.clamp(1, 50)).await?;
        let ids: Vec<Uuid> = records.iter().map(|r| r.post.id).collect();
        let tags = self.post_repo.tags_for_posts(&ids).await?;
        Ok(view::assemble(records, tags))
    }

    /// Posts the caller bookmarked, newest bookmark first.
    pub async fn bookmarks(
        &self,
        ctx: &RequestContext,
        page: &PageRequest,
    ) -> AppResult<PageResponse<PostDetail>> {
        let records = self.post_repo.bookmarked_by(ctx.user_id, page).await?;
        self.with_tags(records).await
    }

    /// Move a post to `status`, setting `published_at` on first publication.
    pub async fn set_status(&self, id: Uuid, status: PostStatus) -> AppResult<Post> {
        let post = self.post_repo.update_status(id, status).await?;
        info!(post_id = %id, status = %status, "Post status changed");
        Ok(post)
    }

    /// Delete any post. Moderation only.
    pub async fn delete_any(&self, id: Uuid) -> AppResult<()> {
        if !self.post_repo.delete(id).await? {
            return Err(not_found());
        }
        info!(post_id = %id, "Post deleted by moderator");
        Ok(())
    }

    /// A bare post row or NotFound.
    pub async fn find(&self, id: Uuid) -> AppResult<Post> {
        self.post_repo.find_by_id(id).await?.ok_or_else(not_found)
    }

    async fn detail(&self, id: Uuid) -> AppResult<PostDetail> {
        let record = self
            .post_repo
            .find_record_by_id(id)
            .await?
            .ok_or_else(not_found)?;
        self.attach(record).await
    }

    async fn visible(&self, viewer: Option<&RequestContext>, record: PostRecord) -> AppResult<PostDetail> {
        if !can_view(&record.post, viewer) {
            return Err(not_found());
        }
        self.attach(record).await
    }

    async fn attach(&self, record: PostRecord) -> AppResult<PostDetail> {
        let tags = self.post_repo.tags_for_posts(&[record.post.id]).await?;
        view::assemble(vec![record], tags)
            .pop()
            .ok_or_else(not_found)
    }

    async fn with_tags(&self, page: PageResponse<PostRecord>) -> AppResult<PageResponse<PostDetail>> {
        let tags = self.post_repo.tags_for_posts(&view::page_ids(&page)).await?;
        let PageResponse {
            items,
            page,
            page_size,
            total_items,
            total_pages,
            has_next,
            has_previous,
        } = page;
        Ok(PageResponse {
            items: view::assemble(items, tags),
            page,
            page_size,
            total_items,
            total_pages,
            has_next,
            has_previous,
        })
    }

    async fn free_slug(&self, base: &str, exclude: Option<Uuid>) -> AppResult<String> {
        let repo = &self.post_repo;
        unique_slug(base, |candidate| async move {
            repo.slug_exists(&candidate, exclude).await
        })
        .await
    }
}

fn not_found() -> AppError {
    AppError::not_found("Post not found")
}

/// Non-public posts are only visible to their author and admins.
fn can_view(post: &Post, viewer: Option<&RequestContext>) -> bool {
    post.status.is_public()
        || viewer.is_some_and(|ctx| ctx.is_admin() || post.is_authored_by(ctx.user_id))
}

/// `published_at` after moving `post` to `status`.
fn first_publication(post: &Post, status: PostStatus, now: DateTime<Utc>) -> Option<DateTime<Utc>> {
    match (post.published_at, status) {
        (Some(at), _) => Some(at),
        (None, PostStatus::Published) => Some(now),
        (None, _) => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use cybershare_entity::user::UserRole;

    fn post(status: PostStatus, author_id: Uuid) -> Post {
        let now = Utc::now();
        Post {
            id: Uuid::new_v4(),
            author_id,
            category_id: None,
            title: "t".into(),
            slug: "t".into(),
            summary: None,
            content: String::new(),
            cover_image_url: None,
            status,
            views: 0,
            likes_count: 0,
            comments_count: 0,
            bookmarks_count: 0,
            published_at: None,
            created_at: now,
            updated_at: now,
        }
    }

    #[test]
    fn test_draft_visible_to_author_and_admin_only() {
        let author = Uuid::new_v4();
        let draft = post(PostStatus::Draft, author);

        assert!(!can_view(&draft, None));
        assert!(can_view(&draft, Some(&RequestContext::for_user(author, UserRole::User))));
        assert!(can_view(
            &draft,
            Some(&RequestContext::for_user(Uuid::new_v4(), UserRole::Admin))
        ));
        assert!(!can_view(
            &draft,
            Some(&RequestContext::for_user(Uuid::new_v4(), UserRole::Author))
        ));
    }

    #[test]
    fn test_published_visible_to_everyone() {
        assert!(can_view(&post(PostStatus::Published, Uuid::new_v4()), None));
    }

    #[test]
    fn test_first_publication_only_once() {
        let now = Utc::now();
        let mut p = post(PostStatus::Draft, Uuid::new_v4());
        assert_eq!(first_publication(&p, PostStatus::Published, now), Some(now));
        assert_eq!(first_publication(&p, PostStatus::PendingReview, now), None);

        let earlier = now - Duration::days(3);
        p.published_at = Some(earlier);
        assert_eq!(first_publication(&p, PostStatus::Published, now), Some(earlier));
        assert_eq!(first_publication(&p, PostStatus::Hidden, now), Some(earlier));
    }
}
