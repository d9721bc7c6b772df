//! Admin service: statistics, user moderation and post review.
//!
//! Every method assumes the caller already passed the ADMIN role check in
//! the API layer. Category and tag management goes through the taxonomy
//! services directly.

use std::sync::Arc;

use tracing::info;
use uuid::Uuid;

use cybershare_core::AppError;
use cybershare_core::result::AppResult;
use cybershare_core::types::{PageRequest, PageResponse};
use cybershare_database::repositories::{
    PlatformStatistics, RefreshTokenRepository, StatsRepository, UserFilter, UserRepository,
};
use cybershare_entity::notification::NotificationKind;
use cybershare_entity::post::PostStatus;
use cybershare_entity::user::{User, UserRole, UserStatus};

use crate::context::RequestContext;
use crate::notification::{NotificationService, message};
use crate::post::{PostDetail, PostService};

/// Administrative operations.
#[derive(Debug, Clone)]
pub struct AdminService {
    stats_repo: Arc<StatsRepository>,
    user_repo: Arc<UserRepository>,
    refresh_repo: Arc<RefreshTokenRepository>,
    posts: Arc<PostService>,
    notifications: Arc<NotificationService>,
}

impl AdminService {
    /// Creates a new admin service.
    pub fn new(
        stats_repo: Arc<StatsRepository>,
        user_repo: Arc<UserRepository>,
        refresh_repo: Arc<RefreshTokenRepository>,
        posts: Arc<PostService>,
        notifications: Arc<NotificationService>,
    ) -> Self {
        Self {
            stats_repo,
            user_repo,
            refresh_repo,
            posts,
            notifications,
        }
    }

    /// Platform-wide counters.
    pub async fn statistics(&self) -> AppResult<PlatformStatistics> {
        self.stats_repo.platform().await
    }

    /// Users filtered by search text, status and role.
    pub async fn users(&self, filter: &UserFilter, page: &PageRequest) -> AppResult<PageResponse<User>> {
        self.user_repo.find_filtered(filter, page).await
    }

    /// Ban or reactivate a user. Banning revokes the user's refresh tokens.
    pub async fn set_user_status(
        &self,
        ctx: &RequestContext,
        user_id: Uuid,
        status: UserStatus,
    ) -> AppResult<User> {
        if user_id == ctx.user_id && status == UserStatus::Banned {
            return Err(AppError::validation("You cannot ban yourself"));
        }

        let user = self.user_repo.update_status(user_id, status).await?;
        if status == UserStatus::Banned {
            let revoked = self.refresh_repo.delete_for_user(user_id).await?;
            info!(user_id = %user_id, admin_id = %ctx.user_id, revoked, "User banned");
        } else {
            info!(user_id = %user_id, admin_id = %ctx.user_id, status = %status, "User status changed");
        }
        Ok(user)
    }

    /// Change a user's role and tell them about it.
    pub async fn set_user_role(
        &self,
        ctx: &RequestContext,
        user_id: Uuid,
        role: UserRole,
    ) -> AppResult<User> {
        let current = self
            .user_repo
            .find_by_id(user_id)
            .await?
            .ok_or_else(|| AppError::not_found("User not found"))?;
        if current.role == role {
            return Ok(current);
        }

        let user = self.user_repo.update_role(user_id, role).await?;
        self.notifications
            .notify(
                user_id,
                None,
                NotificationKind::RoleChange,
                None,
                message::role_changed(role),
            )
            .await;

        info!(user_id = %user_id, admin_id = %ctx.user_id, from = %current.role, to = %role, "User role changed");
        Ok(user)
    }

    /// All posts, optionally filtered by status.
    pub async fn posts(
        &self,
        status: Option<PostStatus>,
        page: &PageRequest,
    ) -> AppResult<PageResponse<PostDetail>> {
        self.posts.list_by_status(status, page).await
    }

    /// Posts waiting for review.
    pub async fn pending(&self, page: &PageRequest) -> AppResult<PageResponse<PostDetail>> {
        self.posts
            .list_by_status(Some(PostStatus::PendingReview), page)
            .await
    }

    /// Publish a post.
    pub async fn approve(&self, ctx: &RequestContext, post_id: Uuid) -> AppResult<()> {
        let post = self.posts.set_status(post_id, PostStatus::Published).await?;
        self.notify_author(ctx, post.author_id, post.id, message::post_approved(&post.title))
            .await;
        Ok(())
    }

    /// Send a post back to draft, optionally with a reason.
    pub async fn reject(
        &self,
        ctx: &RequestContext,
        post_id: Uuid,
        reason: Option<&str>,
    ) -> AppResult<()> {
        let post = self.posts.set_status(post_id, PostStatus::Draft).await?;
        self.notify_author(
            ctx,
            post.author_id,
            post.id,
            message::post_rejected(&post.title, reason),
        )
        .await;
        Ok(())
    }

    /// Hide a post from the public.
    pub async fn hide(&self, ctx: &RequestContext, post_id: Uuid) -> AppResult<()> {
        let post = self.posts.set_status(post_id, PostStatus::Hidden).await?;
        self.notify_author(ctx, post.author_id, post.id, message::post_hidden(&post.title))
            .await;
        Ok(())
    }

    /// Delete any post.
    pub async fn delete_post(&self, ctx: &RequestContext, post_id: Uuid) -> AppResult<()> {
        self.posts.delete_any(post_id).await?;
        info!(post_id = %post_id, admin_id = %ctx.user_id, "Post deleted by admin");
        Ok(())
    }

    async fn notify_author(&self, ctx: &RequestContext, author_id: Uuid, post_id: Uuid, text: String) {
        self.notifications
            .notify(
                author_id,
                Some(ctx.user_id),
                NotificationKind::PostStatus,
                Some(post_id),
                text,
            )
            .await;
    }
}
