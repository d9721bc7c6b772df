//! Follow service.

use std::sync::Arc;

use tracing::info;

use cybershare_core::AppError;
use cybershare_core::result::AppResult;
use cybershare_core::types::{PageRequest, PageResponse};
use cybershare_database::repositories::{FollowRepository, UserRepository};
use cybershare_entity::notification::NotificationKind;
use cybershare_entity::social::FollowStats;
use cybershare_entity::user::{AuthorRef, User};

use crate::context::RequestContext;
use crate::notification::{NotificationService, message};

/// Handles follow/unfollow and follower listings.
#[derive(Debug, Clone)]
pub struct FollowService {
    follow_repo: Arc<FollowRepository>,
    user_repo: Arc<UserRepository>,
    notifications: Arc<NotificationService>,
}

impl FollowService {
    /// Creates a new follow service.
    pub fn new(
        follow_repo: Arc<FollowRepository>,
        user_repo: Arc<UserRepository>,
        notifications: Arc<NotificationService>,
    ) -> Self {
        Self {
            follow_repo,
            user_repo,
            notifications,
        }
    }

    /// Follow `username`.
    pub async fn follow(&self, ctx: &RequestContext, username: &str) -> AppResult<()> {
        let target = self.user(username).await?;
        if target.id == ctx.user_id {
            return Err(AppError::validation("You cannot follow yourself"));
        }
        if self.follow_repo.exists(ctx.user_id, target.id).await? {
            return Err(AppError::validation("Already following"));
        }

        self.follow_repo.create(ctx.user_id, target.id).await?;
        self.notifications
            .notify(
                target.id,
                Some(ctx.user_id),
                NotificationKind::Follow,
                Some(ctx.user_id),
                message::started_following(&ctx.username),
            )
            .await;

        info!(follower_id = %ctx.user_id, following_id = %target.id, "Follow created");
        Ok(())
    }

    /// Stop following `username`.
    pub async fn unfollow(&self, ctx: &RequestContext, username: &str) -> AppResult<()> {
        let target = self.user(username).await?;
        if !self.follow_repo.delete(ctx.user_id, target.id).await? {
            return Err(AppError::validation("Not following"));
        }
        info!(follower_id = %ctx.user_id, following_id = %target.id, "Follow removed");
        Ok(())
    }

    /// Whether the caller follows `username`.
    pub async fn is_following(&self, ctx: &RequestContext, username: &str) -> AppResult<bool> {
        let target = self.user(username).await?;
        self.follow_repo.exists(ctx.user_id, target.id).await
    }

    /// Users following `username`.
    pub async fn followers(
        &self,
        username: &str,
        page: &PageRequest,
    ) -> AppResult<PageResponse<AuthorRef>> {
        let user = self.user(username).await?;
        self.follow_repo.followers(user.id, page).await
    }

    /// Users `username` follows.
    pub async fn following(
        &self,
        username: &str,
        page: &PageRequest,
    ) -> AppResult<PageResponse<AuthorRef>> {
        let user = self.user(username).await?;
        self.follow_repo.following(user.id, page).await
    }

    /// Follower and following counts.
    pub async fn stats(&self, username: &str) -> AppResult<FollowStats> {
        let user = self.user(username).await?;
        self.follow_repo.stats(user.id).await
    }

    async fn user(&self, username: &str) -> AppResult<User> {
        self.user_repo
            .find_by_username(username)
            .await?
            .ok_or_else(|| AppError::not_found("User not found"))
    }
}
