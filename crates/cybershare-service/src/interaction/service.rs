//! Like and bookmark toggles.

use std::sync::Arc;

use tracing::info;
use uuid::Uuid;

use cybershare_core::AppError;
use cybershare_core::result::AppResult;
use cybershare_database::repositories::{InteractionRepository, PostRepository};
use cybershare_entity::notification::NotificationKind;
use cybershare_entity::social::InteractionStatus;

use crate::context::RequestContext;
use crate::notification::{NotificationService, message};

/// Handles like/bookmark use cases.
#[derive(Debug, Clone)]
pub struct InteractionService {
    interaction_repo: Arc<InteractionRepository>,
    post_repo: Arc<PostRepository>,
    notifications: Arc<NotificationService>,
}

impl InteractionService {
    /// Creates a new interaction service.
    pub fn new(
        interaction_repo: Arc<InteractionRepository>,
        post_repo: Arc<PostRepository>,
        notifications: Arc<NotificationService>,
    ) -> Self {
        Self {
            interaction_repo,
            post_repo,
            notifications,
        }
    }

    /// Like the post, or unlike it when already liked.
    pub async fn toggle_like(&self, ctx: &RequestContext, post_id: Uuid) -> AppResult<InteractionStatus> {
        let post = self
            .post_repo
            .find_by_id(post_id)
            .await?
            .ok_or_else(|| AppError::not_found("Post not found"))?;

        let outcome = self
            .interaction_repo
            .toggle_like(ctx.user_id, post_id)
            .await?;

        if outcome.active {
            self.notifications
                .notify(
                    post.author_id,
                    Some(ctx.user_id),
                    NotificationKind::Like,
                    Some(post.id),
                    message::liked_post(&ctx.username, &post.title),
                )
                .await;
        }

        info!(post_id = %post_id, user_id = %ctx.user_id, liked = outcome.active, "Like toggled");
        Ok(outcome.status)
    }

    /// Bookmark the post, or remove the bookmark.
    pub async fn toggle_bookmark(
        &self,
        ctx: &RequestContext,
        post_id: Uuid,
    ) -> AppResult<InteractionStatus> {
        let outcome = self
            .interaction_repo
            .toggle_bookmark(ctx.user_id, post_id)
            .await?;
        info!(post_id = %post_id, user_id = %ctx.user_id, bookmarked = outcome.active, "Bookmark toggled");
        Ok(outcome.status)
    }

    /// Counters plus the caller's flags. Anonymous callers get `false` flags.
    pub async fn status(
        &self,
        viewer: Option<&RequestContext>,
        post_id: Uuid,
    ) -> AppResult<InteractionStatus> {
        self.interaction_repo
            .status(viewer.map(|ctx| ctx.user_id), post_id)
            .await
    }
}
