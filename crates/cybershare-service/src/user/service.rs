//! User self-service and public profile lookups.

use std::sync::Arc;

use tracing::info;

use cybershare_core::AppError;
use cybershare_core::result::AppResult;
use cybershare_core::types::{PageRequest, PageResponse};
use cybershare_database::repositories::UserRepository;
use cybershare_entity::user::{User, UserProfile};

use crate::context::RequestContext;

/// Profile fields a user may change. `None` leaves a field untouched.
#[derive(Debug, Clone, Default)]
pub struct ProfileUpdate {
    pub display_name: Option<String>,
    pub bio: Option<String>,
    pub about: Option<String>,
    pub avatar_url: Option<String>,
}

/// Handles user self-service operations.
#[derive(Debug, Clone)]
pub struct UserService {
    user_repo: Arc<UserRepository>,
}

impl UserService {
    /// Creates a new user service.
    pub fn new(user_repo: Arc<UserRepository>) -> Self {
        Self { user_repo }
    }

    /// The caller's profile with social counters.
    pub async fn me(&self, ctx: &RequestContext) -> AppResult<UserProfile> {
        self.user_repo
            .find_profile_by_id(ctx.user_id)
            .await?
            .ok_or_else(|| AppError::not_found("User not found"))
    }

    /// Updates the caller's profile fields.
    pub async fn update_me(&self, ctx: &RequestContext, update: ProfileUpdate) -> AppResult<User> {
        let display_name = match update.display_name.as_deref().map(str::trim) {
            Some("") => return Err(AppError::validation("Display name cannot be empty")),
            other => other,
        };

        let user = self
            .user_repo
            .update_profile(
                ctx.user_id,
                display_name,
                update.bio.as_deref(),
                update.about.as_deref(),
                update.avatar_url.as_deref(),
            )
            .await?;

        info!(user_id = %ctx.user_id, "Profile updated");
        Ok(user)
    }

    /// Point the caller's avatar at an uploaded image.
    pub async fn set_avatar(&self, ctx: &RequestContext, avatar_url: &str) -> AppResult<User> {
        let user = self
            .user_repo
            .update_profile(ctx.user_id, None, None, None, Some(avatar_url))
            .await?;
        info!(user_id = %ctx.user_id, "Avatar updated");
        Ok(user)
    }

    /// Public profile by username.
    pub async fn get_by_username(&self, username: &str) -> AppResult<UserProfile> {
        self.user_repo
            .find_profile_by_username(username)
            .await?
            .ok_or_else(|| AppError::not_found("User not found"))
    }

    /// Active users ranked by follower count.
    pub async fn top_authors(&self, limit: i64) -> AppResult<Vec<UserProfile>> {
        self.user_repo.top_authors(limit.clamp(1, 50)).await
    }

    /// Users whose username or display name contains `query`.
    pub async fn search(&self, query: &str, page: &PageRequest) -> AppResult<PageResponse<User>> {
        let query = query.trim();
        if query.is_empty() {
            return Ok(PageResponse::empty(page));
        }
        self.user_repo.search(query, page).await
    }
}
