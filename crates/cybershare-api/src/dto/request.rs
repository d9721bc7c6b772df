//! Request DTOs with validation.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::{Validate, ValidationError};

use cybershare_database::repositories::{PostFilter, UserFilter};
use cybershare_entity::post::PostStatus;
use cybershare_entity::user::{UserRole, UserStatus};
use cybershare_service::auth::{LoginInput, RegisterInput};
use cybershare_service::post::{CreatePostInput, UpdatePostInput};
use cybershare_service::taxonomy::{CategoryInput, TagInput};
use cybershare_service::user::ProfileUpdate;

/// Rejects strings that are empty once surrounding whitespace is trimmed.
fn not_blank(value: &str) -> Result<(), ValidationError> {
    if value.trim().is_empty() {
        Err(ValidationError::new("blank"))
    } else {
        Ok(())
    }
}

// ── Auth ─────────────────────────────────────────────────────────

/// Registration request body.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct RegisterRequest {
    /// Optional handle; derived from the email when absent.
    #[validate(length(min = 3, max = 50, message = "Username must be 3-50 characters"))]
    pub username: Option<String>,
    #[validate(email(message = "Email is invalid"))]
    pub email: String,
    #[validate(length(min = 1, message = "Password is required"))]
    pub password: String,
    #[validate(length(max = 100, message = "Display name is too long"))]
    pub display_name: Option<String>,
}

impl From<RegisterRequest> for RegisterInput {
    fn from(req: RegisterRequest) -> Self {
        Self {
            username: req.username,
            email: req.email,
            password: req.password,
            display_name: req.display_name,
        }
    }
}

/// Login request body.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct LoginRequest {
    #[validate(length(min = 1, message = "Email is required"))]
    pub email: String,
    #[validate(length(min = 1, message = "Password is required"))]
    pub password: String,
}

impl From<LoginRequest> for LoginInput {
    fn from(req: LoginRequest) -> Self {
        Self {
            email: req.email,
            password: req.password,
        }
    }
}

/// Token refresh request body.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct RefreshRequest {
    #[validate(length(min = 1, message = "Refresh token is required"))]
    pub refresh_token: String,
}

// ── Password ─────────────────────────────────────────────────────

/// Password change request.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct ChangePasswordRequest {
    #[validate(length(min = 1, message = "Current password is required"))]
    pub current_password: String,
    #[validate(length(min = 1, message = "New password is required"))]
    pub new_password: String,
}

/// Forgot-password request.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct ForgotPasswordRequest {
    #[validate(email(message = "Email is invalid"))]
    pub email: String,
}

/// Reset-password request.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct ResetPasswordRequest {
    #[validate(length(min = 1, message = "Token is required"))]
    pub token: String,
    #[validate(length(min = 1, message = "New password is required"))]
    pub new_password: String,
}

/// `?token=` query parameter.
#[derive(Debug, Clone, Deserialize)]
pub struct TokenQuery {
    pub token: String,
}

// ── Posts ────────────────────────────────────────────────────────

/// Create post request.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CreatePostRequest {
    #[validate(
        length(min = 1, max = 200, message = "Title must be 1-200 characters"),
        custom(function = "not_blank", message = "Title cannot be blank")
    )]
    pub title: String,
    #[validate(custom(function = "not_blank", message = "Content is required"))]
    pub content: String,
    #[validate(length(max = 500, message = "Summary is too long"))]
    pub summary: Option<String>,
    pub category_id: Option<Uuid>,
    #[validate(url(message = "Cover image must be a URL"))]
    pub cover_image_url: Option<String>,
    pub status: Option<PostStatus>,
    #[serde(default)]
    pub tags: Vec<String>,
}

impl From<CreatePostRequest> for CreatePostInput {
    fn from(req: CreatePostRequest) -> Self {
        Self {
            title: req.title,
            content: req.content,
            summary: req.summary,
            category_id: req.category_id,
            cover_image_url: req.cover_image_url,
            status: req.status,
            tags: req.tags,
        }
    }
}

/// Partial post update.
#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct UpdatePostRequest {
    #[validate(
        length(min = 1, max = 200, message = "Title must be 1-200 characters"),
        custom(function = "not_blank", message = "Title cannot be blank")
    )]
    pub title: Option<String>,
    #[validate(custom(function = "not_blank", message = "Content cannot be empty"))]
    pub content: Option<String>,
    #[validate(length(max = 500, message = "Summary is too long"))]
    pub summary: Option<String>,
    pub category_id: Option<Uuid>,
    #[validate(url(message = "Cover image must be a URL"))]
    pub cover_image_url: Option<String>,
    pub status: Option<PostStatus>,
    pub tags: Option<Vec<String>>,
}

impl From<UpdatePostRequest> for UpdatePostInput {
    fn from(req: UpdatePostRequest) -> Self {
        Self {
            title: req.title,
            content: req.content,
            summary: req.summary,
            category_id: req.category_id,
            cover_image_url: req.cover_image_url,
            status: req.status,
            tags: req.tags,
        }
    }
}

/// Filters for the public post listing.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PostListQuery {
    /// Author username.
    pub author: Option<String>,
    pub category_id: Option<Uuid>,
    pub tag_id: Option<Uuid>,
    pub tag_slug: Option<String>,
}

impl PostListQuery {
    /// Split into the author handle and the repository filter.
    pub fn into_parts(self) -> (Option<String>, PostFilter) {
        let filter = PostFilter {
            author_id: None,
            category_id: self.category_id,
            tag_id: self.tag_id,
            tag_slug: self.tag_slug.filter(|s| !s.is_empty()),
        };
        (self.author, filter)
    }
}

/// `?q=` search query.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct SearchQuery {
    #[serde(default, alias = "query")]
    pub q: Option<String>,
}

/// `?since=` for trending posts.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct TrendingQuery {
    pub since: Option<DateTime<Utc>>,
}

/// `?limit=` for top-N endpoints.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct LimitQuery {
    #[serde(default, alias = "size")]
    pub limit: Option<i64>,
}

impl LimitQuery {
    /// The requested limit, clamped to 1..=50.
    pub fn clamped(&self, default: i64) -> i64 {
        self.limit.unwrap_or(default).clamp(1, 50)
    }
}

/// `?status=` filter for post listings.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct PostStatusQuery {
    pub status: Option<PostStatus>,
}

// ── Comments ─────────────────────────────────────────────────────

/// New comment or reply.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CreateCommentRequest {
    #[validate(
        length(min = 1, max = 5000, message = "Comment must be 1-5000 characters"),
        custom(function = "not_blank", message = "Comment cannot be blank")
    )]
    pub content: String,
    pub parent_id: Option<Uuid>,
}

/// Comment edit.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct UpdateCommentRequest {
    #[validate(
        length(min = 1, max = 5000, message = "Comment must be 1-5000 characters"),
        custom(function = "not_blank", message = "Comment cannot be blank")
    )]
    pub content: String,
}

// ── Users ────────────────────────────────────────────────────────

/// Profile update; omitted fields stay unchanged.
#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct UpdateProfileRequest {
    #[validate(length(max = 100, message = "Display name is too long"))]
    pub display_name: Option<String>,
    #[validate(length(max = 500, message = "Bio is too long"))]
    pub bio: Option<String>,
    pub about: Option<String>,
    #[validate(url(message = "Avatar must be a URL"))]
    pub avatar_url: Option<String>,
}

impl From<UpdateProfileRequest> for ProfileUpdate {
    fn from(req: UpdateProfileRequest) -> Self {
        Self {
            display_name: req.display_name,
            bio: req.bio,
            about: req.about,
            avatar_url: req.avatar_url,
        }
    }
}

// ── Taxonomy ─────────────────────────────────────────────────────

/// Create or update a category.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CategoryRequest {
    #[validate(length(min = 1, max = 100, message = "Name must be 1-100 characters"))]
    pub name: String,
    pub description: Option<String>,
    #[validate(url(message = "Cover image must be a URL"))]
    pub cover_image_url: Option<String>,
}

impl From<CategoryRequest> for CategoryInput {
    fn from(req: CategoryRequest) -> Self {
        Self {
            name: req.name,
            description: req.description,
            cover_image_url: req.cover_image_url,
        }
    }
}

/// Create or update a tag.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct TagRequest {
    #[validate(length(min = 1, max = 50, message = "Name must be 1-50 characters"))]
    pub name: String,
    pub description: Option<String>,
}

impl From<TagRequest> for TagInput {
    fn from(req: TagRequest) -> Self {
        Self {
            name: req.name,
            description: req.description,
        }
    }
}

// ── Admin ────────────────────────────────────────────────────────

/// Filters for the admin user listing.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct AdminUserQuery {
    pub search: Option<String>,
    pub status: Option<UserStatus>,
    pub role: Option<UserRole>,
}

impl From<AdminUserQuery> for UserFilter {
    fn from(query: AdminUserQuery) -> Self {
        Self {
            search: query.search.filter(|s| !s.trim().is_empty()),
            status: query.status,
            role: query.role,
        }
    }
}

/// Ban or reactivate a user.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct UpdateUserStatusRequest {
    pub status: UserStatus,
}

/// Change a user's role.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct UpdateUserRoleRequest {
    pub role: UserRole,
}

/// Optional reason attached to a rejection.
#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate)]
pub struct RejectPostRequest {
    #[validate(length(max = 1000, message = "Reason is too long"))]
    pub reason: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_register_rejects_bad_email_and_short_username() {
        let req = RegisterRequest {
            username: Some("ab".into()),
            email: "not-an-email".into(),
            password: "Secret123!".into(),
            display_name: None,
        };
        let errors = req.validate().unwrap_err();
        let fields = errors.field_errors();
        assert!(fields.contains_key("username"));
        assert!(fields.contains_key("email"));
    }

    #[test]
    fn test_whitespace_only_text_is_rejected() {
        let post: CreatePostRequest = serde_json::from_value(serde_json::json!({
            "title": "   ",
            "content": "\n\t "
        }))
        .unwrap();
        let errors = post.validate().unwrap_err();
        let fields = errors.field_errors();
        assert!(fields.contains_key("title"));
        assert!(fields.contains_key("content"));

        let edit = UpdatePostRequest {
            title: Some(" ".into()),
            ..Default::default()
        };
        assert!(edit.validate().is_err());
        assert!(UpdatePostRequest::default().validate().is_ok());

        let comment = CreateCommentRequest {
            content: "   ".into(),
            parent_id: None,
        };
        assert!(comment.validate().is_err());
        let edit = UpdateCommentRequest {
            content: "\t".into(),
        };
        assert!(edit.validate().is_err());
    }

    #[test]
    fn test_register_allows_missing_username() {
        let req: RegisterRequest = serde_json::from_value(serde_json::json!({
            "email": "ann@example.com",
            "password": "Secret123!"
        }))
        .unwrap();
        assert!(req.validate().is_ok());
    }

    #[test]
    fn test_create_post_defaults_tags() {
        let req: CreatePostRequest = serde_json::from_value(serde_json::json!({
            "title": "Hello",
            "content": "Body",
            "status": "PENDING_REVIEW"
        }))
        .unwrap();
        assert!(req.tags.is_empty());
        assert_eq!(req.status, Some(PostStatus::PendingReview));
    }

    #[test]
    fn test_post_list_query_drops_empty_tag_slug() {
        let query = PostListQuery {
            author: Some("ann".into()),
            tag_slug: Some(String::new()),
            ..Default::default()
        };
        let (author, filter) = query.into_parts();
        assert_eq!(author.as_deref(), Some("ann"));
        assert!(filter.tag_slug.is_none());
    }

    #[test]
    fn test_limit_query_clamps() {
        assert_eq!(LimitQuery { limit: Some(500) }.clamped(5), 50);
        assert_eq!(LimitQuery { limit: Some(0) }.clamped(5), 1);
        assert_eq!(LimitQuery { limit: None }.clamped(5), 5);
    }
}
