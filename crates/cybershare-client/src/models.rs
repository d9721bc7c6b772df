//! Wire types as the server sends them.
//!
//! Field names follow the server's camelCase JSON. Enumerations the client
//! only displays (roles, statuses, notification types) are kept as strings.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

pub use cybershare_core::types::PageResponse;

/// Tokens and identity returned by register, login and refresh.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AuthPayload {
    pub access_token: String,
    pub refresh_token: String,
    pub user_id: Uuid,
    pub username: String,
    pub email: String,
    pub display_name: String,
    pub role: String,
}

/// The signed-in user as kept in the session file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionUser {
    pub id: Uuid,
    pub username: String,
    pub email: String,
    pub display_name: String,
    pub role: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub avatar_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bio: Option<String>,
}

impl From<&AuthPayload> for SessionUser {
    fn from(auth: &AuthPayload) -> Self {
        Self {
            id: auth.user_id,
            username: auth.username.clone(),
            email: auth.email.clone(),
            display_name: auth.display_name.clone(),
            role: auth.role.clone(),
            avatar_url: None,
            bio: None,
        }
    }
}

/// A profile with its social counters.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Profile {
    pub id: Uuid,
    pub username: String,
    pub email: String,
    pub display_name: Option<String>,
    pub bio: Option<String>,
    pub avatar_url: Option<String>,
    pub role: String,
    pub followers_count: i64,
    pub following_count: i64,
    pub posts_count: i64,
}

impl From<&Profile> for SessionUserPatch {
    fn from(profile: &Profile) -> Self {
        Self {
            display_name: profile.display_name.clone(),
            email: Some(profile.email.clone()),
            avatar_url: profile.avatar_url.clone(),
            bio: profile.bio.clone(),
        }
    }
}

/// The account fields returned after a profile edit.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Account {
    pub id: Uuid,
    pub username: String,
    pub email: String,
    pub display_name: Option<String>,
    pub bio: Option<String>,
    pub avatar_url: Option<String>,
    pub role: String,
}

impl From<&Account> for SessionUserPatch {
    fn from(account: &Account) -> Self {
        Self {
            display_name: account.display_name.clone(),
            email: Some(account.email.clone()),
            avatar_url: account.avatar_url.clone(),
            bio: account.bio.clone(),
        }
    }
}

/// Body for `PATCH /api/users/me`; `None` fields are left alone.
#[derive(Debug, Clone, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProfileChanges {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub display_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bio: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub about: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub avatar_url: Option<String>,
}

/// Partial update merged into [`SessionUser`].
#[derive(Debug, Clone, Default)]
pub struct SessionUserPatch {
    pub display_name: Option<String>,
    pub email: Option<String>,
    pub avatar_url: Option<String>,
    pub bio: Option<String>,
}

/// Registration body. `username` is derived by the server when absent.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RegisterRequest {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub username: Option<String>,
    pub email: String,
    pub password: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub display_name: Option<String>,
}

/// Public author fields embedded in posts and comments.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Author {
    pub id: Uuid,
    pub username: String,
    pub display_name: Option<String>,
    pub avatar_url: Option<String>,
}

/// Tag reference on a post.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TagRef {
    pub id: Uuid,
    pub name: String,
    pub slug: String,
}

/// A post with author, category and tags.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Post {
    pub id: Uuid,
    pub title: String,
    pub slug: String,
    pub summary: Option<String>,
    pub content: String,
    pub cover_image_url: Option<String>,
    pub status: String,
    pub views: i64,
    pub likes_count: i64,
    pub comments_count: i64,
    pub bookmarks_count: i64,
    pub published_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub author: Author,
    #[serde(default)]
    pub tags: Vec<TagRef>,
}

/// Body for creating a post.
#[derive(Debug, Clone, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NewPost {
    pub title: String,
    pub content: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub summary: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub category_id: Option<Uuid>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub tags: Vec<String>,
}

/// Body for `PATCH /api/posts/{id}`; `None` fields are left alone.
#[derive(Debug, Clone, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PostChanges {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub content: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub summary: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub category_id: Option<Uuid>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cover_image_url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tags: Option<Vec<String>>,
}

/// A comment, possibly with nested replies.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Comment {
    pub id: Uuid,
    pub post_id: Uuid,
    pub parent_id: Option<Uuid>,
    pub author: Author,
    pub content: String,
    pub created_at: DateTime<Utc>,
    #[serde(default)]
    pub children: Vec<Comment>,
}

/// The caller's like/bookmark flags plus the post's counters.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InteractionStatus {
    pub liked: bool,
    pub bookmarked: bool,
    pub likes_count: i64,
    pub bookmarks_count: i64,
    pub comments_count: i64,
}

/// Follower and following counts.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FollowStats {
    pub followers: i64,
    pub following: i64,
}

/// A notification as listed for its recipient.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Notification {
    pub id: Uuid,
    #[serde(rename = "type")]
    pub kind: String,
    pub entity_id: Option<Uuid>,
    pub message: String,
    pub is_read: bool,
    pub created_at: DateTime<Utc>,
    pub actor_username: Option<String>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct FollowCheck {
    #[serde(rename = "isFollowing")]
    pub is_following: bool,
}

#[derive(Debug, Deserialize)]
pub(crate) struct Count {
    pub count: i64,
}

#[derive(Debug, Deserialize)]
pub(crate) struct Affected {
    pub affected: u64,
}

#[derive(Debug, Deserialize)]
pub(crate) struct Views {
    pub views: i64,
}
