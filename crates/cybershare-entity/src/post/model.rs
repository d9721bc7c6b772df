//! Post entity models.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

use super::status::PostStatus;

/// A blog post row.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Post {
    /// Unique post identifier.
    pub id: Uuid,
    /// The writing user.
    pub author_id: Uuid,
    /// Optional category.
    pub category_id: Option<Uuid>,
    /// Title.
    pub title: String,
    /// URL slug, unique across posts.
    pub slug: String,
    /// Short teaser.
    pub summary: Option<String>,
    /// Markdown body.
    pub content: String,
    /// Cover image URL.
    pub cover_image_url: Option<String>,
    /// Lifecycle status.
    pub status: PostStatus,
    /// Deduplicated view count.
    pub views: i64,
    /// Denormalized like counter.
    pub likes_count: i64,
    /// Denormalized comment counter.
    pub comments_count: i64,
    /// Denormalized bookmark counter.
    pub bookmarks_count: i64,
    /// First publication time.
    pub published_at: Option<DateTime<Utc>>,
    /// Creation time.
    pub created_at: DateTime<Utc>,
    /// Last update time.
    pub updated_at: DateTime<Utc>,
}

impl Post {
    /// Whether `user_id` wrote this post.
    pub fn is_authored_by(&self, user_id: Uuid) -> bool {
        self.author_id == user_id
    }

    /// Trending score used for ranking.
    pub fn trending_score(&self) -> i64 {
        self.views + self.likes_count * 3 + self.comments_count * 5
    }
}

/// A post joined with its author and category columns.
#[derive(Debug, Clone, FromRow)]
pub struct PostRecord {
    #[sqlx(flatten)]
    pub post: Post,
    pub author_username: String,
    pub author_display_name: Option<String>,
    pub author_avatar_url: Option<String>,
    pub category_name: Option<String>,
    pub category_slug: Option<String>,
}

/// A tag attached to a post, loaded in batches for a page of posts.
#[derive(Debug, Clone, FromRow)]
pub struct PostTagRow {
    pub post_id: Uuid,
    pub tag_id: Uuid,
    pub name: String,
    pub slug: String,
}

/// Data required to insert a post.
#[derive(Debug, Clone)]
pub struct CreatePost {
    pub author_id: Uuid,
    pub category_id: Option<Uuid>,
    pub title: String,
    pub slug: String,
    pub summary: Option<String>,
    pub content: String,
    pub cover_image_url: Option<String>,
    pub status: PostStatus,
}

/// Full replacement values for a post update. The service resolves
/// partial input against the current row before building this.
#[derive(Debug, Clone)]
pub struct UpdatePost {
    pub category_id: Option<Uuid>,
    pub title: String,
    pub slug: String,
    pub summary: Option<String>,
    pub content: String,
    pub cover_image_url: Option<String>,
    pub status: PostStatus,
    pub published_at: Option<DateTime<Utc>>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> Post {
        let now = Utc::now();
        Post {
            id: Uuid::new_v4(),
            author_id: Uuid::new_v4(),
            category_id: None,
            title: "Hello".into(),
            slug: "hello".into(),
            summary: None,
            content: "body".into(),
            cover_image_url: None,
            status: PostStatus::Published,
            views: 10,
            likes_count: 2,
            comments_count: 1,
            bookmarks_count: 0,
            published_at: Some(now),
            created_at: now,
            updated_at: now,
        }
    }

    #[test]
    fn test_trending_score_weights() {
        assert_eq!(sample().trending_score(), 10 + 6 + 5);
    }

    #[test]
    fn test_serializes_camel_case_counters() {
        let json = serde_json::to_value(sample()).expect("serialize");
        assert_eq!(json["likesCount"], 2);
        assert_eq!(json["status"], "PUBLISHED");
    }
}
