//! Post read model returned by the API.

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use cybershare_core::types::PageResponse;
use cybershare_entity::post::{PostRecord, PostStatus, PostTagRow};
use cybershare_entity::taxonomy::TagRef;
use cybershare_entity::user::AuthorRef;

/// Category columns embedded in a post.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CategoryRef {
    pub id: Uuid,
    pub name: String,
    pub slug: String,
}

/// A post with its author, category and tags.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PostDetail {
    pub id: Uuid,
    pub title: String,
    pub slug: String,
    pub summary: Option<String>,
    pub content: String,
    pub cover_image_url: Option<String>,
    pub status: PostStatus,
    pub views: i64,
    pub likes_count: i64,
    pub comments_count: i64,
    pub bookmarks_count: i64,
    pub published_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub author: AuthorRef,
    pub category: Option<CategoryRef>,
    pub tags: Vec<TagRef>,
}

impl PostDetail {
    /// Build from a joined row and its tags.
    pub fn from_record(record: PostRecord, tags: Vec<TagRef>) -> Self {
        let PostRecord {
            post,
            author_username,
            author_display_name,
            author_avatar_url,
            category_name,
            category_slug,
        } = record;

        let category = match (post.category_id, category_name, category_slug) {
            (Some(id), Some(name), Some(slug)) => Some(CategoryRef { id, name, slug }),
            _ => None,
        };

        Self {
            author: AuthorRef {
                id: post.author_id,
                username: author_username,
                display_name: author_display_name,
                avatar_url: author_avatar_url,
            },
            category,
            tags,
            id: post.id,
            title: post.title,
            slug: post.slug,
            summary: post.summary,
            content: post.content,
            cover_image_url: post.cover_image_url,
            status: post.status,
            views: post.views,
            likes_count: post.likes_count,
            comments_count: post.comments_count,
            bookmarks_count: post.bookmarks_count,
            published_at: post.published_at,
            created_at: post.created_at,
            updated_at: post.updated_at,
        }
    }
}

/// Attach batch-loaded tag rows to their posts, preserving post order.
pub fn assemble(records: Vec<PostRecord>, tag_rows: Vec<PostTagRow>) -> Vec<PostDetail> {
    let mut by_post: HashMap<Uuid, Vec<TagRef>> = HashMap::new();
    for row in tag_rows {
        by_post.entry(row.post_id).or_default().push(TagRef {
            id: row.tag_id,
            name: row.name,
            slug: row.slug,
        });
    }

    records
        .into_iter()
        .map(|record| {
            let tags = by_post.remove(&record.post.id).unwrap_or_default();
            PostDetail::from_record(record, tags)
        })
        .collect()
}

/// Post ids of a page, used to batch-load tags.
pub fn page_ids(page: &PageResponse<PostRecord>) -> Vec<Uuid> {
    page.items.iter().map(|r| r.post.id).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use cybershare_entity::post::Post;

    fn record(category: bool) -> PostRecord {
        let now = Utc::now();
        PostRecord {
            post: Post {
                id: Uuid::new_v4(),
                author_id: Uuid::new_v4(),
                category_id: category.then(Uuid::new_v4),
                title: "Title".into(),
                slug: "title".into(),
                summary: None,
                content: "body".into(),
                cover_image_url: None,
                status: PostStatus::Published,
                views: 0,
                likes_count: 0,
                comments_count: 0,
                bookmarks_count: 0,
                published_at: Some(now),
                created_at: now,
                updated_at: now,
            },
            author_username: "ana".into(),
            author_display_name: Some("Ana".into()),
            author_avatar_url: None,
            category_name: category.then(|| "Rust".to_string()),
            category_slug: category.then(|| "rust".to_string()),
        }
    }

    #[test]
    fn test_assemble_groups_tags_per_post() {
        let a = record(true);
        let b = record(false);
        let rows = vec![
            PostTagRow { post_id: a.post.id, tag_id: Uuid::new_v4(), name: "async".into(), slug: "async".into() },
            PostTagRow { post_id: a.post.id, tag_id: Uuid::new_v4(), name: "tokio".into(), slug: "tokio".into() },
        ];
        let (a_id, b_id) = (a.post.id, b.post.id);

        let details = assemble(vec![a, b], rows);
        assert_eq!(details[0].id, a_id);
        assert_eq!(details[0].tags.len(), 2);
        assert_eq!(details[0].category.as_ref().map(|c| c.slug.as_str()), Some("rust"));
        assert_eq!(details[1].id, b_id);
        assert!(details[1].tags.is_empty());
        assert!(details[1].category.is_none());
    }

    #[test]
    fn test_serializes_nested_author() {
        let detail = PostDetail::from_record(record(false), Vec::new());
        let json = serde_json::to_value(&detail).unwrap();
        assert_eq!(json["author"]["username"], "ana");
        assert_eq!(json["likesCount"], 0);
    }
}
