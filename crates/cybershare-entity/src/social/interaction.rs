//! Like, bookmark and view records.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

/// A user liked a post.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Like {
    pub user_id: Uuid,
    pub post_id: Uuid,
    pub created_at: DateTime<Utc>,
}

/// A user bookmarked a post.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Bookmark {
    pub user_id: Uuid,
    pub post_id: Uuid,
    pub created_at: DateTime<Utc>,
}

/// A deduplicated post view, keyed by user when signed in, otherwise by IP.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct PostView {
    pub id: Uuid,
    pub post_id: Uuid,
    pub user_id: Option<Uuid>,
    pub ip_address: Option<String>,
    pub viewed_at: DateTime<Utc>,
}

/// The caller's relationship to a post plus its current counters.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InteractionStatus {
    pub liked: bool,
    pub bookmarked: bool,
    pub likes_count: i64,
    pub bookmarks_count: i64,
    pub comments_count: i64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_wire_names() {
        let status = InteractionStatus {
            liked: true,
            likes_count: 4,
            ..Default::default()
        };
        let json = serde_json::to_value(status).expect("serialize");
        assert_eq!(json["liked"], true);
        assert_eq!(json["likesCount"], 4);
        assert_eq!(json["bookmarksCount"], 0);
    }
}
