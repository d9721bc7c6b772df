//! Category entity.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

/// A post category.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Category {
    /// Unique category identifier.
    pub id: Uuid,
    /// Unique display name.
    pub name: String,
    /// Unique URL slug.
    pub slug: String,
    /// Description.
    pub description: Option<String>,
    /// Cover image URL.
    pub cover_image_url: Option<String>,
    /// Creation time.
    pub created_at: DateTime<Utc>,
}

/// A category with its number of published posts.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct CategoryWithCount {
    #[sqlx(flatten)]
    #[serde(flatten)]
    pub category: Category,
    pub post_count: i64,
}
