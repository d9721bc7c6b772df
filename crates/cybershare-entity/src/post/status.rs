//! Post lifecycle status.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Publication status of a post.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize, sqlx::Type,
)]
#[sqlx(type_name = "post_status", rename_all = "snake_case")]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PostStatus {
    /// Work in progress, visible to the author only.
    #[default]
    Draft,
    /// Submitted and waiting for moderation.
    PendingReview,
    /// Publicly visible.
    Published,
    /// Removed from public view by a moderator.
    Hidden,
}

impl PostStatus {
    /// Whether the post is visible to everyone.
    pub fn is_public(&self) -> bool {
        matches!(self, Self::Published)
    }

    /// Return the status in its wire form.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Draft => "DRAFT",
            Self::PendingReview => "PENDING_REVIEW",
            Self::Published => "PUBLISHED",
            Self::Hidden => "HIDDEN",
        }
    }
}

impl fmt::Display for PostStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for PostStatus {
    type Err = cybershare_core::AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_uppercase().as_str() {
            "DRAFT" => Ok(Self::Draft),
            "PENDING_REVIEW" => Ok(Self::PendingReview),
            "PUBLISHED" => Ok(Self::Published),
            "HIDDEN" => Ok(Self::Hidden),
            _ => Err(cybershare_core::AppError::validation(format!(
                "Invalid post status: '{s}'"
            ))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_wire_format_round_trips_through_from_str() {
        for status in [
            PostStatus::Draft,
            PostStatus::PendingReview,
            PostStatus::Published,
            PostStatus::Hidden,
        ] {
            let json = serde_json::to_value(status).expect("serialize");
            assert_eq!(json.as_str(), Some(status.as_str()));
            assert_eq!(status.as_str().parse::<PostStatus>().ok(), Some(status));
        }
    }

    #[test]
    fn test_only_published_is_public() {
        assert!(PostStatus::Published.is_public());
        assert!(!PostStatus::PendingReview.is_public());
        assert_eq!(PostStatus::default(), PostStatus::Draft);
    }
}
