//! Notification kind enumeration.

use serde::{Deserialize, Serialize};
use std::fmt;

/// What triggered a notification.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "notification_kind", rename_all = "snake_case")]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum NotificationKind {
    /// Someone liked the recipient's post.
    Like,
    /// Someone commented on the recipient's post.
    Comment,
    /// Someone replied to the recipient's comment.
    Reply,
    /// Someone followed the recipient.
    Follow,
    /// An administrator changed the recipient's role.
    RoleChange,
    /// An administrator changed the status of the recipient's post.
    PostStatus,
    /// Any other system message.
    System,
}

impl NotificationKind {
    /// Return the kind in its wire form.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Like => "LIKE",
            Self::Comment => "COMMENT",
            Self::Reply => "REPLY",
            Self::Follow => "FOLLOW",
            Self::RoleChange => "ROLE_CHANGE",
            Self::PostStatus => "POST_STATUS",
            Self::System => "SYSTEM",
        }
    }
}

impl fmt::Display for NotificationKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
