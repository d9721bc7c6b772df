//! Notification entity model.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

use super::kind::NotificationKind;

/// A notification addressed to a user.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Notification {
    /// Unique notification identifier.
    pub id: Uuid,
    /// The recipient user.
    pub recipient_id: Uuid,
    /// The user who triggered it, if any.
    pub actor_id: Option<Uuid>,
    /// What happened.
    pub kind: NotificationKind,
    /// Related post, comment or user.
    pub entity_id: Option<Uuid>,
    /// Human-readable message.
    pub message: String,
    /// Whether the recipient has read it.
    pub is_read: bool,
    /// Creation time.
    pub created_at: DateTime<Utc>,
}

/// A notification joined with the actor's public columns.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct NotificationRecord {
    pub id: Uuid,
    #[serde(rename = "type")]
    pub kind: NotificationKind,
    pub entity_id: Option<Uuid>,
    pub message: String,
    pub is_read: bool,
    pub created_at: DateTime<Utc>,
    pub actor_id: Option<Uuid>,
    pub actor_name: Option<String>,
    pub actor_username: Option<String>,
    pub actor_avatar_url: Option<String>,
}

/// Data required to insert a notification.
#[derive(Debug, Clone)]
pub struct NewNotification {
    pub recipient_id: Uuid,
    pub actor_id: Option<Uuid>,
    pub kind: NotificationKind,
    pub entity_id: Option<Uuid>,
    pub message: String,
}

impl NewNotification {
    /// Whether the recipient would be notified about their own action.
    pub fn is_self_notification(&self) -> bool {
        self.actor_id == Some(self.recipient_id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_self_notification_detection() {
        let me = Uuid::new_v4();
        let mut n = NewNotification {
            recipient_id: me,
            actor_id: Some(me),
            kind: NotificationKind::Like,
            entity_id: None,
            message: "liked".into(),
        };
        assert!(n.is_self_notification());
        n.actor_id = None;
        assert!(!n.is_self_notification());
    }

    #[test]
    fn test_record_serializes_kind_as_type() {
        let record = NotificationRecord {
            id: Uuid::new_v4(),
            kind: NotificationKind::RoleChange,
            entity_id: None,
            message: "You are now an author".into(),
            is_read: false,
            created_at: Utc::now(),
            actor_id: None,
            actor_name: None,
            actor_username: None,
            actor_avatar_url: None,
        };
        let json = serde_json::to_value(&record).expect("serialize");
        assert_eq!(json["type"], "ROLE_CHANGE");
        assert_eq!(json["isRead"], false);
    }
}
