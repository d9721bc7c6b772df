//! Notification repository implementation.

use sqlx::PgPool;
use uuid::Uuid;

use cybershare_core::result::AppResult;
use cybershare_core::types::{PageRequest, PageResponse};
use cybershare_entity::notification::{NewNotification, Notification, NotificationRecord};

use super::db_error;

const RECORD_SELECT: &str = "SELECT n.id, n.kind, n.entity_id, n.message, n.is_read, \
    n.created_at, n.actor_id, \
    COALESCE(a.display_name, a.username) AS actor_name, \
    a.username AS actor_username, a.avatar_url AS actor_avatar_url \
    FROM notifications n LEFT JOIN users a ON a.id = n.actor_id";

/// Repository for user notifications.
#[derive(Debug, Clone)]
pub struct NotificationRepository {
    pool: PgPool,
}

impl NotificationRepository {
    /// Create a new notification repository.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Insert a notification.
    pub async fn create(&self, data: &NewNotification) -> AppResult<Notification> {
        sqlx::query_as::<_, Notification>(
            "INSERT INTO notifications (recipient_id, actor_id, kind, entity_id, message) \
             VALUES ($1, $2, $3, $4, $5) RETURNING *",
        )
        .bind(data.recipient_id)
        .bind(data.actor_id)
        .bind(data.kind)
        .bind(data.entity_id)
        .bind(&data.message)
        .fetch_one(&self.pool)
        .await
        .map_err(db_error("Failed to create notification"))
    }

    /// Load a notification with its actor columns.
    pub async fn find_record_by_id(&self, id: Uuid) -> AppResult<Option<NotificationRecord>> {
        sqlx::query_as::<_, NotificationRecord>(&format!("{RECORD_SELECT} WHERE n.id = $1"))
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(db_error("Failed to find notification"))
    }

    /// Notifications for a user, newest first.
    pub async fn find_for_user(
        &self,
        recipient_id: Uuid,
        page: &PageRequest,
    ) -> AppResult<PageResponse<NotificationRecord>> {
        let total: i64 =
            sqlx::query_scalar("SELECT COUNT(*) FROM notifications WHERE recipient_id = $1")
                .bind(recipient_id)
                .fetch_one(&self.pool)
                .await
                .map_err(db_error("Failed to count notifications"))?;

        let items = sqlx::query_as::<_, NotificationRecord>(&format!(
            "{RECORD_SELECT} WHERE n.recipient_id = $1 \
             ORDER BY n.created_at DESC LIMIT $2 OFFSET $3"
        ))
        .bind(recipient_id)
        .bind(page.limit())
        .bind(page.offset())
        .fetch_all(&self.pool)
        .await
        .map_err(db_error("Failed to list notifications"))?;

        Ok(PageResponse::new(items, page, total as u64))
    }

    /// Number of unread notifications.
    pub async fn count_unread(&self, recipient_id: Uuid) -> AppResult<i64> {
        sqlx::query_scalar(
            "SELECT COUNT(*) FROM notifications WHERE recipient_id = $1 AND is_read = FALSE",
        )
        .bind(recipient_id)
        .fetch_one(&self.pool)
        .await
        .map_err(db_error("Failed to count unread notifications"))
    }

    /// Mark one notification read. Returns false when it does not belong to `recipient_id`.
    pub async fn mark_read(&self, id: Uuid, recipient_id: Uuid) -> AppResult<bool> {
        let result = sqlx::query(
            "UPDATE notifications SET is_read = TRUE WHERE id = $1 AND recipient_id = $2",
        )
        .bind(id)
        .bind(recipient_id)
        .execute(&self.pool)
        .await
        .map_err(db_error("Failed to mark notification read"))?;
        Ok(result.rows_affected() > 0)
    }

    /// Mark every unread notification read.
    pub async fn mark_all_read(&self, recipient_id: Uuid) -> AppResult<u64> {
        let result = sqlx::query(
            "UPDATE notifications SET is_read = TRUE WHERE recipient_id = $1 AND is_read = FALSE",
        )
        .bind(recipient_id)
        .execute(&self.pool)
        .await
        .map_err(db_error("Failed to mark notifications read"))?;
        Ok(result.rows_affected())
    }
}
