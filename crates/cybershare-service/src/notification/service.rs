//! Notification CRUD with live push and a cached unread count.

use std::sync::Arc;

use tracing::{debug, info, warn};
use uuid::Uuid;

use cybershare_cache::{CacheManager, keys};
use cybershare_core::result::AppResult;
use cybershare_core::traits::CacheProvider;
use cybershare_core::types::{PageRequest, PageResponse};
use cybershare_core::AppError;
use cybershare_database::repositories::NotificationRepository;
use cybershare_entity::notification::{
    NewNotification, Notification, NotificationKind, NotificationRecord,
};
use cybershare_realtime::{OutboundMessage, RealtimeHub};

use crate::context::RequestContext;

/// Manages user notifications.
#[derive(Debug, Clone)]
pub struct NotificationService {
    /// Notification repository.
    notif_repo: Arc<NotificationRepository>,
    /// Cache for unread counts.
    cache: Arc<CacheManager>,
    /// Live connection registry.
    hub: Arc<RealtimeHub>,
}

impl NotificationService {
    /// Creates a new notification service.
    pub fn new(
        notif_repo: Arc<NotificationRepository>,
        cache: Arc<CacheManager>,
        hub: Arc<RealtimeHub>,
    ) -> Self {
        Self {
            notif_repo,
            cache,
            hub,
        }
    }

    /// Store a notification and push it to the recipient's open sockets.
    ///
    /// Returns `None` when the recipient is the actor.
    pub async fn create(&self, data: NewNotification) -> AppResult<Option<Notification>> {
        if data.is_self_notification() {
            debug!(user_id = %data.recipient_id, "Skipping self notification");
            return Ok(None);
        }

        let notification = self.notif_repo.create(&data).await?;
        self.invalidate_unread(notification.recipient_id).await;

        match self.notif_repo.find_record_by_id(notification.id).await {
            Ok(Some(record)) => self.push(notification.recipient_id, &record),
            Ok(None) => {}
            Err(e) => warn!(error = %e, "Failed to load notification for push"),
        }

        info!(
            notification_id = %notification.id,
            recipient_id = %notification.recipient_id,
            kind = %notification.kind,
            "Notification created"
        );
        Ok(Some(notification))
    }

    /// Create a notification as a side effect of another action.
    /// Failures are logged and never surface to the caller.
    pub async fn notify(
        &self,
        recipient_id: Uuid,
        actor_id: Option<Uuid>,
        kind: NotificationKind,
        entity_id: Option<Uuid>,
        message: String,
    ) {
        let data = NewNotification {
            recipient_id,
            actor_id,
            kind,
            entity_id,
            message,
        };
        if let Err(e) = self.create(data).await {
            warn!(recipient_id = %recipient_id, kind = %kind, error = %e, "Failed to create notification");
        }
    }

    /// Lists notifications for the current user, newest first.
    pub async fn list(
        &self,
        ctx: &RequestContext,
        page: &PageRequest,
    ) -> AppResult<PageResponse<NotificationRecord>> {
        self.notif_repo.find_for_user(ctx.user_id, page).await
    }

    /// Gets the unread notification count.
    pub async fn unread_count(&self, ctx: &RequestContext) -> AppResult<i64> {
        let key = keys::unread_notification_count(ctx.user_id);
        match self.cache.get_json::<i64>(&key).await {
            Ok(Some(count)) => return Ok(count),
            Ok(None) => {}
            Err(e) => warn!(error = %e, "Unread count cache read failed"),
        }

        let count = self.notif_repo.count_unread(ctx.user_id).await?;
        let ttl = self.cache.ttl().unread_count();
        if let Err(e) = self.cache.set_json(&key, &count, ttl).await {
            warn!(error = %e, "Unread count cache write failed");
        }
        Ok(count)
    }

    /// Marks one of the caller's notifications as read.
    pub async fn mark_read(&self, ctx: &RequestContext, notification_id: Uuid) -> AppResult<()> {
        if !self.notif_repo.mark_read(notification_id, ctx.user_id).await? {
            return Err(AppError::not_found("Notification not found"));
        }
        self.invalidate_unread(ctx.user_id).await;
        Ok(())
    }

    /// Marks all notifications as read for the current user.
    pub async fn mark_all_read(&self, ctx: &RequestContext) -> AppResult<u64> {
        let updated = self.notif_repo.mark_all_read(ctx.user_id).await?;
        self.invalidate_unread(ctx.user_id).await;
        info!(user_id = %ctx.user_id, updated, "Notifications marked read");
        Ok(updated)
    }

    fn push(&self, recipient_id: Uuid, record: &NotificationRecord) {
        let payload = match serde_json::to_value(record) {
            Ok(payload) => payload,
            Err(e) => {
                warn!(error = %e, "Failed to serialize notification");
                return;
            }
        };
        let delivered = self
            .hub
            .send_to_user(recipient_id, &OutboundMessage::Notification(payload));
        debug!(recipient_id = %recipient_id, delivered, "Notification pushed");
    }

    async fn invalidate_unread(&self, user_id: Uuid) {
        if let Err(e) = self
            .cache
            .delete(&keys::unread_notification_count(user_id))
            .await
        {
            warn!(user_id = %user_id, error = %e, "Failed to invalidate unread count");
        }
    }
}
