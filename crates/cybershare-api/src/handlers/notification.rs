//! Notification handlers.

use axum::Json;
use axum::extract::{Path, Query, State};
use uuid::Uuid;

use cybershare_core::types::PageResponse;
use cybershare_entity::notification::NotificationRecord;

use crate::dto::response::{AffectedResponse, CountResponse, MessageResponse};
use crate::error::ApiResult;
use crate::extractors::{AuthUser, PaginationParams};
use crate::state::AppState;

/// GET /api/notifications
pub async fn list(
    State(state): State<AppState>,
    auth: AuthUser,
    Query(params): Query<PaginationParams>,
) -> ApiResult<Json<PageResponse<NotificationRecord>>> {
    let page = params.into_page_request();
    let notifications = state.notification_service.list(&auth, &page).await?;
    Ok(Json(notifications))
}

/// GET /api/notifications/unread-count
pub async fn unread_count(
    State(state): State<AppState>,
    auth: AuthUser,
) -> ApiResult<Json<CountResponse>> {
    let count = state.notification_service.unread_count(&auth).await?;
    Ok(Json(CountResponse { count }))
}

/// POST /api/notifications/{id}/read
pub async fn mark_read(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<Uuid>,
) -> ApiResult<Json<MessageResponse>> {
    state.notification_service.mark_read(&auth, id).await?;
    Ok(Json(MessageResponse::new("Marked as read")))
}

/// POST /api/notifications/read-all
pub async fn mark_all_read(
    State(state): State<AppState>,
    auth: AuthUser,
) -> ApiResult<Json<AffectedResponse>> {
    let affected = state.notification_service.mark_all_read(&auth).await?;
    Ok(Json(AffectedResponse { affected }))
}
