//! Admin console handlers. Mounted behind the admin-only route layer.

use axum::Json;
use axum::body::Bytes;
use axum::extract::{Path, Query, State};
use uuid::Uuid;
use validator::Validate;

use cybershare_core::error::AppError;
use cybershare_core::types::PageResponse;
use cybershare_database::repositories::{PlatformStatistics, UserFilter};
use cybershare_entity::user::User;
use cybershare_service::post::PostDetail;

use crate::dto::request::{
    AdminUserQuery, PostStatusQuery, RejectPostRequest, UpdateUserRoleRequest,
    UpdateUserStatusRequest,
};
use crate::dto::response::MessageResponse;
use crate::error::ApiResult;
use crate::extractors::{AuthUser, PaginationParams, ValidatedJson};
use crate::state::AppState;

/// GET /api/admin/statistics
pub async fn statistics(State(state): State<AppState>) -> ApiResult<Json<PlatformStatistics>> {
    Ok(Json(state.admin_service.statistics().await?))
}

/// GET /api/admin/users?search=&status=&role=
pub async fn users(
    State(state): State<AppState>,
    Query(params): Query<PaginationParams>,
    Query(query): Query<AdminUserQuery>,
) -> ApiResult<Json<PageResponse<User>>> {
    let page = params.into_page_request();
    let filter = UserFilter::from(query);
    Ok(Json(state.admin_service.users(&filter, &page).await?))
}

/// PUT /api/admin/users/{id}/status
pub async fn set_user_status(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<Uuid>,
    ValidatedJson(req): ValidatedJson<UpdateUserStatusRequest>,
) -> ApiResult<Json<User>> {
    let user = state
        .admin_service
        .set_user_status(&auth, id, req.status)
        .await?;
    Ok(Json(user))
}

/// PUT /api/admin/users/{id}/role
pub async fn set_user_role(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<Uuid>,
    ValidatedJson(req): ValidatedJson<UpdateUserRoleRequest>,
) -> ApiResult<Json<User>> {
    let user = state.admin_service.set_user_role(&auth, id, req.role).await?;
    Ok(Json(user))
}

/// GET /api/admin/posts?status=
pub async fn posts(
    State(state): State<AppState>,
    Query(params): Query<PaginationParams>,
    Query(query): Query<PostStatusQuery>,
) -> ApiResult<Json<PageResponse<PostDetail>>> {
    let page = params.into_page_request();
    Ok(Json(state.admin_service.posts(query.status, &page).await?))
}

/// GET /api/admin/posts/pending
pub async fn pending(
    State(state): State<AppState>,
    Query(params): Query<PaginationParams>,
) -> ApiResult<Json<PageResponse<PostDetail>>> {
    let page = params.into_page_request();
    Ok(Json(state.admin_service.pending(&page).await?))
}

/// PUT /api/admin/posts/{id}/approve
pub async fn approve(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<Uuid>,
) -> ApiResult<Json<MessageResponse>> {
    state.admin_service.approve(&auth, id).await?;
    Ok(Json(MessageResponse::new("Post approved")))
}

/// PUT /api/admin/posts/{id}/reject
pub async fn reject(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<Uuid>,
    body: Bytes,
) -> ApiResult<Json<MessageResponse>> {
    // The body is optional for rejections
    let reason = if body.iter().all(u8::is_ascii_whitespace) {
        None
    } else {
        let req: RejectPostRequest = serde_json::from_slice(&body)
            .map_err(|e| AppError::validation(format!("Invalid request body: {e}")))?;
        req.validate()?;
        req.reason
    };
    state
        .admin_service
        .reject(&auth, id, reason.as_deref())
        .await?;
    Ok(Json(MessageResponse::new("Post rejected")))
}

/// PUT /api/admin/posts/{id}/hide
pub async fn hide(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<Uuid>,
) -> ApiResult<Json<MessageResponse>> {
    state.admin_service.hide(&auth, id).await?;
    Ok(Json(MessageResponse::new("Post hidden")))
}

/// DELETE /api/admin/posts/{id}
pub async fn delete_post(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<Uuid>,
) -> ApiResult<Json<MessageResponse>> {
    state.admin_service.delete_post(&auth, id).await?;
    Ok(Json(MessageResponse::new("Post deleted")))
}
