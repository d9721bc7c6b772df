//! Follow handlers.

use axum::Json;
use axum::extract::{Path, Query, State};

use cybershare_core::types::PageResponse;
use cybershare_entity::social::FollowStats;
use cybershare_entity::user::AuthorRef;

use crate::dto::response::{FollowCheckResponse, MessageResponse};
use crate::error::ApiResult;
use crate::extractors::{AuthUser, PaginationParams};
use crate::state::AppState;

/// POST /api/follows/{username}
pub async fn follow(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(username): Path<String>,
) -> ApiResult<Json<MessageResponse>> {
    state.follow_service.follow(&auth, &username).await?;
    Ok(Json(MessageResponse::new(format!("Now following {username}"))))
}

/// DELETE /api/follows/{username}
pub async fn unfollow(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(username): Path<String>,
) -> ApiResult<Json<MessageResponse>> {
    state.follow_service.unfollow(&auth, &username).await?;
    Ok(Json(MessageResponse::new(format!("Unfollowed {username}"))))
}

/// GET /api/follows/{username}/check
pub async fn check(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(username): Path<String>,
) -> ApiResult<Json<FollowCheckResponse>> {
    let is_following = state.follow_service.is_following(&auth, &username).await?;
    Ok(Json(FollowCheckResponse { is_following }))
}

/// GET /api/users/{username}/followers
pub async fn followers(
    State(state): State<AppState>,
    Path(username): Path<String>,
    Query(params): Query<PaginationParams>,
) -> ApiResult<Json<PageResponse<AuthorRef>>> {
    let page = params.into_page_request();
    let users = state.follow_service.followers(&username, &page).await?;
    Ok(Json(users))
}

/// GET /api/users/{username}/following
pub async fn following(
    State(state): State<AppState>,
    Path(username): Path<String>,
    Query(params): Query<PaginationParams>,
) -> ApiResult<Json<PageResponse<AuthorRef>>> {
    let page = params.into_page_request();
    let users = state.follow_service.following(&username, &page).await?;
    Ok(Json(users))
}

/// GET /api/users/{username}/follow-stats
pub async fn stats(
    State(state): State<AppState>,
    Path(username): Path<String>,
) -> ApiResult<Json<FollowStats>> {
    let stats = state.follow_service.stats(&username).await?;
    Ok(Json(stats))
}
