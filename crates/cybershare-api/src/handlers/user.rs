//! User profile handlers.

use axum::Json;
use axum::extract::{Multipart, Path, Query, State};

use cybershare_core::types::PageResponse;
use cybershare_entity::user::{User, UserProfile};
use cybershare_service::ImageKind;

use crate::dto::request::{LimitQuery, SearchQuery, UpdateProfileRequest};
use crate::dto::response::AvatarUploadResponse;
use crate::error::ApiResult;
use crate::extractors::upload::read_file_field;
use crate::extractors::{AuthUser, PaginationParams, ValidatedJson};
use crate::state::AppState;

const DEFAULT_TOP_AUTHORS: i64 = 10;

/// GET /api/users/me
pub async fn me(State(state): State<AppState>, auth: AuthUser) -> ApiResult<Json<UserProfile>> {
    let profile = state.user_service.me(&auth).await?;
    Ok(Json(profile))
}

/// PATCH /api/users/me
pub async fn update_me(
    State(state): State<AppState>,
    auth: AuthUser,
    ValidatedJson(req): ValidatedJson<UpdateProfileRequest>,
) -> ApiResult<Json<User>> {
    let user = state.user_service.update_me(&auth, req.into()).await?;
    Ok(Json(user))
}

/// POST /api/users/me/avatar (multipart, field `file`)
pub async fn upload_avatar(
    State(state): State<AppState>,
    auth: AuthUser,
    multipart: Multipart,
) -> ApiResult<Json<AvatarUploadResponse>> {
    let file = read_file_field(multipart).await?;
    let stored = state
        .image_store
        .save(
            ImageKind::Avatar,
            file.content_type.as_deref(),
            file.file_name.as_deref(),
            &file.data,
        )
        .await?;
    state.user_service.set_avatar(&auth, &stored.url).await?;
    Ok(Json(AvatarUploadResponse {
        avatar_url: stored.url,
        message: "Avatar uploaded successfully".to_string(),
    }))
}

/// GET /api/users/{username}
pub async fn get_by_username(
    State(state): State<AppState>,
    Path(username): Path<String>,
) -> ApiResult<Json<UserProfile>> {
    let profile = state.user_service.get_by_username(&username).await?;
    Ok(Json(profile))
}

/// GET /api/users/top-authors?limit=
pub async fn top_authors(
    State(state): State<AppState>,
    Query(query): Query<LimitQuery>,
) -> ApiResult<Json<Vec<UserProfile>>> {
    let authors = state
        .user_service
        .top_authors(query.clamped(DEFAULT_TOP_AUTHORS))
        .await?;
    Ok(Json(authors))
}

/// GET /api/users/search?q=
pub async fn search(
    State(state): State<AppState>,
    Query(params): Query<PaginationParams>,
    Query(query): Query<SearchQuery>,
) -> ApiResult<Json<PageResponse<User>>> {
    let page = params.into_page_request();
    let users = state
        .user_service
        .search(query.q.as_deref().unwrap_or_default(), &page)
        .await?;
    Ok(Json(users))
}
