//! Tag handlers. Reads are public; writes require the admin role.

use axum::Json;
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use uuid::Uuid;

use cybershare_entity::taxonomy::{Tag, TagWithCount};

use crate::dto::request::{LimitQuery, SearchQuery, TagRequest};
use crate::dto::response::MessageResponse;
use crate::error::ApiResult;
use crate::extractors::{AuthUser, ValidatedJson};
use crate::middleware::rbac::require_admin;
use crate::state::AppState;

const DEFAULT_TOP_TAGS: i64 = 10;

/// GET /api/tags?q=
pub async fn search(
    State(state): State<AppState>,
    Query(query): Query<SearchQuery>,
) -> ApiResult<Json<Vec<Tag>>> {
    let tags = state.tag_service.search(query.q.as_deref()).await?;
    Ok(Json(tags))
}

/// GET /api/tags/top?limit=
pub async fn top(
    State(state): State<AppState>,
    Query(query): Query<LimitQuery>,
) -> ApiResult<Json<Vec<TagWithCount>>> {
    let tags = state.tag_service.top(query.clamped(DEFAULT_TOP_TAGS)).await?;
    Ok(Json(tags))
}

/// POST /api/tags
pub async fn create(
    State(state): State<AppState>,
    auth: AuthUser,
    ValidatedJson(req): ValidatedJson<TagRequest>,
) -> ApiResult<(StatusCode, Json<Tag>)> {
    require_admin(&auth)?;
    let tag = state.tag_service.create(req.into()).await?;
    Ok((StatusCode::CREATED, Json(tag)))
}

/// PUT /api/tags/{id}
pub async fn update(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<Uuid>,
    ValidatedJson(req): ValidatedJson<TagRequest>,
) -> ApiResult<Json<Tag>> {
    require_admin(&auth)?;
    let tag = state.tag_service.update(id, req.into()).await?;
    Ok(Json(tag))
}

/// DELETE /api/tags/{id}
pub async fn delete(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<Uuid>,
) -> ApiResult<Json<MessageResponse>> {
    require_admin(&auth)?;
    state.tag_service.delete(id).await?;
    Ok(Json(MessageResponse::new("Tag deleted")))
}
