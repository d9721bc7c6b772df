//! Category handlers. Reads are public; writes require the admin role.

use axum::Json;
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use uuid::Uuid;

use cybershare_entity::taxonomy::{Category, CategoryWithCount};

use crate::dto::request::{CategoryRequest, LimitQuery};
use crate::dto::response::MessageResponse;
use crate::error::ApiResult;
use crate::extractors::{AuthUser, ValidatedJson};
use crate::middleware::rbac::require_admin;
use crate::state::AppState;

const DEFAULT_TOP_CATEGORIES: i64 = 10;

/// GET /api/categories
pub async fn list(State(state): State<AppState>) -> ApiResult<Json<Vec<Category>>> {
    Ok(Json(state.category_service.list().await?))
}

/// GET /api/categories/top?limit=
pub async fn top(
    State(state): State<AppState>,
    Query(query): Query<LimitQuery>,
) -> ApiResult<Json<Vec<CategoryWithCount>>> {
    let categories = state
        .category_service
        .top(query.clamped(DEFAULT_TOP_CATEGORIES))
        .await?;
    Ok(Json(categories))
}

/// GET /api/categories/{id}
pub async fn get(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> ApiResult<Json<Category>> {
    Ok(Json(state.category_service.get(id).await?))
}

/// GET /api/categories/slug/{slug}
pub async fn get_by_slug(
    State(state): State<AppState>,
    Path(slug): Path<String>,
) -> ApiResult<Json<Category>> {
    Ok(Json(state.category_service.get_by_slug(&slug).await?))
}

/// POST /api/categories
pub async fn create(
    State(state): State<AppState>,
    auth: AuthUser,
    ValidatedJson(req): ValidatedJson<CategoryRequest>,
) -> ApiResult<(StatusCode, Json<Category>)> {
    require_admin(&auth)?;
    let category = state.category_service.create(req.into()).await?;
    Ok((StatusCode::CREATED, Json(category)))
}

/// PUT /api/categories/{id}
pub async fn update(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<Uuid>,
    ValidatedJson(req): ValidatedJson<CategoryRequest>,
) -> ApiResult<Json<Category>> {
    require_admin(&auth)?;
    let category = state.category_service.update(id, req.into()).await?;
    Ok(Json(category))
}

/// DELETE /api/categories/{id}
pub async fn delete(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<Uuid>,
) -> ApiResult<Json<MessageResponse>> {
    require_admin(&auth)?;
    state.category_service.delete(id).await?;
    Ok(Json(MessageResponse::new("Category deleted")))
}
