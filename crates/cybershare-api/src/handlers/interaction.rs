//! Like, bookmark and interaction status handlers.

use axum::Json;
use axum::extract::{Path, State};
use uuid::Uuid;

use cybershare_entity::social::InteractionStatus;

use crate::error::ApiResult;
use crate::extractors::{AuthUser, MaybeAuthUser};
use crate::state::AppState;

/// POST /api/posts/{id}/like
pub async fn toggle_like(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<Uuid>,
) -> ApiResult<Json<InteractionStatus>> {
    let status = state.interaction_service.toggle_like(&auth, id).await?;
    Ok(Json(status))
}

/// POST /api/posts/{id}/bookmark
pub async fn toggle_bookmark(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<Uuid>,
) -> ApiResult<Json<InteractionStatus>> {
    let status = state.interaction_service.toggle_bookmark(&auth, id).await?;
    Ok(Json(status))
}

/// GET /api/posts/{id}/status
pub async fn status(
    State(state): State<AppState>,
    viewer: MaybeAuthUser,
    Path(id): Path<Uuid>,
) -> ApiResult<Json<InteractionStatus>> {
    let status = state.interaction_service.status(viewer.context(), id).await?;
    Ok(Json(status))
}
