//! Comment handlers.

use axum::Json;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use uuid::Uuid;

use cybershare_core::error::AppError;
use cybershare_entity::comment::CommentNode;

use crate::dto::request::{CreateCommentRequest, UpdateCommentRequest};
use crate::dto::response::AffectedResponse;
use crate::error::ApiResult;
use crate::extractors::{AuthUser, ValidatedJson};
use crate::state::AppState;

/// GET /api/posts/{slug}/comments
///
/// The segment is the post slug here; the POST on the same path takes an id.
pub async fn tree(
    State(state): State<AppState>,
    Path(slug): Path<String>,
) -> ApiResult<Json<Vec<CommentNode>>> {
    let comments = state.comment_service.tree_for_post(&slug).await?;
    Ok(Json(comments))
}

/// POST /api/posts/{id}/comments
pub async fn create(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(post_id): Path<String>,
    ValidatedJson(req): ValidatedJson<CreateCommentRequest>,
) -> ApiResult<(StatusCode, Json<CommentNode>)> {
    let post_id = Uuid::parse_str(&post_id)
        .map_err(|_| AppError::validation(format!("Invalid post id: {post_id}")))?;
    let comment = state
        .comment_service
        .create(&auth, post_id, &req.content, req.parent_id)
        .await?;
    Ok((StatusCode::CREATED, Json(comment)))
}

/// PATCH /api/comments/{id}
pub async fn update(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<Uuid>,
    ValidatedJson(req): ValidatedJson<UpdateCommentRequest>,
) -> ApiResult<Json<CommentNode>> {
    let comment = state.comment_service.update(&auth, id, &req.content).await?;
    Ok(Json(comment))
}

/// DELETE /api/comments/{id}
pub async fn delete(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<Uuid>,
) -> ApiResult<Json<AffectedResponse>> {
    let affected = state.comment_service.delete(&auth, id).await?;
    Ok(Json(AffectedResponse { affected }))
}
