//! Auth handlers: register, login, refresh, logout.

use axum::Json;
use axum::extract::State;
use axum::http::StatusCode;

use cybershare_service::auth::AuthResponse;

use crate::dto::request::{LoginRequest, RefreshRequest, RegisterRequest};
use crate::dto::response::MessageResponse;
use crate::error::ApiResult;
use crate::extractors::{AuthUser, ValidatedJson};
use crate::state::AppState;

/// POST /api/auth/register
pub async fn register(
    State(state): State<AppState>,
    ValidatedJson(req): ValidatedJson<RegisterRequest>,
) -> ApiResult<(StatusCode, Json<AuthResponse>)> {
    let response = state.auth_service.register(req.into()).await?;
    Ok((StatusCode::CREATED, Json(response)))
}

/// POST /api/auth/login
pub async fn login(
    State(state): State<AppState>,
    ValidatedJson(req): ValidatedJson<LoginRequest>,
) -> ApiResult<Json<AuthResponse>> {
    let response = state.auth_service.login(req.into()).await?;
    Ok(Json(response))
}

/// POST /api/auth/refresh
pub async fn refresh(
    State(state): State<AppState>,
    ValidatedJson(req): ValidatedJson<RefreshRequest>,
) -> ApiResult<Json<AuthResponse>> {
    let response = state.auth_service.refresh(&req.refresh_token).await?;
    Ok(Json(response))
}

/// POST /api/auth/logout
pub async fn logout(
    State(state): State<AppState>,
    auth: AuthUser,
) -> ApiResult<Json<MessageResponse>> {
    state.auth_service.logout(&auth).await?;
    Ok(Json(MessageResponse::new("Logged out successfully")))
}
