//! Password change and reset handlers.

use axum::Json;
use axum::extract::{Query, State};

use crate::dto::request::{
    ChangePasswordRequest, ForgotPasswordRequest, ResetPasswordRequest, TokenQuery,
};
use crate::dto::response::{MessageResponse, TokenValidityResponse};
use crate::error::ApiResult;
use crate::extractors::{AuthUser, ValidatedJson};
use crate::state::AppState;

/// POST /api/password/change
pub async fn change(
    State(state): State<AppState>,
    auth: AuthUser,
    ValidatedJson(req): ValidatedJson<ChangePasswordRequest>,
) -> ApiResult<Json<MessageResponse>> {
    state
        .password_service
        .change(&auth, &req.current_password, &req.new_password)
        .await?;
    Ok(Json(MessageResponse::new("Password changed successfully")))
}

/// POST /api/password/forgot
///
/// Answers the same way whether or not the address is registered.
pub async fn forgot(
    State(state): State<AppState>,
    ValidatedJson(req): ValidatedJson<ForgotPasswordRequest>,
) -> ApiResult<Json<MessageResponse>> {
    state.password_service.forgot(&req.email).await?;
    Ok(Json(MessageResponse::new(
        "If the email is registered, a reset link has been sent",
    )))
}

/// GET /api/password/reset/validate?token=
pub async fn validate_token(
    State(state): State<AppState>,
    Query(query): Query<TokenQuery>,
) -> ApiResult<Json<TokenValidityResponse>> {
    let valid = state.password_service.validate_token(&query.token).await?;
    Ok(Json(TokenValidityResponse { valid }))
}

/// POST /api/password/reset
pub async fn reset(
    State(state): State<AppState>,
    ValidatedJson(req): ValidatedJson<ResetPasswordRequest>,
) -> ApiResult<Json<MessageResponse>> {
    state
        .password_service
        .reset(&req.token, &req.new_password)
        .await?;
    Ok(Json(MessageResponse::new("Password has been reset")))
}
