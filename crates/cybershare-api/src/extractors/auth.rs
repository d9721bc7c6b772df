//! `AuthUser` extractor: pulls the JWT from the Authorization header,
//! validates it, and injects the request context.

use std::convert::Infallible;

use axum::extract::FromRequestParts;
use axum::http::request::Parts;
use axum_extra::TypedHeader;
use axum_extra::headers::Authorization;
use axum_extra::headers::authorization::Bearer;

use cybershare_auth::Claims;
use cybershare_core::error::AppError;
use cybershare_service::RequestContext;

use crate::error::ApiError;
use crate::state::AppState;

/// Extracted authenticated user context available in handlers.
#[derive(Debug, Clone)]
pub struct AuthUser(pub RequestContext);

impl AuthUser {
    /// Returns the inner `RequestContext`.
    pub fn context(&self) -> &RequestContext {
        &self.0
    }
}

impl std::ops::Deref for AuthUser {
    type Target = RequestContext;
    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

/// Build the request context carried through services from verified claims.
pub fn context_from_claims(claims: Claims) -> RequestContext {
    let ttl = claims.remaining_ttl_seconds();
    RequestContext::new(
        claims.sub,
        claims.sid,
        claims.role,
        claims.username,
        claims.jti,
        ttl,
    )
}

impl FromRequestParts<AppState> for AuthUser {
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        // A guard earlier in the stack may have authenticated already
        if let Some(ctx) = parts.extensions.get::<RequestContext>() {
            return Ok(AuthUser(ctx.clone()));
        }

        let TypedHeader(Authorization(bearer)) =
            TypedHeader::<Authorization<Bearer>>::from_request_parts(parts, state)
                .await
                .map_err(|rejection| {
                    if rejection.is_missing() {
                        AppError::authentication("Missing Authorization header")
                    } else {
                        AppError::authentication("Invalid Authorization header format")
                    }
                })?;

        let claims = state.jwt_decoder.decode_access_token(bearer.token()).await?;
        let ctx = context_from_claims(claims);
        parts.extensions.insert(ctx.clone());

        Ok(AuthUser(ctx))
    }
}

/// Like [`AuthUser`] but never rejects: anonymous or invalid credentials
/// yield `None`. Used by public endpoints that personalise their answer.
#[derive(Debug, Clone)]
pub struct MaybeAuthUser(pub Option<RequestContext>);

impl MaybeAuthUser {
    /// The context, if the caller is signed in.
    pub fn context(&self) -> Option<&RequestContext> {
        self.0.as_ref()
    }

    /// The caller's user id, if signed in.
    pub fn user_id(&self) -> Option<uuid::Uuid> {
        self.0.as_ref().map(|ctx| ctx.user_id)
    }
}

impl FromRequestParts<AppState> for MaybeAuthUser {
    type Rejection = Infallible;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        if !parts.headers.contains_key(axum::http::header::AUTHORIZATION) {
            return Ok(MaybeAuthUser(None));
        }
        match AuthUser::from_request_parts(parts, state).await {
            Ok(AuthUser(ctx)) => Ok(MaybeAuthUser(Some(ctx))),
            Err(ApiError(err)) => {
                tracing::debug!(error = %err.message, "Ignoring invalid credentials on public route");
                Ok(MaybeAuthUser(None))
            }
        }
    }
}
