//! Role guards for admin-only routes.

use axum::extract::{Request, State};
use axum::middleware::Next;
use axum::response::Response;

use cybershare_core::error::AppError;

use crate::error::ApiError;
use crate::extractors::AuthUser;
use crate::state::AppState;

/// Checks that the authenticated user has the Admin role.
pub fn require_admin(auth: &AuthUser) -> Result<(), ApiError> {
    if !auth.is_admin() {
        return Err(AppError::authorization("Admin access required").into());
    }
    Ok(())
}

/// Route layer rejecting everyone but admins. The verified context is left
/// in the request extensions so handlers do not decode the token again.
pub async fn admin_only(
    State(_state): State<AppState>,
    auth: AuthUser,
    request: Request,
    next: Next,
) -> Result<Response, ApiError> {
    require_admin(&auth)?;
    Ok(next.run(request).await)
}
