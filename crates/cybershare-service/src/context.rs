//! Request context carrying the authenticated user.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use cybershare_entity::user::UserRole;

/// Context for the current authenticated request.
///
/// Built by the API layer from verified access-token claims and passed into
/// service methods so that every operation knows who is acting.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RequestContext {
    /// The authenticated user's ID.
    pub user_id: Uuid,
    /// The refresh-token row this access token was issued with.
    pub session_id: Uuid,
    /// The user's role at the time the token was issued.
    pub role: UserRole,
    /// The username (convenience field from the claims).
    pub username: String,
    /// The access token's unique id, used for revocation on logout.
    pub token_id: Uuid,
    /// Remaining lifetime of the access token in seconds.
    pub token_ttl_seconds: u64,
    /// When the request was received.
    pub request_time: DateTime<Utc>,
}

impl RequestContext {
    /// Creates a new request context.
    pub fn new(
        user_id: Uuid,
        session_id: Uuid,
        role: UserRole,
        username: String,
        token_id: Uuid,
        token_ttl_seconds: u64,
    ) -> Self {
        Self {
            user_id,
            session_id,
            role,
            username,
            token_id,
            token_ttl_seconds,
            request_time: Utc::now(),
        }
    }

    /// Returns whether the current user is an admin.
    pub fn is_admin(&self) -> bool {
        self.role.is_admin()
    }

    /// Context for tests and internal jobs.
    pub fn for_user(user_id: Uuid, role: UserRole) -> Self {
        Self::new(
            user_id,
            Uuid::nil(),
            role,
            String::new(),
            Uuid::nil(),
            0,
        )
    }
}
