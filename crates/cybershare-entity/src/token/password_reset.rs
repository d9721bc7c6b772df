//! Password reset token entity.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

/// A one-time password reset token.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct PasswordResetToken {
    pub id: Uuid,
    pub user_id: Uuid,
    #[serde(skip_serializing)]
    pub token_hash: String,
    pub expires_at: DateTime<Utc>,
    pub used: bool,
    pub created_at: DateTime<Utc>,
}

impl PasswordResetToken {
    /// Whether the token can still be redeemed.
    pub fn is_usable(&self) -> bool {
        !self.used && self.expires_at > Utc::now()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    fn token(used: bool, expires_in: Duration) -> PasswordResetToken {
        let now = Utc::now();
        PasswordResetToken {
            id: Uuid::new_v4(),
            user_id: Uuid::new_v4(),
            token_hash: "hash".into(),
            expires_at: now + expires_in,
            used,
            created_at: now,
        }
    }

    #[test]
    fn test_usable_only_when_unused_and_unexpired() {
        assert!(token(false, Duration::hours(1)).is_usable());
        assert!(!token(true, Duration::hours(1)).is_usable());
        assert!(!token(false, Duration::hours(-1)).is_usable());
    }
}
