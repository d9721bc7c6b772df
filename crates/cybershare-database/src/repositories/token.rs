//! Refresh and password reset token repositories.

use chrono::{DateTime, Utc};
use sqlx::PgPool;
use uuid::Uuid;

use cybershare_core::result::AppResult;
use cybershare_entity::token::{PasswordResetToken, RefreshToken};

use super::db_error;

/// Repository for stored refresh token hashes.
#[derive(Debug, Clone)]
pub struct RefreshTokenRepository {
    pool: PgPool,
}

impl RefreshTokenRepository {
    /// Create a new refresh token repository.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Store a token hash.
    pub async fn create(
        &self,
        id: Uuid,
        user_id: Uuid,
        token_hash: &str,
        expires_at: DateTime<Utc>,
    ) -> AppResult<RefreshToken> {
        sqlx::query_as::<_, RefreshToken>(
            "INSERT INTO refresh_tokens (id, user_id, token_hash, expires_at) \
             VALUES ($1, $2, $3, $4) RETURNING *",
        )
        .bind(id)
        .bind(user_id)
        .bind(token_hash)
        .bind(expires_at)
        .fetch_one(&self.pool)
        .await
        .map_err(db_error("Failed to store refresh token"))
    }

    /// Find an unexpired token by hash.
    pub async fn find_valid(&self, token_hash: &str) -> AppResult<Option<RefreshToken>> {
        sqlx::query_as::<_, RefreshToken>(
            "SELECT * FROM refresh_tokens WHERE token_hash = $1 AND expires_at > NOW()",
        )
        .bind(token_hash)
        .fetch_optional(&self.pool)
        .await
        .map_err(db_error("Failed to find refresh token"))
    }

    /// Delete a single token. Returns whether it existed.
    pub async fn delete(&self, id: Uuid) -> AppResult<bool> {
        let result = sqlx::query("DELETE FROM refresh_tokens WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(db_error("Failed to delete refresh token"))?;
        Ok(result.rows_affected() > 0)
    }

    /// Revoke every token of a user.
    pub async fn delete_for_user(&self, user_id: Uuid) -> AppResult<u64> {
        let result = sqlx::query("DELETE FROM refresh_tokens WHERE user_id = $1")
            .bind(user_id)
            .execute(&self.pool)
            .await
            .map_err(db_error("Failed to revoke refresh tokens"))?;
        Ok(result.rows_affected())
    }

    /// Purge expired rows.
    pub async fn delete_expired(&self) -> AppResult<u64> {
        let result = sqlx::query("DELETE FROM refresh_tokens WHERE expires_at <= NOW()")
            .execute(&self.pool)
            .await
            .map_err(db_error("Failed to purge refresh tokens"))?;
        Ok(result.rows_affected())
    }
}

/// Repository for password reset tokens.
#[derive(Debug, Clone)]
pub struct PasswordResetTokenRepository {
    pool: PgPool,
}

impl PasswordResetTokenRepository {
    /// Create a new password reset token repository.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Store a token hash.
    pub async fn create(
        &self,
        user_id: Uuid,
        token_hash: &str,
        expires_at: DateTime<Utc>,
    ) -> AppResult<PasswordResetToken> {
        sqlx::query_as::<_, PasswordResetToken>(
            "INSERT INTO password_reset_tokens (user_id, token_hash, expires_at) \
             VALUES ($1, $2, $3) RETURNING *",
        )
        .bind(user_id)
        .bind(token_hash)
        .bind(expires_at)
        .fetch_one(&self.pool)
        .await
        .map_err(db_error("Failed to store reset token"))
    }

    /// Find a token by hash regardless of state.
    pub async fn find_by_hash(&self, token_hash: &str) -> AppResult<Option<PasswordResetToken>> {
        sqlx::query_as::<_, PasswordResetToken>(
            "SELECT * FROM password_reset_tokens WHERE token_hash = $1",
        )
        .bind(token_hash)
        .fetch_optional(&self.pool)
        .await
        .map_err(db_error("Failed to find reset token"))
    }

    /// Mark a token redeemed.
    pub async fn mark_used(&self, id: Uuid) -> AppResult<()> {
        sqlx::query("UPDATE password_reset_tokens SET used = TRUE WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(db_error("Failed to mark reset token used"))?;
        Ok(())
    }

    /// Drop all tokens of a user.
    pub async fn delete_for_user(&self, user_id: Uuid) -> AppResult<u64> {
        let result = sqlx::query("DELETE FROM password_reset_tokens WHERE user_id = $1")
            .bind(user_id)
            .execute(&self.pool)
            .await
            .map_err(db_error("Failed to delete reset tokens"))?;
        Ok(result.rows_affected())
    }

    /// Purge expired rows.
    pub async fn delete_expired(&self) -> AppResult<u64> {
        let result = sqlx::query("DELETE FROM password_reset_tokens WHERE expires_at <= NOW()")
            .execute(&self.pool)
            .await
            .map_err(db_error("Failed to purge reset tokens"))?;
        Ok(result.rows_affected())
    }
}
