//! Password change, forgotten-password and reset-token handling.

use std::sync::Arc;

use chrono::{Duration, Utc};
use tracing::{info, warn};

use cybershare_auth::token::{generate_opaque_token, hash_token};
use cybershare_auth::{PasswordHasher, PasswordValidator};
use cybershare_core::AppError;
use cybershare_core::config::{ContentConfig, MailConfig};
use cybershare_core::result::AppResult;
use cybershare_database::repositories::{
    PasswordResetTokenRepository, RefreshTokenRepository, UserRepository,
};

use crate::context::RequestContext;
use crate::mail::{self, Mailer};

/// Handles password changes and email-based resets.
#[derive(Debug, Clone)]
pub struct PasswordService {
    user_repo: Arc<UserRepository>,
    reset_repo: Arc<PasswordResetTokenRepository>,
    refresh_repo: Arc<RefreshTokenRepository>,
    hasher: Arc<PasswordHasher>,
    validator: Arc<PasswordValidator>,
    mailer: Arc<dyn Mailer>,
    content: ContentConfig,
    mail: MailConfig,
}

impl PasswordService {
    /// Creates a new password service.
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        user_repo: Arc<UserRepository>,
        reset_repo: Arc<PasswordResetTokenRepository>,
        refresh_repo: Arc<RefreshTokenRepository>,
        hasher: Arc<PasswordHasher>,
        validator: Arc<PasswordValidator>,
        mailer: Arc<dyn Mailer>,
        content: ContentConfig,
        mail: MailConfig,
    ) -> Self {
        Self {
            user_repo,
            reset_repo,
            refresh_repo,
            hasher,
            validator,
            mailer,
            content,
            mail,
        }
    }

    /// Changes the current user's password.
    pub async fn change(
        &self,
        ctx: &RequestContext,
        current_password: &str,
        new_password: &str,
    ) -> AppResult<()> {
        let user = self
            .user_repo
            .find_by_id(ctx.user_id)
            .await?
            .ok_or_else(|| AppError::not_found("User not found"))?;

        if !self
            .hasher
            .verify_password(current_password, &user.password_hash)?
        {
            return Err(AppError::validation("Current password is incorrect"));
        }

        self.validator.validate_not_same(current_password, new_password)?;
        self.validator.validate(new_password)?;

        let hash = self.hasher.hash_password(new_password)?;
        self.user_repo.update_password(user.id, &hash).await?;

        info!(user_id = %user.id, "Password changed");
        Ok(())
    }

    /// Start a reset for `email`. Succeeds whether or not the account exists.
    pub async fn forgot(&self, email: &str) -> AppResult<()> {
        let email = email.trim().to_lowercase();
        let Some(user) = self.user_repo.find_by_email(&email).await? else {
            info!("Password reset requested for unknown email");
            return Ok(());
        };

        self.reset_repo.delete_for_user(user.id).await?;

        let token = generate_opaque_token();
        let expires_at = Utc::now() + Duration::hours(self.content.password_reset_ttl_hours);
        self.reset_repo
            .create(user.id, &hash_token(&token), expires_at)
            .await?;

        let link = reset_link(&self.content.frontend_url, &token);
        let (subject, body) = mail::password_reset_message(
            &self.mail.app_name,
            user.name(),
            &link,
            self.content.password_reset_ttl_hours,
        );
        if let Err(e) = self.mailer.send(&user.email, &subject, &body).await {
            warn!(user_id = %user.id, error = %e, "Failed to send password reset email");
        }

        info!(user_id = %user.id, "Password reset token issued");
        Ok(())
    }

    /// Whether `token` can still be used for a reset.
    pub async fn validate_token(&self, token: &str) -> AppResult<bool> {
        Ok(self
            .reset_repo
            .find_by_hash(&hash_token(token))
            .await?
            .is_some_and(|t| t.is_usable()))
    }

    /// Set a new password using a reset token, then revoke all sessions.
    pub async fn reset(&self, token: &str, new_password: &str) -> AppResult<()> {
        let stored = self
            .reset_repo
            .find_by_hash(&hash_token(token))
            .await?
            .filter(|t| t.is_usable())
            .ok_or_else(|| AppError::validation("Invalid or expired reset token"))?;

        self.validator.validate(new_password)?;
        let hash = self.hasher.hash_password(new_password)?;

        self.user_repo.update_password(stored.user_id, &hash).await?;
        self.reset_repo.mark_used(stored.id).await?;
        let revoked = self.refresh_repo.delete_for_user(stored.user_id).await?;

        info!(user_id = %stored.user_id, revoked, "Password reset completed");
        Ok(())
    }

    /// Delete expired reset tokens.
    pub async fn cleanup_expired(&self) -> AppResult<u64> {
        self.reset_repo.delete_expired().await
    }
}

/// Frontend link carrying the raw reset token.
fn reset_link(frontend_url: &str, token: &str) -> String {
    format!("{}/reset-password?token={token}", frontend_url.trim_end_matches('/'))
}
