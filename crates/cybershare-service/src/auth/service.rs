//! Authentication service: register, login, refresh and logout.

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::{info, warn};
use uuid::Uuid;

use cybershare_auth::token::hash_token;
use cybershare_auth::{JwtDecoder, JwtEncoder, PasswordHasher, PasswordValidator};
use cybershare_core::AppError;
use cybershare_core::result::AppResult;
use cybershare_database::repositories::{RefreshTokenRepository, UserRepository};
use cybershare_entity::user::{CreateUser, User, UserRole};

use super::username;
use crate::context::RequestContext;

/// Attempts at finding a free derived username before giving up.
const USERNAME_ATTEMPTS: usize = 10;

/// Input for [`AuthService::register`].
#[derive(Debug, Clone)]
pub struct RegisterInput {
    pub username: Option<String>,
    pub email: String,
    pub password: String,
    pub display_name: Option<String>,
}

/// Input for [`AuthService::login`].
#[derive(Debug, Clone)]
pub struct LoginInput {
    pub email: String,
    pub password: String,
}

/// Tokens plus the signed-in user's public fields.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AuthResponse {
    pub access_token: String,
    pub refresh_token: String,
    pub user_id: Uuid,
    pub username: String,
    pub email: String,
    pub display_name: String,
    pub role: UserRole,
}

/// Handles account creation and the token lifecycle.
#[derive(Debug, Clone)]
pub struct AuthService {
    user_repo: Arc<UserRepository>,
    refresh_repo: Arc<RefreshTokenRepository>,
    encoder: Arc<JwtEncoder>,
    decoder: Arc<JwtDecoder>,
    hasher: Arc<PasswordHasher>,
    validator: Arc<PasswordValidator>,
}

impl AuthService {
    /// Creates a new auth service.
    pub fn new(
        user_repo: Arc<UserRepository>,
        refresh_repo: Arc<RefreshTokenRepository>,
        encoder: Arc<JwtEncoder>,
        decoder: Arc<JwtDecoder>,
        hasher: Arc<PasswordHasher>,
        validator: Arc<PasswordValidator>,
    ) -> Self {
        Self {
            user_repo,
            refresh_repo,
            encoder,
            decoder,
            hasher,
            validator,
        }
    }

    /// Create an account with the USER role and sign it in.
    pub async fn register(&self, input: RegisterInput) -> AppResult<AuthResponse> {
        let email = input.email.trim().to_lowercase();

        let username = match input.username.as_deref().map(str::trim) {
            Some(name) if !name.is_empty() => {
                if self.user_repo.username_exists(name).await? {
                    return Err(AppError::conflict(format!(
                        "Username '{name}' is already taken"
                    )));
                }
                name.to_string()
            }
            _ => self.derive_username(&email).await?,
        };

        if self.user_repo.email_exists(&email).await? {
            return Err(AppError::conflict("Email is already in use"));
        }

        self.validator.validate(&input.password)?;
        let password_hash = self.hasher.hash_password(&input.password)?;

        let display_name = input
            .display_name
            .map(|d| d.trim().to_string())
            .filter(|d| !d.is_empty())
            .unwrap_or_else(|| username.clone());

        let user = self
            .user_repo
            .create(&CreateUser {
                username,
                email,
                password_hash,
                display_name,
                role: UserRole::User,
            })
            .await?;

        info!(user_id = %user.id, username = %user.username, "User registered");
        self.issue(&user).await
    }

    /// Verify credentials and issue a token pair.
    pub async fn login(&self, input: LoginInput) -> AppResult<AuthResponse> {
        let invalid = || AppError::authentication("Invalid email or password");

        let email = input.email.trim().to_lowercase();
        let user = self
            .user_repo
            .find_by_email(&email)
            .await?
            .ok_or_else(invalid)?;

        if !self
            .hasher
            .verify_password(&input.password, &user.password_hash)?
        {
            warn!(user_id = %user.id, "Failed login attempt");
            return Err(invalid());
        }

        if !user.can_login() {
            return Err(AppError::authorization("Account has been banned"));
        }

        info!(user_id = %user.id, "User logged in");
        self.issue(&user).await
    }

    /// Exchange a refresh token for a new pair. The presented token is
    /// consumed.
    pub async fn refresh(&self, refresh_token: &str) -> AppResult<AuthResponse> {
        let invalid = || AppError::authentication("Invalid or expired refresh token");

        let claims = self.decoder.decode_refresh_token(refresh_token)?;
        let stored = self
            .refresh_repo
            .find_valid(&hash_token(refresh_token))
            .await?
            .ok_or_else(invalid)?;

        if stored.id != claims.sid || stored.user_id != claims.user_id() {
            return Err(invalid());
        }
        self.refresh_repo.delete(stored.id).await?;

        let user = self
            .user_repo
            .find_by_id(stored.user_id)
            .await?
            .ok_or_else(invalid)?;
        if !user.can_login() {
            return Err(AppError::authorization("Account has been banned"));
        }

        self.issue(&user).await
    }

    /// Revoke every refresh token of the caller and block the presented
    /// access token until it expires.
    pub async fn logout(&self, ctx: &RequestContext) -> AppResult<()> {
        let removed = self.refresh_repo.delete_for_user(ctx.user_id).await?;
        self.decoder
            .blocklist_token(ctx.token_id, ctx.token_ttl_seconds)
            .await?;
        info!(user_id = %ctx.user_id, removed, "User logged out");
        Ok(())
    }

    /// Drop expired refresh tokens.
    pub async fn cleanup_expired(&self) -> AppResult<u64> {
        self.refresh_repo.delete_expired().await
    }

    async fn issue(&self, user: &User) -> AppResult<AuthResponse> {
        let session_id = Uuid::new_v4();
        let pair = self
            .encoder
            .generate_token_pair(user.id, session_id, user.role, &user.username)?;

        self.refresh_repo
            .create(
                session_id,
                user.id,
                &hash_token(&pair.refresh_token),
                pair.refresh_expires_at,
            )
            .await?;

        Ok(AuthResponse {
            access_token: pair.access_token,
            refresh_token: pair.refresh_token,
            user_id: user.id,
            username: user.username.clone(),
            email: user.email.clone(),
            display_name: user.name().to_string(),
            role: user.role,
        })
    }

    async fn derive_username(&self, email: &str) -> AppResult<String> {
        let base = username::base_from_email(email);
        if !self.user_repo.username_exists(&base).await? {
            return Ok(base);
        }
        for _ in 0..USERNAME_ATTEMPTS {
            let candidate = username::with_random_suffix(&base);
            if !self.user_repo.username_exists(&candidate).await? {
                return Ok(candidate);
            }
        }
        Err(AppError::conflict("Could not derive a free username, please choose one"))
    }
}
