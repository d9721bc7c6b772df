//! JWT token validation and blocklist checking.

use std::sync::Arc;
use std::time::Duration;

use jsonwebtoken::{Algorithm, DecodingKey, Validation, decode};
use tracing::warn;
use uuid::Uuid;

use cybershare_cache::CacheManager;
use cybershare_cache::keys;
use cybershare_core::config::AuthConfig;
use cybershare_core::error::AppError;
use cybershare_core::traits::CacheProvider;

use super::claims::{Claims, TokenType};

/// Validates JWTs and consults the revocation blocklist.
#[derive(Clone)]
pub struct JwtDecoder {
    decoding_key: DecodingKey,
    validation: Validation,
    cache: Arc<CacheManager>,
}

impl std::fmt::Debug for JwtDecoder {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("JwtDecoder")
            .field("validation", &self.validation)
            .finish_non_exhaustive()
    }
}

impl JwtDecoder {
    /// Creates a new decoder from auth configuration.
    pub fn new(config: &AuthConfig, cache: Arc<CacheManager>) -> Self {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.validate_exp = true;
        validation.leeway = 5;

        Self {
            decoding_key: DecodingKey::from_secret(config.jwt_secret.as_bytes()),
            validation,
            cache,
        }
    }

    /// Validate an access token: signature, expiry, type and blocklist.
    pub async fn decode_access_token(&self, token: &str) -> Result<Claims, AppError> {
        let claims = self.decode_token(token, TokenType::Access)?;
        if self.is_revoked(claims.jti).await {
            return Err(AppError::authentication("Token has been revoked"));
        }
        Ok(claims)
    }

    /// Validate a refresh token: signature, expiry and type. Whether it is
    /// still stored is checked by the caller.
    pub fn decode_refresh_token(&self, token: &str) -> Result<Claims, AppError> {
        self.decode_token(token, TokenType::Refresh)
    }

    /// Block an access token until it would have expired anyway.
    pub async fn blocklist_token(&self, jti: Uuid, remaining_ttl_seconds: u64) -> Result<(), AppError> {
        let ttl = Duration::from_secs(remaining_ttl_seconds.max(60));
        self.cache
            .set(&keys::jwt_blocklist(&jti.to_string()), "revoked", ttl)
            .await
    }

    fn decode_token(&self, token: &str, expected: TokenType) -> Result<Claims, AppError> {
        let claims = decode::<Claims>(token, &self.decoding_key, &self.validation)
            .map_err(|e| match e.kind() {
                jsonwebtoken::errors::ErrorKind::ExpiredSignature => {
                    AppError::authentication("Token has expired")
                }
                jsonwebtoken::errors::ErrorKind::InvalidSignature => {
                    AppError::authentication("Invalid token signature")
                }
                _ => AppError::authentication("Invalid token"),
            })?
            .claims;

        if claims.token_type != expected {
            return Err(AppError::authentication("Invalid token type"));
        }
        Ok(claims)
    }

    async fn is_revoked(&self, jti: Uuid) -> bool {
        match self.cache.exists(&keys::jwt_blocklist(&jti.to_string())).await {
            Ok(blocked) => blocked,
            Err(e) => {
                warn!(error = %e, "Blocklist lookup failed, accepting token");
                false
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::jwt::encoder::JwtEncoder;
    use cybershare_entity::user::UserRole;

    fn setup() -> (JwtEncoder, JwtDecoder) {
        let config = AuthConfig {
            jwt_secret: "test-secret".into(),
            ..AuthConfig::default()
        };
        let cache = Arc::new(CacheManager::in_memory());
        (JwtEncoder::new(&config), JwtDecoder::new(&config, cache))
    }

    #[tokio::test]
    async fn test_access_token_round_trip() {
        let (encoder, decoder) = setup();
        let user = Uuid::new_v4();
        let session = Uuid::new_v4();
        let pair = encoder
            .generate_token_pair(user, session, UserRole::Author, "ada")
            .unwrap();

        let claims = decoder.decode_access_token(&pair.access_token).await.unwrap();
        assert_eq!(claims.user_id(), user);
        assert_eq!(claims.sid, session);
        assert_eq!(claims.role, UserRole::Author);
    }

    #[tokio::test]
    async fn test_token_types_are_not_interchangeable() {
        let (encoder, decoder) = setup();
        let pair = encoder
            .generate_token_pair(Uuid::new_v4(), Uuid::new_v4(), UserRole::User, "bob")
            .unwrap();

        assert!(decoder.decode_access_token(&pair.refresh_token).await.is_err());
        assert!(decoder.decode_refresh_token(&pair.access_token).is_err());
        assert!(decoder.decode_refresh_token(&pair.refresh_token).is_ok());
    }

    #[tokio::test]
    async fn test_blocklisted_token_is_rejected() {
        let (encoder, decoder) = setup();
        let pair = encoder
            .generate_token_pair(Uuid::new_v4(), Uuid::new_v4(), UserRole::User, "eve")
            .unwrap();
        let claims = decoder.decode_access_token(&pair.access_token).await.unwrap();

        decoder
            .blocklist_token(claims.jti, claims.remaining_ttl_seconds())
            .await
            .unwrap();

        let err = decoder.decode_access_token(&pair.access_token).await.unwrap_err();
        assert_eq!(err.message, "Token has been revoked");
    }

    #[tokio::test]
    async fn test_wrong_secret_is_rejected() {
        let (encoder, _) = setup();
        let other = AuthConfig {
            jwt_secret: "another-secret".into(),
            ..AuthConfig::default()
        };
        let decoder = JwtDecoder::new(&other, Arc::new(CacheManager::in_memory()));
        let pair = encoder
            .generate_token_pair(Uuid::new_v4(), Uuid::new_v4(), UserRole::User, "mallory")
            .unwrap();
        assert!(decoder.decode_access_token(&pair.access_token).await.is_err());
    }
}
