//! Password policy for new passwords.

use cybershare_core::config::AuthConfig;
use cybershare_core::error::AppError;

/// Maximum accepted password length. Argon2 input stays bounded.
const MAX_LENGTH: usize = 128;

/// Validates new passwords against the configured policy.
#[derive(Debug, Clone)]
pub struct PasswordValidator {
    min_length: usize,
    require_strong: bool,
}

impl PasswordValidator {
    /// Creates a new validator from auth configuration.
    pub fn new(config: &AuthConfig) -> Self {
        Self {
            min_length: config.password_min_length,
            require_strong: config.require_strong_passwords,
        }
    }

    /// Check length bounds and, when enabled, zxcvbn strength.
    pub fn validate(&self, password: &str) -> Result<(), AppError> {
        let length = password.chars().count();
        if length < self.min_length {
            return Err(AppError::validation(format!(
                "Password must be at least {} characters long",
                self.min_length
            )));
        }
        if length > MAX_LENGTH {
            return Err(AppError::validation(format!(
                "Password must be at most {MAX_LENGTH} characters long"
            )));
        }
        if password.trim().is_empty() {
            return Err(AppError::validation("Password must not be blank"));
        }

        if self.require_strong && zxcvbn::zxcvbn(password, &[]).score() < zxcvbn::Score::Three {
            return Err(AppError::validation(
                "Password is too weak. Please use a stronger password.",
            ));
        }

        Ok(())
    }

    /// Reject a new password equal to the current one.
    pub fn validate_not_same(&self, current: &str, new: &str) -> Result<(), AppError> {
        if current == new {
            return Err(AppError::validation(
                "New password must be different from the current password",
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn validator(require_strong: bool) -> PasswordValidator {
        PasswordValidator::new(&AuthConfig {
            require_strong_passwords: require_strong,
            ..AuthConfig::default()
        })
    }

    #[test]
    fn test_min_length_enforced() {
        let err = validator(false).validate("short").unwrap_err();
        assert!(err.message.contains("at least 8"));
        assert!(validator(false).validate("longenough").is_ok());
    }

    #[test]
    fn test_blank_password_rejected() {
        assert!(validator(false).validate("          ").is_err());
    }

    #[test]
    fn test_strength_check_only_when_enabled() {
        assert!(validator(false).validate("password").is_ok());
        assert!(validator(true).validate("password").is_err());
        assert!(validator(true).validate("violet-Tundra-87-lantern").is_ok());
    }

    #[test]
    fn test_new_password_must_differ() {
        assert!(validator(false).validate_not_same("abc12345", "abc12345").is_err());
        assert!(validator(false).validate_not_same("abc12345", "xyz98765").is_ok());
    }
}
