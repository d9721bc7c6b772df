//! Stored token entities.

pub mod password_reset;
pub mod refresh;

pub use password_reset::PasswordResetToken;
pub use refresh::RefreshToken;
