//! User role enumeration.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Roles available on the platform.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "user_role", rename_all = "lowercase")]
#[serde(rename_all = "UPPERCASE")]
pub enum UserRole {
    /// Regular reader and commenter.
    User,
    /// Trusted writer.
    Author,
    /// Moderator with access to the admin console.
    Admin,
}

impl UserRole {
    /// Check if this role is an admin.
    pub fn is_admin(&self) -> bool {
        matches!(self, Self::Admin)
    }

    /// Return the role in its wire form.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::User => "USER",
            Self::Author => "AUTHOR",
            Self::Admin => "ADMIN",
        }
    }
}

impl fmt::Display for UserRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for UserRole {
    type Err = cybershare_core::AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_uppercase().as_str() {
            "USER" => Ok(Self::User),
            "AUTHOR" => Ok(Self::Author),
            "ADMIN" => Ok(Self::Admin),
            _ => Err(cybershare_core::AppError::validation(format!(
                "Invalid user role: '{s}'. Expected one of: USER, AUTHOR, ADMIN"
            ))),
        }
    }
}
