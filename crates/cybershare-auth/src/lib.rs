//! # cybershare-auth
//!
//! Authentication building blocks for CyberShare.
//!
//! ## Modules
//!
//! - `jwt`: access/refresh token creation, validation and the revocation blocklist
//! - `password`: Argon2id hashing and password policy
//! - `token`: opaque random tokens and their storage hashes

pub mod jwt;
pub mod password;
pub mod token;

pub use jwt::{Claims, JwtDecoder, JwtEncoder, TokenPair, TokenType};
pub use password::{PasswordHasher, PasswordValidator};
