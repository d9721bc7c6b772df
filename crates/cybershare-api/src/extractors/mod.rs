//! Custom Axum extractors.

pub mod auth;
pub mod client_ip;
pub mod json;
pub mod pagination;
pub mod upload;

pub use auth::{AuthUser, MaybeAuthUser};
pub use client_ip::ClientIp;
pub use json::ValidatedJson;
pub use pagination::PaginationParams;
