//! # cybershare-core
//!
//! Core crate for CyberShare. Contains configuration schemas, the unified
//! error system, pagination and response types, and the cache provider
//! trait implemented by `cybershare-cache`.
//!
//! This crate has **no** internal dependencies on other CyberShare crates.

pub mod config;
pub mod error;
pub mod result;
pub mod traits;
pub mod types;

pub use error::AppError;
pub use result::AppResult;
