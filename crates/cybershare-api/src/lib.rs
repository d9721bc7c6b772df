//! # cybershare-api
//!
//! HTTP API layer for CyberShare built on Axum.
//!
//! Provides all REST endpoints under `/api`, the notification WebSocket,
//! middleware (admin guard, rate limiting, CORS, logging), extractors,
//! DTOs, and the mapping from `AppError` to HTTP responses.

pub mod app;
pub mod dto;
pub mod error;
pub mod extractors;
pub mod handlers;
pub mod middleware;
pub mod router;
pub mod state;

pub use app::{build_app, build_state, run_server};
pub use error::{ApiError, ApiResult};
pub use state::AppState;
