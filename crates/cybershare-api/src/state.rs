//! Application state shared across all handlers and middleware.

use std::sync::Arc;

use sqlx::PgPool;

use cybershare_auth::JwtDecoder;
use cybershare_cache::CacheManager;
use cybershare_core::config::AppConfig;
use cybershare_realtime::RealtimeHub;
use cybershare_service::{
    AdminService, AuthService, CategoryService, CommentService, FollowService,
    ImageStore, InteractionService, NotificationService, PasswordService, PostService,
    TagService, UserService,
};

use crate::middleware::rate_limit::RateLimiter;

/// Application state containing all shared dependencies.
///
/// Passed to every Axum handler via `State<AppState>`.
/// All fields are `Arc`-wrapped for cheap cloning across tasks.
#[derive(Debug, Clone)]
pub struct AppState {
    // ── Configuration ────────────────────────────────────────
    /// Application configuration
    pub config: Arc<AppConfig>,

    // ── Infrastructure ───────────────────────────────────────
    /// PostgreSQL connection pool
    pub db_pool: PgPool,
    /// Cache manager (Redis or in-memory)
    pub cache: Arc<CacheManager>,
    /// Live WebSocket connections
    pub realtime: Arc<RealtimeHub>,
    /// Per-IP limiter for the auth and password endpoints
    pub rate_limiter: Arc<RateLimiter>,
    /// Uploaded avatars and post images
    pub image_store: Arc<ImageStore>,

    // ── Auth ─────────────────────────────────────────────────
    /// JWT decoder and blocklist check
    pub jwt_decoder: Arc<JwtDecoder>,

    // ── Services ─────────────────────────────────────────────
    pub auth_service: Arc<AuthService>,
    pub password_service: Arc<PasswordService>,
    pub post_service: Arc<PostService>,
    pub comment_service: Arc<CommentService>,
    pub interaction_service: Arc<InteractionService>,
    pub follow_service: Arc<FollowService>,
    pub notification_service: Arc<NotificationService>,
    pub user_service: Arc<UserService>,
    pub category_service: Arc<CategoryService>,
    pub tag_service: Arc<TagService>,
    pub admin_service: Arc<AdminService>,
}
