//! Application builder: wires repositories, services and state into an Axum app.

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use axum::Router;
use sqlx::PgPool;
use tokio::sync::watch;

use cybershare_auth::{JwtDecoder, JwtEncoder, PasswordHasher, PasswordValidator};
use cybershare_cache::CacheManager;
use cybershare_core::config::AppConfig;
use cybershare_core::error::AppError;
use cybershare_core::result::AppResult;
use cybershare_database::repositories::{
    CategoryRepository, CommentRepository, FollowRepository, InteractionRepository,
    NotificationRepository, PasswordResetTokenRepository, PostRepository,
    RefreshTokenRepository, StatsRepository, TagRepository, UserRepository,
};
use cybershare_realtime::RealtimeHub;
use cybershare_service::{
    AdminService, AuthService, CategoryService, CommentService, FollowService, ImageStore,
    InteractionService, NotificationService, PasswordService, PostService, TagService,
    UserService, build_mailer,
};

use crate::middleware::rate_limit::RateLimiter;
use crate::router::build_router;
use crate::state::AppState;

/// Rate-limit buckets idle for this long are dropped by the maintenance task.
const RATE_LIMIT_IDLE: Duration = Duration::from_secs(15 * 60);

/// Builds the complete Axum application with all routes and middleware.
pub fn build_app(state: AppState) -> Router {
    build_router(state)
}

/// Constructs every repository and service on top of an existing pool and cache.
pub fn build_state(
    config: AppConfig,
    db_pool: PgPool,
    cache: Arc<CacheManager>,
) -> AppResult<AppState> {
    // ── Step 1: Repositories ─────────────────────────────────────
    let user_repo = Arc::new(UserRepository::new(db_pool.clone()));
    let post_repo = Arc::new(PostRepository::new(db_pool.clone()));
    let comment_repo = Arc::new(CommentRepository::new(db_pool.clone()));
    let category_repo = Arc::new(CategoryRepository::new(db_pool.clone()));
    let tag_repo = Arc::new(TagRepository::new(db_pool.clone()));
    let follow_repo = Arc::new(FollowRepository::new(db_pool.clone()));
    let interaction_repo = Arc::new(InteractionRepository::new(db_pool.clone()));
    let notification_repo = Arc::new(NotificationRepository::new(db_pool.clone()));
    let refresh_repo = Arc::new(RefreshTokenRepository::new(db_pool.clone()));
    let reset_repo = Arc::new(PasswordResetTokenRepository::new(db_pool.clone()));
    let stats_repo = Arc::new(StatsRepository::new(db_pool.clone()));

    // ── Step 2: Auth primitives ──────────────────────────────────
    let password_hasher = Arc::new(PasswordHasher::new());
    let password_validator = Arc::new(PasswordValidator::new(&config.auth));
    let jwt_encoder = Arc::new(JwtEncoder::new(&config.auth));
    let jwt_decoder = Arc::new(JwtDecoder::new(&config.auth, Arc::clone(&cache)));

    // ── Step 3: Realtime, mail and uploads ───────────────────────
    let realtime = Arc::new(RealtimeHub::new());
    let mailer = build_mailer(&config.mail)?;
    let image_store = Arc::new(ImageStore::new(&config.storage));

    // ── Step 4: Services ─────────────────────────────────────────
    let notification_service = Arc::new(NotificationService::new(
        Arc::clone(&notification_repo),
        Arc::clone(&cache),
        Arc::clone(&realtime),
    ));
    let auth_service = Arc::new(AuthService::new(
        Arc::clone(&user_repo),
        Arc::clone(&refresh_repo),
        jwt_encoder,
        Arc::clone(&jwt_decoder),
        Arc::clone(&password_hasher),
        Arc::clone(&password_validator),
    ));
    let password_service = Arc::new(PasswordService::new(
        Arc::clone(&user_repo),
        reset_repo,
        Arc::clone(&refresh_repo),
        password_hasher,
        password_validator,
        mailer,
        config.content.clone(),
        config.mail.clone(),
    ));
    let category_service = Arc::new(CategoryService::new(category_repo, Arc::clone(&cache)));
    let tag_service = Arc::new(TagService::new(
        tag_repo,
        Arc::clone(&cache),
        config.content.tag_search_limit,
    ));
    let post_service = Arc::new(PostService::new(
        Arc::clone(&post_repo),
        Arc::clone(&user_repo),
        Arc::clone(&category_service),
        Arc::clone(&tag_service),
        config.content.trending_window_days,
    ));
    let comment_service = Arc::new(CommentService::new(
        comment_repo,
        Arc::clone(&post_repo),
        Arc::clone(&notification_service),
    ));
    let interaction_service = Arc::new(InteractionService::new(
        interaction_repo,
        Arc::clone(&post_repo),
        Arc::clone(&notification_service),
    ));
    let follow_service = Arc::new(FollowService::new(
        follow_repo,
        Arc::clone(&user_repo),
        Arc::clone(&notification_service),
    ));
    let user_service = Arc::new(UserService::new(Arc::clone(&user_repo)));
    let admin_service = Arc::new(AdminService::new(
        stats_repo,
        user_repo,
        refresh_repo,
        Arc::clone(&post_service),
        Arc::clone(&notification_service),
    ));

    let rate_limiter = Arc::new(RateLimiter::from_config(&config.server.rate_limit));

    Ok(AppState {
        config: Arc::new(config),
        db_pool,
        cache,
        realtime,
        rate_limiter,
        image_store,
        jwt_decoder,
        auth_service,
        password_service,
        post_service,
        comment_service,
        interaction_service,
        follow_service,
        notification_service,
        user_service,
        category_service,
        tag_service,
        admin_service,
    })
}

/// Runs the CyberShare server with the given configuration and database pool.
pub async fn run_server(config: AppConfig, db_pool: PgPool) -> Result<(), AppError> {
    tracing::info!("Starting CyberShare server...");

    // ── Step 1: Initialize cache ─────────────────────────────────
    tracing::info!(provider = %config.cache.provider, "Initializing cache");
    let cache = Arc::new(CacheManager::new(&config.cache).await?);

    // ── Step 2: Build state ──────────────────────────────────────
    let addr = format!("{}:{}", config.server.host, config.server.port);
    let grace = Duration::from_secs(config.server.shutdown_grace_seconds);
    let cleanup_every =
        Duration::from_secs(config.content.token_cleanup_interval_minutes.max(1) * 60);
    let state = build_state(config, db_pool, cache)?;

    // ── Step 3: Shutdown channel & maintenance task ──────────────
    let (shutdown_tx, shutdown_rx) = watch::channel(false);
    let maintenance = tokio::spawn(run_maintenance(state.clone(), cleanup_every, shutdown_rx));

    // ── Step 4: Build and start HTTP server ──────────────────────
    let app = build_app(state);
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .map_err(|e| AppError::internal(format!("Failed to bind {addr}: {e}")))?;

    tracing::info!("CyberShare server listening on {}", addr);

    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .with_graceful_shutdown(async move {
        shutdown_signal().await;
        let _ = shutdown_tx.send(true);
    })
    .await
    .map_err(|e| AppError::internal(format!("Server error: {e}")))?;

    if tokio::time::timeout(grace, maintenance).await.is_err() {
        tracing::warn!("Maintenance task did not stop within the grace period");
    }

    tracing::info!("CyberShare server stopped");
    Ok(())
}

/// Periodically purges expired refresh and reset tokens and idle rate-limit buckets.
async fn run_maintenance(state: AppState, every: Duration, mut shutdown: watch::Receiver<bool>) {
    let mut ticker = tokio::time::interval(every);
    loop {
        tokio::select! {
            _ = ticker.tick() => {}
            _ = shutdown.changed() => break,
        }

        match state.auth_service.cleanup_expired().await {
            Ok(removed) if removed > 0 => {
                tracing::info!(removed, "Expired refresh tokens purged")
            }
            Ok(_) => {}
            Err(e) => tracing::warn!(error = %e, "Refresh token cleanup failed"),
        }
        match state.password_service.cleanup_expired().await {
            Ok(removed) if removed > 0 => {
                tracing::info!(removed, "Expired password reset tokens purged")
            }
            Ok(_) => {}
            Err(e) => tracing::warn!(error = %e, "Password reset token cleanup failed"),
        }
        state.rate_limiter.prune(RATE_LIMIT_IDLE).await;
    }
    tracing::debug!("Maintenance task stopped");
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!(error = %e, "Failed to install Ctrl+C handler");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                tracing::error!(error = %e, "Failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    tracing::info!("Shutdown signal received");
}
