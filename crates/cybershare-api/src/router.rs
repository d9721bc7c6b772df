//! Route definitions for the CyberShare HTTP API.
//!
//! All routes are organized by domain and mounted under `/api`.
//! The router receives `AppState` and passes it to all handlers via Axum's `State` extractor.

use axum::{
    Router,
    extract::DefaultBodyLimit,
    middleware as axum_middleware,
    routing::{get, post, put},
};
use tower_http::compression::CompressionLayer;
use tower_http::services::ServeDir;
use tower_http::trace::TraceLayer;

use crate::handlers;
use crate::middleware;
use crate::middleware::cors::build_cors_layer;
use crate::state::AppState;

/// Build the complete Axum router with all routes and middleware.
///
/// Receives the fully-constructed `AppState` and threads it through
/// every route via `.with_state(state)`.
pub fn build_router(state: AppState) -> Router {
    let body_limit = state.config.server.body_limit_bytes;
    let uploads = ServeDir::new(state.image_store.root());
    let cors = build_cors_layer(&state.config.server.cors);

    let api_routes = Router::new()
        .merge(auth_routes(&state))
        .merge(post_routes())
        .merge(comment_routes())
        .merge(interaction_routes())
        .merge(follow_routes())
        .merge(notification_routes())
        .merge(user_routes())
        .merge(upload_routes(&state))
        .merge(taxonomy_routes())
        .merge(admin_routes(&state))
        .merge(health_routes())
        .route("/ws", get(handlers::ws::ws_handler));

    Router::new()
        .nest("/api", api_routes)
        .nest_service("/uploads", uploads)
        .layer(DefaultBodyLimit::max(body_limit))
        .layer(CompressionLayer::new())
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .layer(axum_middleware::from_fn(
            middleware::logging::request_logging,
        ))
        .with_state(state)
}

/// Auth and password endpoints, rate limited per client IP.
fn auth_routes(state: &AppState) -> Router<AppState> {
    Router::new()
        .route("/auth/register", post(handlers::auth::register))
        .route("/auth/login", post(handlers::auth::login))
        .route("/auth/refresh", post(handlers::auth::refresh))
        .route("/auth/logout", post(handlers::auth::logout))
        .route("/password/change", post(handlers::password::change))
        .route("/password/forgot", post(handlers::password::forgot))
        .route("/password/reset", post(handlers::password::reset))
        .route(
            "/password/reset/validate",
            get(handlers::password::validate_token),
        )
        .route_layer(axum_middleware::from_fn_with_state(
            state.clone(),
            middleware::rate_limit::limit_by_ip,
        ))
}

/// Post authoring and discovery
fn post_routes() -> Router<AppState> {
    Router::new()
        .route(
            "/posts",
            get(handlers::post::list).post(handlers::post::create),
        )
        .route("/posts/my-posts", get(handlers::post::my_posts))
        .route("/posts/search", get(handlers::post::search))
        .route("/posts/trending", get(handlers::post::trending))
        .route("/posts/feed", get(handlers::post::feed))
        .route("/posts/slug/{slug}", get(handlers::post::get_by_slug))
        .route(
            "/posts/{id}",
            get(handlers::post::get)
                .patch(handlers::post::update)
                .delete(handlers::post::delete),
        )
        .route("/posts/{id}/view", post(handlers::post::record_view))
        .route("/posts/{id}/similar", get(handlers::post::similar))
        .route("/me/bookmarks", get(handlers::post::my_bookmarks))
}

/// Comment tree and comment CRUD
fn comment_routes() -> Router<AppState> {
    Router::new()
        .route(
            "/posts/{id}/comments",
            get(handlers::comment::tree).post(handlers::comment::create),
        )
        .route(
            "/comments/{id}",
            axum::routing::patch(handlers::comment::update).delete(handlers::comment::delete),
        )
}

/// Likes, bookmarks and interaction status
fn interaction_routes() -> Router<AppState> {
    Router::new()
        .route("/posts/{id}/like", post(handlers::interaction::toggle_like))
        .route(
            "/posts/{id}/bookmark",
            post(handlers::interaction::toggle_bookmark),
        )
        .route("/posts/{id}/status", get(handlers::interaction::status))
}

/// Follow graph
fn follow_routes() -> Router<AppState> {
    Router::new()
        .route(
            "/follows/{username}",
            post(handlers::follow::follow).delete(handlers::follow::unfollow),
        )
        .route("/follows/{username}/check", get(handlers::follow::check))
        .route(
            "/users/{username}/followers",
            get(handlers::follow::followers),
        )
        .route(
            "/users/{username}/following",
            get(handlers::follow::following),
        )
        .route(
            "/users/{username}/follow-stats",
            get(handlers::follow::stats),
        )
}

/// Notification endpoints
fn notification_routes() -> Router<AppState> {
    Router::new()
        .route("/notifications", get(handlers::notification::list))
        .route(
            "/notifications/unread-count",
            get(handlers::notification::unread_count),
        )
        .route(
            "/notifications/{id}/read",
            post(handlers::notification::mark_read),
        )
        .route(
            "/notifications/read-all",
            post(handlers::notification::mark_all_read),
        )
}

/// Profiles and user discovery
fn user_routes() -> Router<AppState> {
    Router::new()
        .route(
            "/users/me",
            get(handlers::user::me).patch(handlers::user::update_me),
        )
        .route("/users/top-authors", get(handlers::user::top_authors))
        .route("/users/search", get(handlers::user::search))
        .route("/users/{username}", get(handlers::user::get_by_username))
}

/// Multipart image uploads, with their own body limit
fn upload_routes(state: &AppState) -> Router<AppState> {
    Router::new()
        .route("/posts/upload-image", post(handlers::post::upload_image))
        .route("/users/me/avatar", post(handlers::user::upload_avatar))
        .route_layer(DefaultBodyLimit::max(multipart_limit(
            state.image_store.max_bytes(),
        )))
}

/// Room for the multipart envelope around one image.
fn multipart_limit(max_image_bytes: usize) -> usize {
    max_image_bytes.saturating_add(64 * 1024)
}

/// Public taxonomy reads; writes check the admin role in the handler
fn taxonomy_routes() -> Router<AppState> {
    Router::new()
        .route(
            "/categories",
            get(handlers::category::list).post(handlers::category::create),
        )
        .route("/categories/top", get(handlers::category::top))
        .route(
            "/categories/slug/{slug}",
            get(handlers::category::get_by_slug),
        )
        .route(
            "/categories/{id}",
            get(handlers::category::get)
                .put(handlers::category::update)
                .delete(handlers::category::delete),
        )
        .route(
            "/tags",
            get(handlers::tag::search).post(handlers::tag::create),
        )
        .route("/tags/top", get(handlers::tag::top))
        .route(
            "/tags/{id}",
            put(handlers::tag::update).delete(handlers::tag::delete),
        )
}

/// Admin console (admin only)
fn admin_routes(state: &AppState) -> Router<AppState> {
    Router::new()
        .route("/admin/statistics", get(handlers::admin::statistics))
        .route("/admin/users", get(handlers::admin::users))
        .route(
            "/admin/users/{id}/status",
            put(handlers::admin::set_user_status),
        )
        .route("/admin/users/{id}/role", put(handlers::admin::set_user_role))
        .route("/admin/posts", get(handlers::admin::posts))
        .route("/admin/posts/pending", get(handlers::admin::pending))
        .route("/admin/posts/{id}/approve", put(handlers::admin::approve))
        .route("/admin/posts/{id}/reject", put(handlers::admin::reject))
        .route("/admin/posts/{id}/hide", put(handlers::admin::hide))
        .route(
            "/admin/posts/{id}",
            axum::routing::delete(handlers::admin::delete_post),
        )
        .route("/admin/categories", post(handlers::category::create))
        .route(
            "/admin/categories/{id}",
            put(handlers::category::update).delete(handlers::category::delete),
        )
        .route("/admin/tags", post(handlers::tag::create))
        .route(
            "/admin/tags/{id}",
            put(handlers::tag::update).delete(handlers::tag::delete),
        )
        .route_layer(axum_middleware::from_fn_with_state(
            state.clone(),
            middleware::rbac::admin_only,
        ))
}

/// Health and application info
fn health_routes() -> Router<AppState> {
    Router::new()
        .route("/health", get(handlers::health::health))
        .route("/info", get(handlers::health::info))
}
