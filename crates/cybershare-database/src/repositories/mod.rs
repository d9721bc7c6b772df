//! Repository implementations for all CyberShare entities.

pub mod category;
pub mod comment;
pub mod follow;
pub mod interaction;
pub mod notification;
pub mod post;
pub mod stats;
pub mod tag;
pub mod token;
pub mod user;

pub use category::CategoryRepository;
pub use comment::CommentRepository;
pub use follow::FollowRepository;
pub use interaction::{InteractionRepository, ToggleOutcome};
pub use notification::NotificationRepository;
pub use post::{PostFilter, PostRepository};
pub use stats::{PlatformStatistics, StatsRepository};
pub use tag::TagRepository;
pub use token::{PasswordResetTokenRepository, RefreshTokenRepository};
pub use user::{UserFilter, UserRepository};

use cybershare_core::error::{AppError, ErrorKind};

/// Wrap a sqlx error into a database [`AppError`] with context.
pub(crate) fn db_error(context: &'static str) -> impl FnOnce(sqlx::Error) -> AppError {
    move |e| AppError::with_source(ErrorKind::Database, context, e)
}

/// Name of the violated unique constraint, if `err` is one.
pub(crate) fn unique_violation(err: &sqlx::Error) -> Option<&str> {
    match err {
        sqlx::Error::Database(db_err) if db_err.is_unique_violation() => db_err.constraint(),
        _ => None,
    }
}
