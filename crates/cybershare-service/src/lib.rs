//! # cybershare-service
//!
//! Business logic service layer for CyberShare. Each service orchestrates
//! repositories, the cache, auth primitives and the realtime hub to
//! implement one application use case family.
//!
//! Services follow constructor injection: all dependencies are provided
//! at construction time via `Arc` references.

pub mod admin;
pub mod auth;
pub mod comment;
pub mod context;
pub mod follow;
pub mod interaction;
pub mod mail;
pub mod media;
pub mod notification;
pub mod password;
pub mod post;
pub mod slug;
pub mod taxonomy;
pub mod text;
pub mod user;

pub use admin::AdminService;
pub use auth::AuthService;
pub use comment::CommentService;
pub use context::RequestContext;
pub use follow::FollowService;
pub use interaction::InteractionService;
pub use mail::{LogMailer, Mailer, SmtpMailer, build_mailer};
pub use media::{ImageKind, ImageStore, StoredImage};
pub use notification::NotificationService;
pub use password::PasswordService;
pub use post::PostService;
pub use taxonomy::{CategoryService, TagService};
pub use user::UserService;
