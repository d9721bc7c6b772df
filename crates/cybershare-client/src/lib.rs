//! # cybershare-client
//!
//! Client library for the CyberShare API: a typed [`ApiClient`], a
//! file-backed [`SessionStore`], optimistic interaction and follow state,
//! and comment threading.

pub mod client;
pub mod comments;
pub mod error;
pub mod models;
pub mod session;
pub mod state;

pub use client::ApiClient;
pub use comments::build_comment_tree;
pub use error::{ClientError, ClientResult};
pub use session::{Session, SessionStore};
pub use state::{FollowOutcome, FollowState, InteractionState};
