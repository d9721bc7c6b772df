//! Follows, likes, bookmarks and views.

pub mod follow;
pub mod interaction;

pub use follow::{Follow, FollowStats};
pub use interaction::{Bookmark, InteractionStatus, Like, PostView};
