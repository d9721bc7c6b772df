//! Likes and bookmarks.

pub mod service;

pub use service::InteractionService;
