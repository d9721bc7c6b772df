//! Follow relationships between users.

pub mod service;

pub use service::FollowService;
