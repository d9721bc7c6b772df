//! Moderation and platform administration.

pub mod service;

pub use service::AdminService;
