//! Notification creation, delivery and read state.

pub mod message;
pub mod service;

pub use service::NotificationService;
