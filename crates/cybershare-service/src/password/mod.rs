//! Password change and reset flows.

pub mod service;

pub use service::PasswordService;
