//! Profiles and user discovery.

pub mod service;

pub use service::{ProfileUpdate, UserService};
