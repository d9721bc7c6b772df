//! Registration, sign-in and token lifecycle.

pub mod service;
pub mod username;

pub use service::{AuthResponse, AuthService, LoginInput, RegisterInput};
