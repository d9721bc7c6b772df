//! Data Transfer Objects for API request and response bodies.

pub mod request;
pub mod response;
