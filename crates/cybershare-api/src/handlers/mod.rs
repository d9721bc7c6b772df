//! Route handlers organized by domain.

pub mod admin;
pub mod auth;
pub mod category;
pub mod comment;
pub mod follow;
pub mod health;
pub mod interaction;
pub mod notification;
pub mod password;
pub mod post;
pub mod tag;
pub mod user;
pub mod ws;
