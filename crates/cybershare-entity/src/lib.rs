//! # cybershare-entity
//!
//! Domain entity models for CyberShare. Every struct in this crate
//! represents a database row or a domain value object. Database rows
//! derive `sqlx::FromRow`; enums map onto PostgreSQL enum types.

pub mod comment;
pub mod notification;
pub mod post;
pub mod social;
pub mod taxonomy;
pub mod token;
pub mod user;
