//! Response DTOs.
//!
//! Most endpoints serialize entity or service types directly; the small
//! envelopes below cover the remaining shapes.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Plain acknowledgement.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MessageResponse {
    pub message: String,
}

impl MessageResponse {
    /// Creates a message response.
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

/// Reset-token validity.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TokenValidityResponse {
    pub valid: bool,
}

/// Whether the caller follows a user.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FollowCheckResponse {
    pub is_following: bool,
}

/// A single count.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CountResponse {
    pub count: i64,
}

/// Post view counter after recording a view.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ViewCountResponse {
    pub views: i64,
}

/// Where an uploaded post image can be fetched.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ImageUploadResponse {
    pub file_name: String,
    pub file_url: String,
}

/// New avatar location.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AvatarUploadResponse {
    pub avatar_url: String,
    pub message: String,
}

/// Number of rows affected by a bulk operation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AffectedResponse {
    pub affected: u64,
}

/// Health check response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub timestamp: DateTime<Utc>,
}

/// Application metadata.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InfoResponse {
    pub name: String,
    pub version: String,
    pub description: String,
}
