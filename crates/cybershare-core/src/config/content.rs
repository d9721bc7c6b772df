//! Content and community configuration.

use serde::{Deserialize, Serialize};

/// Rules for posts, discovery and account recovery.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ContentConfig {
    /// Public URL of the web frontend, used to build reset links.
    #[serde(default = "default_frontend_url")]
    pub frontend_url: String,
    /// Lifetime of a password reset token in hours.
    #[serde(default = "default_reset_ttl")]
    pub password_reset_ttl_hours: i64,
    /// Default trending window in days.
    #[serde(default = "default_trending_window")]
    pub trending_window_days: i64,
    /// Maximum number of tags returned by tag search.
    #[serde(default = "default_tag_search_limit")]
    pub tag_search_limit: i64,
    /// Interval between expired token sweeps, in minutes.
    #[serde(default = "default_cleanup_interval")]
    pub token_cleanup_interval_minutes: u64,
}

impl Default for ContentConfig {
    fn default() -> Self {
        Self {
            frontend_url: default_frontend_url(),
            password_reset_ttl_hours: default_reset_ttl(),
            trending_window_days: default_trending_window(),
            tag_search_limit: default_tag_search_limit(),
            token_cleanup_interval_minutes: default_cleanup_interval(),
        }
    }
}

fn default_frontend_url() -> String {
    "http://localhost:5173".to_string()
}

fn default_reset_ttl() -> i64 {
    24
}

fn default_trending_window() -> i64 {
    7
}

fn default_tag_search_limit() -> i64 {
    20
}

fn default_cleanup_interval() -> u64 {
    60
}
