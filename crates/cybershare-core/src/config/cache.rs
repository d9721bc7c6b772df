//! Cache configuration.

use std::time::Duration;

use serde::{Deserialize, Serialize};

/// `[cache]`: backend selection plus per-entry lifetimes.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CacheConfig {
    /// `"memory"` or `"redis"`.
    #[serde(default = "default_provider")]
    pub provider: String,
    /// Lifetime for entries written with `set_default`.
    #[serde(default = "default_ttl")]
    pub default_ttl_seconds: u64,
    #[serde(default)]
    pub ttl: CacheTtlConfig,
    #[serde(default)]
    pub redis: RedisCacheConfig,
    #[serde(default)]
    pub memory: MemoryCacheConfig,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            provider: default_provider(),
            default_ttl_seconds: default_ttl(),
            ttl: CacheTtlConfig::default(),
            redis: RedisCacheConfig::default(),
            memory: MemoryCacheConfig::default(),
        }
    }
}

/// `[cache.ttl]`: how long each cached view may be served stale.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CacheTtlConfig {
    /// Per-user unread notification counts.
    #[serde(default = "default_unread_count_ttl")]
    pub unread_count_seconds: u64,
    /// Category listings and tag rankings.
    #[serde(default = "default_taxonomy_ttl")]
    pub taxonomy_seconds: u64,
}

impl CacheTtlConfig {
    pub fn unread_count(&self) -> Duration {
        Duration::from_secs(self.unread_count_seconds)
    }

    pub fn taxonomy(&self) -> Duration {
        Duration::from_secs(self.taxonomy_seconds)
    }
}

impl Default for CacheTtlConfig {
    fn default() -> Self {
        Self {
            unread_count_seconds: default_unread_count_ttl(),
            taxonomy_seconds: default_taxonomy_ttl(),
        }
    }
}

/// `[cache.redis]`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RedisCacheConfig {
    #[serde(default = "default_redis_url")]
    pub url: String,
    /// Prepended to every key so several deployments can share one server.
    #[serde(default = "default_key_prefix")]
    pub key_prefix: String,
}

impl Default for RedisCacheConfig {
    fn default() -> Self {
        Self {
            url: default_redis_url(),
            key_prefix: default_key_prefix(),
        }
    }
}

/// `[cache.memory]`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MemoryCacheConfig {
    #[serde(default = "default_max_capacity")]
    pub max_capacity: u64,
}

impl Default for MemoryCacheConfig {
    fn default() -> Self {
        Self {
            max_capacity: default_max_capacity(),
        }
    }
}

fn default_provider() -> String {
    "memory".to_string()
}

fn default_ttl() -> u64 {
    300
}

fn default_unread_count_ttl() -> u64 {
    300
}

fn default_taxonomy_ttl() -> u64 {
    600
}

fn default_redis_url() -> String {
    "redis://localhost:6379".to_string()
}

fn default_key_prefix() -> String {
    "cybershare:".to_string()
}

fn default_max_capacity() -> u64 {
    50_000
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_ttl_section_uses_defaults() {
        let config: CacheConfig = serde_json::from_str(r#"{"provider":"redis"}"#).unwrap();
        assert_eq!(config.provider, "redis");
        assert_eq!(config.ttl.unread_count(), Duration::from_secs(300));
        assert_eq!(config.ttl.taxonomy(), Duration::from_secs(600));
    }
}
