//! Token bucket rate limiter middleware.

use std::collections::HashMap;
use std::time::{Duration, Instant};

use axum::extract::{Request, State};
use axum::middleware::Next;
use axum::response::Response;
use tokio::sync::Mutex;

use cybershare_core::config::RateLimitConfig;
use cybershare_core::error::AppError;

use crate::error::ApiError;
use crate::extractors::client_ip;
use crate::state::AppState;

/// Simple in-memory token bucket rate limiter keyed by client IP.
#[derive(Debug)]
pub struct RateLimiter {
    /// IP → bucket state.
    buckets: Mutex<HashMap<String, TokenBucket>>,
    /// Maximum tokens per bucket.
    max_tokens: u32,
    /// Token refill rate per second.
    refill_rate: f64,
    enabled: bool,
}

#[derive(Debug, Clone)]
struct TokenBucket {
    tokens: f64,
    last_refill: Instant,
}

impl RateLimiter {
    /// Creates a new rate limiter.
    pub fn new(max_tokens: u32, refill_rate: f64) -> Self {
        Self {
            buckets: Mutex::new(HashMap::new()),
            max_tokens,
            refill_rate,
            enabled: true,
        }
    }

    /// Creates a limiter from configuration.
    pub fn from_config(config: &RateLimitConfig) -> Self {
        Self {
            enabled: config.enabled,
            ..Self::new(config.burst, config.refill_per_second)
        }
    }

    /// Attempts to consume a token for the given key.
    pub async fn check(&self, key: &str) -> bool {
        if !self.enabled {
            return true;
        }

        let mut buckets = self.buckets.lock().await;
        let now = Instant::now();

        let bucket = buckets.entry(key.to_string()).or_insert(TokenBucket {
            tokens: self.max_tokens as f64,
            last_refill: now,
        });

        // Refill tokens
        let elapsed = now.duration_since(bucket.last_refill).as_secs_f64();
        bucket.tokens = (bucket.tokens + elapsed * self.refill_rate).min(self.max_tokens as f64);
        bucket.last_refill = now;

        // Try to consume
        if bucket.tokens >= 1.0 {
            bucket.tokens -= 1.0;
            true
        } else {
            false
        }
    }

    /// Drops buckets untouched for longer than `idle`. Returns how many were removed.
    pub async fn prune(&self, idle: Duration) -> usize {
        let mut buckets = self.buckets.lock().await;
        let before = buckets.len();
        let now = Instant::now();
        buckets.retain(|_, bucket| now.duration_since(bucket.last_refill) < idle);
        before - buckets.len()
    }
}

/// Route layer applying the shared limiter to the current client.
pub async fn limit_by_ip(
    State(state): State<AppState>,
    request: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let key = client_ip::resolve(
        request.headers(),
        request.extensions(),
        &state.config.server.trusted_proxies,
    )
    .map_or_else(|| "unknown".to_string(), |ip| ip.to_string());

    if !state.rate_limiter.check(&key).await {
        tracing::warn!(client_ip = %key, path = %request.uri().path(), "Rate limit exceeded");
        return Err(AppError::rate_limited("Too many requests, please try again later").into());
    }

    Ok(next.run(request).await)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_bucket_exhausts() {
        let limiter = RateLimiter::new(2, 0.0);
        assert!(limiter.check("1.1.1.1").await);
        assert!(limiter.check("1.1.1.1").await);
        assert!(!limiter.check("1.1.1.1").await);
        assert!(limiter.check("2.2.2.2").await);
    }

    #[tokio::test]
    async fn test_disabled_always_allows() {
        let config = RateLimitConfig {
            enabled: false,
            burst: 1,
            refill_per_second: 0.0,
        };
        let limiter = RateLimiter::from_config(&config);
        for _ in 0..5 {
            assert!(limiter.check("k").await);
        }
    }

    #[tokio::test]
    async fn test_prune_removes_idle_buckets() {
        let limiter = RateLimiter::new(5, 1.0);
        limiter.check("a").await;
        assert_eq!(limiter.prune(Duration::ZERO).await, 1);
        assert_eq!(limiter.prune(Duration::ZERO).await, 0);
    }
}
