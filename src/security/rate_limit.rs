//! Per-client rate limiting for the public write endpoints.

use std::collections::HashMap;
use std::net::SocketAddr;
use std::sync::{Arc, Mutex};
use std::time::Instant;

use axum::{
    body::Body,
    extract::{ConnectInfo, State},
    http::Request,
    middleware::Next,
    response::{IntoResponse, Response},
};

use crate::config::SecurityConfig;
use crate::http::response::ApiError;
use crate::observability::metrics;

/// A simple token bucket rate limiter.
struct TokenBucket {
    tokens: f64,
    last_update: Instant,
}

impl TokenBucket {
    fn new(capacity: f64) -> Self {
        Self {
            tokens: capacity,
            last_update: Instant::now(),
        }
    }

    fn try_acquire(&mut self, capacity: f64, refill_rate: f64) -> bool {
        let now = Instant::now();
        let elapsed = now.duration_since(self.last_update).as_secs_f64();

        self.tokens = (self.tokens + elapsed * refill_rate).min(capacity);
        self.last_update = now;

        if self.tokens >= 1.0 {
            self.tokens -= 1.0;
            true
        } else {
            false
        }
    }
}

/// Buckets keyed by client IP, shared by every route the limiter guards.
pub struct RateLimiter {
    buckets: Mutex<HashMap<String, TokenBucket>>,
    scope: &'static str,
    rps: f64,
    burst: f64,
}

impl RateLimiter {
    pub fn new(scope: &'static str, rps: u32, burst: u32) -> Self {
        Self {
            buckets: Mutex::new(HashMap::new()),
            scope,
            rps: rps as f64,
            burst: burst.max(1) as f64,
        }
    }

    pub fn from_config(scope: &'static str, config: &SecurityConfig) -> Self {
        Self::new(scope, config.rate_limit_per_second, config.rate_limit_burst)
    }

    /// Take one token for `key`; false when the client is over its limit.
    pub fn check(&self, key: &str) -> bool {
        // A poisoned lock only means another request panicked mid-update;
        // the buckets are still usable.
        let mut buckets = self
            .buckets
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        let bucket = buckets
            .entry(key.to_string())
            .or_insert_with(|| TokenBucket::new(self.burst));

        bucket.try_acquire(self.burst, self.rps)
    }
}

/// Middleware rejecting clients over their limit with 429.
pub async fn rate_limit_middleware(
    State(limiter): State<Arc<RateLimiter>>,
    request: Request<Body>,
    next: Next,
) -> Response {
    let key = request
        .extensions()
        .get::<ConnectInfo<SocketAddr>>()
        .map(|ConnectInfo(addr)| addr.ip().to_string())
        .unwrap_or_else(|| "unknown".to_string());

    if limiter.check(&key) {
        next.run(request).await
    } else {
        tracing::warn!(client = %key, scope = limiter.scope, "Rate limit exceeded");
        metrics::record_rate_limited(limiter.scope);
        ApiError::RateLimited.into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_burst_then_reject() {
        let limiter = RateLimiter::new("contact", 0, 3);
        assert!(limiter.check("10.0.0.1"));
        assert!(limiter.check("10.0.0.1"));
        assert!(limiter.check("10.0.0.1"));
        assert!(!limiter.check("10.0.0.1"));
    }

    #[test]
    fn test_clients_are_independent() {
        let limiter = RateLimiter::new("contact", 0, 1);
        assert!(limiter.check("10.0.0.1"));
        assert!(!limiter.check("10.0.0.1"));
        assert!(limiter.check("10.0.0.2"));
    }

    #[test]
    fn test_zero_burst_still_admits_one() {
        let limiter = RateLimiter::new("login", 0, 0);
        assert!(limiter.check("10.0.0.1"));
    }
}
