//! Rate limiting middleware using Governor.
//!
//! Implements per-client rate limiting with a keyed token bucket. Behind
//! `n` trusted proxies the client is the `n`-th `X-Forwarded-For` entry
//! from the right, the one the outermost trusted proxy appended; with no
//! trusted proxy it is the peer address of the connection. Entries left of
//! that point are client-supplied and ignored.

use std::net::SocketAddr;
use std::num::NonZeroU32;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use axum::{
    Json,
    body::Body,
    extract::{ConnectInfo, State},
    http::{Request, StatusCode},
    middleware::Next,
    response::{IntoResponse, Response},
};
use governor::{DefaultKeyedRateLimiter, Quota, RateLimiter};
use serde_json::json;

/// Requests per minute when nothing else is configured.
pub const DEFAULT_REQUESTS_PER_MINUTE: NonZeroU32 = NonZeroU32::new(100).unwrap();

/// Idle clients are dropped once every this many checks.
const PRUNE_EVERY: u64 = 1024;

/// Rate limiter state shared across requests.
pub struct RateLimiterState {
    limiter: DefaultKeyedRateLimiter<String>,
    trusted_proxy_hops: usize,
    checks: AtomicU64,
}

impl Default for RateLimiterState {
    fn default() -> Self {
        Self::per_minute(DEFAULT_REQUESTS_PER_MINUTE)
    }
}

impl RateLimiterState {
    /// Allows a burst of `requests`, refilled evenly over a minute.
    pub fn per_minute(requests: NonZeroU32) -> Self {
        Self {
            limiter: RateLimiter::dashmap(Quota::per_minute(requests)),
            trusted_proxy_hops: 0,
            checks: AtomicU64::new(0),
        }
    }

    /// Number of reverse proxies in front of the API whose
    /// `X-Forwarded-For` entries can be trusted.
    pub fn with_trusted_proxy_hops(mut self, hops: usize) -> Self {
        self.trusted_proxy_hops = hops;
        self
    }

    /// Checks if a request should be rate limited.
    /// Returns true if the request is allowed, false if rate limited.
    pub fn check(&self, key: &str) -> bool {
        if self.checks.fetch_add(1, Ordering::Relaxed) % PRUNE_EVERY == PRUNE_EVERY - 1 {
            self.prune();
        }
        self.limiter.check_key(&key.to_string()).is_ok()
    }

    /// Forgets clients whose bucket has refilled completely.
    pub fn prune(&self) {
        self.limiter.retain_recent();
        self.limiter.shrink_to_fit();
    }

    /// Number of clients currently tracked.
    pub fn tracked_clients(&self) -> usize {
        self.limiter.len()
    }

    fn client_key(&self, request: &Request<Body>) -> String {
        if self.trusted_proxy_hops > 0 {
            if let Some(key) = forwarded_client(request, self.trusted_proxy_hops) {
                return key;
            }
        }

        request
            .extensions()
            .get::<ConnectInfo<SocketAddr>>()
            .map(|ConnectInfo(addr)| addr.ip().to_string())
            .unwrap_or_else(|| "anonymous".to_string())
    }
}

fn forwarded_client(request: &Request<Body>, hops: usize) -> Option<String> {
    let header = request.headers().get("X-Forwarded-For")?.to_str().ok()?;
    let entries: Vec<&str> = header
        .split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .collect();
    let index = entries.len().checked_sub(hops)?;
    entries.get(index).map(|s| s.to_string())
}

/// Rate limiting middleware.
pub async fn rate_limit_middleware(
    State(limiter): State<Arc<RateLimiterState>>,
    request: Request<Body>,
    next: Next,
) -> Response {
    // Skip rate limiting for health endpoint
    if request.uri().path() == "/health" {
        return next.run(request).await;
    }

    let key = limiter.client_key(&request);
    if !limiter.check(&key) {
        tracing::warn!(client = %key, "Rate limit exceeded");
        return (
            StatusCode::TOO_MANY_REQUESTS,
            Json(json!({
                "error": "Rate limit exceeded. Please try again later.",
                "code": 429
            })),
        )
            .into_response();
    }

    next.run(request).await
}
