//! Login rate limiting.
//!
//! Each client address gets its own token bucket for the login endpoint.

use axum::{
    body::Body,
    extract::ConnectInfo,
    http::Request,
    middleware::Next,
    response::{IntoResponse, Response},
};
use governor::{DefaultKeyedRateLimiter, Quota, RateLimiter};
use std::{
    net::SocketAddr,
    num::NonZeroU32,
    sync::{
        atomic::{AtomicU64, Ordering},
        Arc,
    },
};

use crate::web::error::{ApiError, ErrorCode};

/// Checks between sweeps of idle buckets.
const SWEEP_INTERVAL: u64 = 1024;

/// State for login rate limiting.
pub struct LoginRateLimit {
    limiter: DefaultKeyedRateLimiter<String>,
    trust_forwarded_for: bool,
    checks: AtomicU64,
}

impl LoginRateLimit {
    /// Allow `per_minute` login attempts per client address.
    ///
    /// With `trust_forwarded_for` set the address comes from the last
    /// `X-Forwarded-For` entry, which only a reverse proxy in front of the
    /// server can vouch for. Otherwise the header is ignored.
    pub fn new(per_minute: u32, trust_forwarded_for: bool) -> Self {
        let per_minute = NonZeroU32::new(per_minute).unwrap_or(NonZeroU32::MIN);
        Self {
            limiter: RateLimiter::keyed(Quota::per_minute(per_minute)),
            trust_forwarded_for,
            checks: AtomicU64::new(0),
        }
    }

    /// Record an attempt from `ip`; false once the quota is spent.
    pub fn check(&self, ip: &str) -> bool {
        if self.checks.fetch_add(1, Ordering::Relaxed) % SWEEP_INTERVAL == SWEEP_INTERVAL - 1 {
            self.limiter.retain_recent();
            self.limiter.shrink_to_fit();
        }
        self.limiter.check_key(&ip.to_string()).is_ok()
    }

    /// Number of addresses currently holding a bucket.
    pub fn tracked(&self) -> usize {
        self.limiter.len()
    }

    /// Extract the client address from a request.
    fn client_ip(&self, req: &Request<Body>) -> String {
        if self.trust_forwarded_for {
            // The nearest proxy appends the peer it saw.
            if let Some(ip) = req
                .headers()
                .get("X-Forwarded-For")
                .and_then(|v| v.to_str().ok())
                .and_then(|v| v.rsplit(',').next())
                .map(str::trim)
                .filter(|ip| !ip.is_empty())
            {
                return ip.to_string();
            }
        }

        if let Some(ConnectInfo(addr)) = req.extensions().get::<ConnectInfo<SocketAddr>>() {
            return addr.ip().to_string();
        }

        "unknown".to_string()
    }
}

/// Rate limiting middleware for the login endpoint.
pub async fn login_rate_limit(
    state: Arc<LoginRateLimit>,
    req: Request<Body>,
    next: Next,
) -> Response {
    let ip = state.client_ip(&req);

    if !state.check(&ip) {
        tracing::warn!(ip = %ip, "login rate limit exceeded");
        return ApiError::new(
            ErrorCode::TooManyRequests,
            "Too many login attempts. Please try again later.",
        )
        .into_response();
    }

    next.run(req).await
}
