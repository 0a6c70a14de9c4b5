//! In-memory rolling window rate limiting keyed by client address.
//!
//! Each limiter keeps the instants of recent requests per client and admits a
//! request while fewer than `max_requests` fall inside the window. State is
//! per process; counts reset on restart.
//!
//! Not built on `governor`: its GCRA refills one slot every window/N, which
//! cannot cap a client at N requests per rolling window.

use std::collections::HashMap;
use std::collections::VecDeque;
use std::net::SocketAddr;
use std::sync::Arc;
use std::sync::Mutex;
use std::sync::PoisonError;
use std::time::Duration;
use std::time::Instant;

use axum::extract::ConnectInfo;
use axum::extract::Request;
use axum::extract::State;
use axum::http::header;
use axum::http::HeaderMap;
use axum::http::HeaderName;
use axum::http::HeaderValue;
use axum::middleware::Next;
use axum::response::IntoResponse;
use axum::response::Response;

use super::handlers::ApiError;
use crate::config::WindowConfig;

const RATELIMIT_LIMIT: HeaderName = HeaderName::from_static("ratelimit-limit");
const RATELIMIT_REMAINING: HeaderName = HeaderName::from_static("ratelimit-remaining");
const RATELIMIT_RESET: HeaderName = HeaderName::from_static("ratelimit-reset");
const X_FORWARDED_FOR: HeaderName = HeaderName::from_static("x-forwarded-for");

/// Tracked clients above which idle entries are swept.
const PURGE_THRESHOLD: usize = 10_000;

pub const TOO_MANY_REQUESTS_MESSAGE: &str = "Too many requests, please try again later.";

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RateLimitDecision {
    Allowed {
        limit: u32,
        remaining: u32,
        reset_after: Duration,
    },
    Limited {
        limit: u32,
        retry_after: Duration,
    },
}

#[derive(Debug)]
pub struct SlidingWindowLimiter {
    max_requests: u32,
    window: Duration,
    hits: Mutex<HashMap<String, VecDeque<Instant>>>,
}

impl SlidingWindowLimiter {
    pub fn new(max_requests: u32, window: Duration) -> Self {
        Self {
            max_requests,
            window,
            hits: Mutex::new(HashMap::new()),
        }
    }

    pub fn from_config(config: WindowConfig) -> Self {
        Self::new(config.max_requests, config.window())
    }

    /// Record a request from `key` now.
    pub fn check(&self, key: &str) -> RateLimitDecision {
        self.check_at(key, Instant::now())
    }

    /// Record a request from `key` at `now`.
    ///
    /// Rejected requests are not recorded, so a client that keeps retrying
    /// regains access once its oldest admitted request leaves the window.
    pub fn check_at(&self, key: &str, now: Instant) -> RateLimitDecision {
        let mut hits = self.hits.lock().unwrap_or_else(PoisonError::into_inner);

        if hits.len() > PURGE_THRESHOLD {
            let window = self.window;
            hits.retain(|_, queue| {
                queue
                    .back()
                    .is_some_and(|last| now.saturating_duration_since(*last) < window)
            });
        }

        let queue = hits.entry(key.to_string()).or_default();
        while queue
            .front()
            .is_some_and(|first| now.saturating_duration_since(*first) >= self.window)
        {
            queue.pop_front();
        }

        let until_oldest_expires = |queue: &VecDeque<Instant>| {
            queue
                .front()
                .map(|first| self.window.saturating_sub(now.saturating_duration_since(*first)))
                .unwrap_or(self.window)
        };

        let used = u32::try_from(queue.len()).unwrap_or(u32::MAX);
        if used >= self.max_requests {
            return RateLimitDecision::Limited {
                limit: self.max_requests,
                retry_after: until_oldest_expires(queue),
            };
        }

        queue.push_back(now);

        RateLimitDecision::Allowed {
            limit: self.max_requests,
            remaining: self.max_requests - used - 1,
            reset_after: until_oldest_expires(queue),
        }
    }
}

/// Middleware state for one limiter.
#[derive(Clone, Debug)]
pub struct RateLimitState {
    pub limiter: Arc<SlidingWindowLimiter>,
    pub trust_proxy: bool,
}

impl RateLimitState {
    pub fn new(config: WindowConfig, trust_proxy: bool) -> Self {
        Self {
            limiter: Arc::new(SlidingWindowLimiter::from_config(config)),
            trust_proxy,
        }
    }
}

/// Middleware that applies the limiter to every request it wraps.
///
/// Admitted responses carry `RateLimit-*` headers. When limiters are stacked,
/// the innermost one's headers are kept.
pub async fn enforce(State(state): State<RateLimitState>, req: Request, next: Next) -> Response {
    let key = client_key(&req, state.trust_proxy);

    match state.limiter.check(&key) {
        RateLimitDecision::Allowed {
            limit,
            remaining,
            reset_after,
        } => {
            let mut response = next.run(req).await;
            let headers = response.headers_mut();
            headers
                .entry(RATELIMIT_LIMIT)
                .or_insert(HeaderValue::from(limit));
            headers
                .entry(RATELIMIT_REMAINING)
                .or_insert(HeaderValue::from(remaining));
            headers
                .entry(RATELIMIT_RESET)
                .or_insert(HeaderValue::from(whole_seconds(reset_after)));
            response
        }
        RateLimitDecision::Limited { limit, retry_after } => {
            tracing::warn!(client = %key, uri = %req.uri(), "Rate limit exceeded");

            let seconds = whole_seconds(retry_after);
            let mut response =
                ApiError::TooManyRequests(TOO_MANY_REQUESTS_MESSAGE.to_string()).into_response();
            let headers = response.headers_mut();
            headers.insert(header::RETRY_AFTER, HeaderValue::from(seconds));
            headers.insert(RATELIMIT_LIMIT, HeaderValue::from(limit));
            headers.insert(RATELIMIT_REMAINING, HeaderValue::from(0u32));
            headers.insert(RATELIMIT_RESET, HeaderValue::from(seconds));
            response
        }
    }
}

/// Identify the client: the peer address, or the first `X-Forwarded-For`
/// hop when the service runs behind a trusted proxy.
pub fn client_key(req: &Request, trust_proxy: bool) -> String {
    if trust_proxy {
        if let Some(forwarded) = forwarded_for(req.headers()) {
            return forwarded;
        }
    }

    req.extensions()
        .get::<ConnectInfo<SocketAddr>>()
        .map(|ConnectInfo(addr)| addr.ip().to_string())
        .unwrap_or_else(|| "unknown".to_string())
}

fn forwarded_for(headers: &HeaderMap) -> Option<String> {
    headers
        .get(X_FORWARDED_FOR)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.split(',').next())
        .map(str::trim)
        .filter(|hop| !hop.is_empty())
        .map(str::to_string)
}

/// Round up so clients never retry early.
fn whole_seconds(duration: Duration) -> u64 {
    let seconds = duration.as_secs();
    if duration.subsec_nanos() > 0 {
        seconds + 1
    } else {
        seconds.max(1)
    }
}
