//! Fixed-window rate limiting per client.
//!
//! Client identity is the authenticated user when there is one, otherwise the
//! first `X-Forwarded-For` address, otherwise the peer address.
//!
//! Windows are tracked in an LRU of bounded capacity, so identity churn
//! evicts the least recently seen clients instead of growing without bound.
//! Expired windows are reset when their client shows up again, and expired
//! entries at the cold end of the LRU are pruned on every check.

use std::{
    net::SocketAddr,
    num::NonZeroUsize,
    sync::{Arc, Mutex},
    time::{Duration, Instant},
};

use axum::{
    extract::{ConnectInfo, Request, State},
    middleware::Next,
    response::Response,
};
use lru::LruCache;

use super::auth::AuthUser;
use crate::error::AppError;

/// Outcome of a rate-limit check
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RateLimitDecision {
    Allowed { remaining: u32 },
    Limited { retry_after: Duration },
}

/// Storage behind the limiter
pub trait RateLimitStore: Send + Sync {
    /// Counts one request for `client_id` at `now`
    fn check(&self, client_id: &str, now: Instant) -> RateLimitDecision;
}

#[derive(Debug, Clone, Copy)]
struct Window {
    count: u32,
    reset_at: Instant,
}

/// In-process store backed by a bounded LRU
pub struct LruRateLimitStore {
    max_requests: u32,
    window: Duration,
    windows: Mutex<LruCache<String, Window>>,
}

impl LruRateLimitStore {
    pub fn new(max_requests: u32, window: Duration, capacity: usize) -> Self {
        let capacity = NonZeroUsize::new(capacity).unwrap_or(NonZeroUsize::MIN);
        Self {
            max_requests,
            window,
            windows: Mutex::new(LruCache::new(capacity)),
        }
    }

    pub fn tracked_clients(&self) -> usize {
        self.windows.lock().unwrap_or_else(|e| e.into_inner()).len()
    }
}

impl RateLimitStore for LruRateLimitStore {
    fn check(&self, client_id: &str, now: Instant) -> RateLimitDecision {
        let mut windows = self.windows.lock().unwrap_or_else(|e| e.into_inner());

        while windows
            .peek_lru()
            .is_some_and(|(_, window)| window.reset_at <= now)
        {
            windows.pop_lru();
        }

        match windows.get_mut(client_id) {
            Some(window) if window.reset_at > now => {
                if window.count >= self.max_requests {
                    return RateLimitDecision::Limited {
                        retry_after: window.reset_at - now,
                    };
                }
                window.count += 1;
                RateLimitDecision::Allowed {
                    remaining: self.max_requests - window.count,
                }
            }
            _ => {
                windows.put(
                    client_id.to_string(),
                    Window {
                        count: 1,
                        reset_at: now + self.window,
                    },
                );
                RateLimitDecision::Allowed {
                    remaining: self.max_requests.saturating_sub(1),
                }
            }
        }
    }
}

/// Shared limiter handle used as middleware state
#[derive(Clone)]
pub struct RateLimiter {
    store: Arc<dyn RateLimitStore>,
}

impl RateLimiter {
    pub fn new(store: Arc<dyn RateLimitStore>) -> Self {
        Self { store }
    }

    pub fn check(&self, client_id: &str) -> RateLimitDecision {
        self.store.check(client_id, Instant::now())
    }
}

fn client_id(request: &Request) -> String {
    if let Some(user) = request.extensions().get::<AuthUser>() {
        return format!("user:{}", user.id());
    }

    let forwarded = request
        .headers()
        .get("x-forwarded-for")
        .and_then(|h| h.to_str().ok())
        .and_then(|value| value.split(',').next())
        .map(str::trim)
        .filter(|ip| !ip.is_empty());
    if let Some(ip) = forwarded {
        return format!("ip:{}", ip);
    }

    request
        .extensions()
        .get::<ConnectInfo<SocketAddr>>()
        .map(|ConnectInfo(addr)| format!("ip:{}", addr.ip()))
        .unwrap_or_else(|| "unknown".to_string())
}

/// Whole seconds until retry, never zero
fn retry_after_secs(retry_after: Duration) -> u64 {
    let secs = retry_after.as_secs();
    if retry_after.subsec_nanos() > 0 || secs == 0 {
        secs + 1
    } else {
        secs
    }
}

pub async fn rate_limit_middleware(
    State(limiter): State<RateLimiter>,
    request: Request,
    next: Next,
) -> Result<Response, AppError> {
    let client = client_id(&request);

    match limiter.check(&client) {
        RateLimitDecision::Allowed { remaining } => {
            tracing::debug!(client = %client, remaining, "Rate limit check passed");
            Ok(next.run(request).await)
        }
        RateLimitDecision::Limited { retry_after } => {
            let retry_after_secs = retry_after_secs(retry_after);
            tracing::warn!(client = %client, retry_after_secs, "Rate limit exceeded");
            Err(AppError::RateLimited { retry_after_secs })
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Body;

    const MINUTE: Duration = Duration::from_secs(60);

    #[test]
    fn test_eleventh_request_is_limited() {
        let store = LruRateLimitStore::new(10, MINUTE, 100);
        let now = Instant::now();

        for i in 0..10 {
            let decision = store.check("user:a", now + Duration::from_secs(i));
            assert!(matches!(decision, RateLimitDecision::Allowed { .. }), "call {}", i + 1);
        }

        match store.check("user:a", now + Duration::from_secs(10)) {
            RateLimitDecision::Limited { retry_after } => {
                assert_eq!(retry_after, Duration::from_secs(50));
            }
            other => panic!("expected limit, got {:?}", other),
        }
    }

    #[test]
    fn test_window_resets_after_expiry() {
        let store = LruRateLimitStore::new(1, MINUTE, 100);
        let now = Instant::now();

        assert!(matches!(store.check("c", now), RateLimitDecision::Allowed { remaining: 0 }));
        assert!(matches!(store.check("c", now), RateLimitDecision::Limited { .. }));
        assert!(matches!(
            store.check("c", now + MINUTE),
            RateLimitDecision::Allowed { .. }
        ));
    }

    #[test]
    fn test_clients_are_independent() {
        let store = LruRateLimitStore::new(1, MINUTE, 100);
        let now = Instant::now();

        assert!(matches!(store.check("a", now), RateLimitDecision::Allowed { .. }));
        assert!(matches!(store.check("b", now), RateLimitDecision::Allowed { .. }));
        assert!(matches!(store.check("a", now), RateLimitDecision::Limited { .. }));
    }

    #[test]
    fn test_capacity_bounds_tracked_clients() {
        let store = LruRateLimitStore::new(5, MINUTE, 3);
        let now = Instant::now();
        for client in ["a", "b", "c", "d", "e"] {
            store.check(client, now);
        }
        assert_eq!(store.tracked_clients(), 3);
    }

    #[test]
    fn test_expired_entries_are_pruned() {
        let store = LruRateLimitStore::new(5, MINUTE, 100);
        let now = Instant::now();
        store.check("a", now);
        store.check("b", now);

        store.check("c", now + MINUTE * 2);
        assert_eq!(store.tracked_clients(), 1);
    }

    #[test]
    fn test_retry_after_rounds_up() {
        assert_eq!(retry_after_secs(Duration::from_millis(1500)), 2);
        assert_eq!(retry_after_secs(Duration::from_secs(3)), 3);
        assert_eq!(retry_after_secs(Duration::ZERO), 1);
    }

    #[test]
    fn test_client_id_precedence() {
        let mut request = axum::http::Request::builder()
            .header("x-forwarded-for", "203.0.113.7, 10.0.0.1")
            .body(Body::empty())
            .unwrap();
        assert_eq!(client_id(&request), "ip:203.0.113.7");

        request.extensions_mut().insert(AuthUser("alice".to_string()));
        assert_eq!(client_id(&request), "user:alice");

        let anonymous = axum::http::Request::builder().body(Body::empty()).unwrap();
        assert_eq!(client_id(&anonymous), "unknown");
    }
}
