//! Per-client rate limiting for the contact endpoint.

use std::collections::{HashMap, VecDeque};
use std::net::{IpAddr, SocketAddr};
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};

use axum::{
    body::Body,
    extract::{ConnectInfo, Request, State},
    http::StatusCode,
    middleware::Next,
    response::Response,
};

pub const CONTACT_LIMIT: usize = 10;
pub const CONTACT_WINDOW: Duration = Duration::from_secs(60);

/// Sliding-window limiter: each client IP may make `limit` requests within
/// any `window`-long interval. Counters are the only mutable state shared
/// between requests.
pub struct RateLimiter {
    windows: Mutex<HashMap<IpAddr, VecDeque<Instant>>>,
    limit: usize,
    window: Duration,
}

impl RateLimiter {
    pub fn new(limit: usize, window: Duration) -> Self {
        Self {
            windows: Mutex::new(HashMap::new()),
            limit,
            window,
        }
    }

    pub fn check(&self, client: IpAddr) -> bool {
        self.check_at(client, Instant::now())
    }

    fn check_at(&self, client: IpAddr, now: Instant) -> bool {
        let mut windows = self.windows.lock().expect("rate limiter mutex poisoned");
        let hits = windows.entry(client).or_default();
        while hits
            .front()
            .is_some_and(|&hit| now.duration_since(hit) >= self.window)
        {
            hits.pop_front();
        }
        if hits.len() >= self.limit {
            return false;
        }
        hits.push_back(now);
        true
    }
}

pub async fn rate_limit_middleware(
    ConnectInfo(addr): ConnectInfo<SocketAddr>,
    State(limiter): State<Arc<RateLimiter>>,
    request: Request,
    next: Next,
) -> Response {
    if limiter.check(addr.ip()) {
        next.run(request).await
    } else {
        tracing::warn!(client = %addr.ip(), "rate limit exceeded");
        let mut response = Response::new(Body::from("Too many requests"));
        *response.status_mut() = StatusCode::TOO_MANY_REQUESTS;
        response
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn allows_up_to_the_limit_within_a_window() {
        let limiter = RateLimiter::new(10, Duration::from_secs(60));
        let client = IpAddr::from([127, 0, 0, 1]);
        let start = Instant::now();
        for _ in 0..10 {
            assert!(limiter.check_at(client, start));
        }
        assert!(!limiter.check_at(client, start));
    }

    #[test]
    fn window_slides_and_frees_capacity() {
        let limiter = RateLimiter::new(2, Duration::from_secs(60));
        let client = IpAddr::from([10, 0, 0, 1]);
        let start = Instant::now();
        assert!(limiter.check_at(client, start));
        assert!(limiter.check_at(client, start + Duration::from_secs(30)));
        assert!(!limiter.check_at(client, start + Duration::from_secs(59)));
        // The first hit ages out, the one from t+30 has not.
        assert!(limiter.check_at(client, start + Duration::from_secs(61)));
        assert!(!limiter.check_at(client, start + Duration::from_secs(62)));
    }

    #[test]
    fn clients_are_limited_independently() {
        let limiter = RateLimiter::new(1, Duration::from_secs(60));
        let start = Instant::now();
        assert!(limiter.check_at(IpAddr::from([1, 1, 1, 1]), start));
        assert!(!limiter.check_at(IpAddr::from([1, 1, 1, 1]), start));
        assert!(limiter.check_at(IpAddr::from([2, 2, 2, 2]), start));
    }
}
