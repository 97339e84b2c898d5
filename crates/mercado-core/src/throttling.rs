use std::fmt::{Debug, Formatter};
use std::num::NonZeroU32;
use std::sync::Arc;
use std::time::Duration;

use governor::clock::DefaultClock;
use governor::state::direct::NotKeyed;
use governor::state::InMemoryState;
use governor::{Quota, RateLimiter};

/// Request budget: at most `requests` calls per `window`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RateLimit {
    pub requests: u32,
    pub window: Duration,
}

impl RateLimit {
    pub const fn per_minute(requests: u32) -> Self {
        Self {
            requests,
            window: Duration::from_secs(60),
        }
    }

    pub const fn per_second(requests: u32) -> Self {
        Self {
            requests,
            window: Duration::from_secs(1),
        }
    }
}

type DirectRateLimiter = RateLimiter<NotKeyed, InMemoryState, DefaultClock>;

/// Token bucket shared by every clone of a platform client.
///
/// Applied before each attempt, retries included, so a retry storm cannot
/// exceed the configured budget.
#[derive(Clone)]
pub struct RequestThrottle {
    limiter: Arc<DirectRateLimiter>,
    limit: RateLimit,
}

impl RequestThrottle {
    pub fn new(limit: RateLimit) -> Self {
        Self {
            limiter: Arc::new(RateLimiter::direct(quota_from_limit(limit))),
            limit,
        }
    }

    pub const fn limit(&self) -> RateLimit {
        self.limit
    }

    /// Takes a cell if one is free right now.
    pub fn try_acquire(&self) -> bool {
        self.limiter.check().is_ok()
    }

    /// Waits until a cell is free and takes it.
    pub async fn acquire(&self) {
        self.limiter.until_ready().await;
    }
}

impl Debug for RequestThrottle {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RequestThrottle")
            .field("limit", &self.limit)
            .finish()
    }
}

fn quota_from_limit(limit: RateLimit) -> Quota {
    let safe_limit = limit.requests.max(1);
    let burst = NonZeroU32::new(safe_limit).unwrap_or(NonZeroU32::MIN);

    let seconds_per_cell = (limit.window.as_secs_f64() / f64::from(safe_limit)).max(0.001);
    let period = Duration::from_secs_f64(seconds_per_cell);

    match Quota::with_period(period) {
        Some(quota) => quota.allow_burst(burst),
        None => Quota::per_second(burst),
    }
}
