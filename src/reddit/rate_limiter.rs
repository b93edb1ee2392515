// Minimum-interval rate limiter for Reddit API calls.
//
// Reddit's OAuth API allows roughly 100 requests per minute per client.
// Each request waits until at least `interval` has passed since the
// previous one was let through, so concurrent subreddit fetches queue up
// behind a single limiter.

use std::sync::Arc;
use tokio::sync::Mutex;
use tokio::time::{Duration, Instant};

/// Default request rate: one per second stays well under the OAuth cap.
pub const DEFAULT_REQUESTS_PER_SECOND: f64 = 1.0;

/// Slowest accepted rate (one request per 100s). Zero, negative and NaN
/// rates are raised to this.
pub const MIN_REQUESTS_PER_SECOND: f64 = 0.01;

#[derive(Clone)]
pub struct RateLimiter {
    inner: Arc<Mutex<RateLimiterInner>>,
}

struct RateLimiterInner {
    interval: Duration,
    last_request: Option<Instant>,
}

impl RateLimiter {
    /// Allow at most `requests_per_second` requests per second.
    pub fn new(requests_per_second: f64) -> Self {
        let rate = requests_per_second.max(MIN_REQUESTS_PER_SECOND);
        let interval = Duration::from_secs_f64(1.0 / rate);
        Self {
            inner: Arc::new(Mutex::new(RateLimiterInner {
                interval,
                last_request: None,
            })),
        }
    }

    /// Wait for a slot. The first call returns immediately.
    ///
    /// The lock is held through the sleep so waiters are released one
    /// interval apart rather than all at once.
    pub async fn acquire(&self) {
        let mut inner = self.inner.lock().await;

        if let Some(last) = inner.last_request {
            let elapsed = Instant::now().duration_since(last);
            if elapsed < inner.interval {
                tokio::time::sleep(inner.interval - elapsed).await;
            }
        }

        inner.last_request = Some(Instant::now());
    }
}

impl Default for RateLimiter {
    fn default() -> Self {
        Self::new(DEFAULT_REQUESTS_PER_SECOND)
    }
}
