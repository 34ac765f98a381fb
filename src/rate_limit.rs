//! Token bucket rate limiter.
//!
//! The bucket holds at most one token and refills continuously at `rate`
//! tokens per second. A pull takes one token; when the bucket is empty the
//! token is reserved ahead of time and the caller sleeps until it has
//! accrued. A rate of zero disables limiting.

use crate::error::Cancelled;
use crate::wait::sleep_or_cancel;
use std::time::Duration;
use tokio::time::Instant;
use tokio_util::sync::CancellationToken;
use tracing::debug;

/// Bucket capacity; only one record may go out without waiting.
pub const BURST_CAPACITY: f64 = 1.0;

/// Token bucket limiter with capacity one.
#[derive(Debug, Clone)]
pub struct RateLimiter {
    /// Tokens per second; zero means unlimited
    rate: f64,
    /// Available tokens; negative while a reservation is outstanding
    tokens: f64,
    /// Last time tokens were refilled
    last_refill: Instant,
}

impl RateLimiter {
    /// Create a limiter with a full bucket.
    ///
    /// Non-positive or non-finite rates disable limiting.
    pub fn new(rate: f64, now: Instant) -> Self {
        let rate = if rate.is_finite() && rate > 0.0 {
            rate
        } else {
            0.0
        };
        Self {
            rate,
            tokens: BURST_CAPACITY,
            last_refill: now,
        }
    }

    /// Create a limiter that allows one record per `interval`.
    pub fn per_interval(interval: Duration, now: Instant) -> Self {
        if interval.is_zero() {
            return Self::unlimited();
        }
        Self::new(1.0 / interval.as_secs_f64(), now)
    }

    /// A limiter that never waits.
    pub fn unlimited() -> Self {
        Self::new(0.0, Instant::now())
    }

    /// Tokens per second; zero when disabled.
    pub fn rate(&self) -> f64 {
        self.rate
    }

    pub fn is_enabled(&self) -> bool {
        self.rate > 0.0
    }

    fn refill(&mut self, now: Instant) {
        // Time going backwards adds nothing.
        if now <= self.last_refill {
            return;
        }
        let elapsed = now.duration_since(self.last_refill).as_secs_f64();
        self.tokens = (self.tokens + elapsed * self.rate).min(BURST_CAPACITY);
        self.last_refill = now;
    }

    /// Take one token at `now` and return how long until it is usable.
    pub fn reserve(&mut self, now: Instant) -> Duration {
        if !self.is_enabled() {
            return Duration::ZERO;
        }

        self.refill(now);
        self.tokens -= 1.0;
        if self.tokens >= 0.0 {
            return Duration::ZERO;
        }

        Duration::try_from_secs_f64(-self.tokens / self.rate).unwrap_or(Duration::MAX)
    }

    /// Give back a reserved token that will not be used.
    fn cancel_reservation(&mut self) {
        self.tokens = (self.tokens + 1.0).min(BURST_CAPACITY);
    }

    /// Block until a token is available.
    ///
    /// Returns how long the call slept. A cancelled wait returns its token
    /// to the bucket.
    pub async fn wait(&mut self, cancel: &CancellationToken) -> Result<Duration, Cancelled> {
        if !self.is_enabled() {
            return Ok(Duration::ZERO);
        }

        let now = Instant::now();
        let delay = self.reserve(now);
        if delay.is_zero() {
            return Ok(Duration::ZERO);
        }

        debug!("Rate limit reached, waiting {:?}", delay);
        if let Err(cancelled) = sleep_or_cancel(now, delay, cancel).await {
            self.cancel_reservation();
            return Err(cancelled);
        }
        Ok(delay)
    }
}
