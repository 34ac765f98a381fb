//! Burst scheduling.
//!
//! The schedule alternates between a generating window of length G and a
//! sleeping window of length S. It is driven by the clock, not by pulls, so
//! after an idle period the next pull lands in whatever phase the wall clock
//! says is current.
//!
//! ```text
//!  start
//!    │◄──── G ────►│◄── S ──►│◄──── G ────►│◄── S ──►│
//!    │ generating  │ sleeping│ generating  │ sleeping│
//!                  ▲         ▲             ▲
//!             window_end   wake_at    next window_end
//! ```

use crate::error::Cancelled;
use crate::wait::sleep_or_cancel;
use std::time::Duration;
use tokio::time::Instant;
use tokio_util::sync::CancellationToken;
use tracing::debug;

/// Decides whether a pull has to wait for the next generating window.
#[derive(Debug, Clone)]
pub struct BurstScheduler {
    sleep_time: Duration,
    generate_time: Duration,
    /// End of the current generating window; `None` when bursts are disabled
    /// or the window runs past the end of the clock
    window_end: Option<Instant>,
}

impl BurstScheduler {
    /// Create a schedule whose first generating window starts at `now`.
    ///
    /// A zero `sleep_time` disables bursting. With bursting enabled,
    /// `generate_time` must be positive.
    pub fn new(sleep_time: Duration, generate_time: Duration, now: Instant) -> Self {
        let window_end = if sleep_time.is_zero() {
            None
        } else {
            now.checked_add(generate_time)
        };
        Self {
            sleep_time,
            generate_time,
            window_end,
        }
    }

    /// A schedule that never sleeps.
    pub fn disabled() -> Self {
        Self {
            sleep_time: Duration::ZERO,
            generate_time: Duration::ZERO,
            window_end: None,
        }
    }

    pub fn is_enabled(&self) -> bool {
        !self.sleep_time.is_zero()
    }

    /// End of the current generating window.
    pub fn window_end(&self) -> Option<Instant> {
        self.window_end
    }

    /// How long a pull arriving at `now` has to wait.
    ///
    /// Moves the window forward by whole periods until it ends after `now`.
    /// Returns `Duration::MAX` when the next window opens beyond the range of
    /// the clock.
    pub fn delay(&mut self, now: Instant) -> Duration {
        if !self.is_enabled() {
            return Duration::ZERO;
        }
        let Some(window_end) = self.window_end else {
            return Duration::ZERO;
        };
        if now < window_end {
            return Duration::ZERO;
        }

        let Some(advance) = self.catch_up(now.duration_since(window_end)) else {
            return Duration::MAX;
        };
        if let Some(next_end) = window_end.checked_add(advance) {
            self.window_end = Some(next_end);
            let wake_at = next_end - self.generate_time;
            return wake_at.saturating_duration_since(now);
        }

        // The next window opens but does not close within the clock range.
        match window_end.checked_add(advance - self.generate_time) {
            Some(wake_at) => {
                self.window_end = None;
                wake_at.saturating_duration_since(now)
            }
            None => Duration::MAX,
        }
    }

    /// Whole periods that move a window end lying `behind` in the past to
    /// the future.
    fn catch_up(&self, behind: Duration) -> Option<Duration> {
        let period = self.sleep_time.checked_add(self.generate_time)?.as_nanos();
        let periods = behind.as_nanos() / period + 1;
        let nanos = u64::try_from(periods.checked_mul(period)?).ok()?;
        Some(Duration::from_nanos(nanos))
    }

    /// Block until the current time is inside a generating window.
    ///
    /// Returns how long the call slept.
    pub async fn wait(&mut self, cancel: &CancellationToken) -> Result<Duration, Cancelled> {
        if cancel.is_cancelled() {
            return Err(Cancelled);
        }

        let now = Instant::now();
        let delay = self.delay(now);
        if delay.is_zero() {
            return Ok(Duration::ZERO);
        }

        debug!("Burst sleeping for {:?} until next generate window", delay);
        sleep_or_cancel(now, delay, cancel).await?;
        Ok(delay)
    }
}
