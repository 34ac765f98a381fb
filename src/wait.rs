//! Cancellable sleeping shared by the schedulers.

use crate::error::Cancelled;
use std::time::Duration;
use tokio::time::{sleep_until, Instant};
use tokio_util::sync::CancellationToken;

/// Sleep for `delay` starting at `now`, or until `cancel` fires.
pub(crate) async fn sleep_or_cancel(
    now: Instant,
    delay: Duration,
    cancel: &CancellationToken,
) -> Result<(), Cancelled> {
    let Some(deadline) = now.checked_add(delay) else {
        // Unreachable deadline: only cancellation can end the wait.
        cancel.cancelled().await;
        return Err(Cancelled);
    };

    tokio::select! {
        biased;
        _ = cancel.cancelled() => Err(Cancelled),
        _ = sleep_until(deadline) => Ok(()),
    }
}
