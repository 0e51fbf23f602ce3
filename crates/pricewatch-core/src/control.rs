//! Cooperative shutdown: a shared level-triggered token and interruptible sleep.
//!
//! The signal handler sets the token; the scheduler and fetcher observe it at
//! every safe suspension point (before each backoff sleep, before and after
//! each inter-tick sleep) and unwind promptly.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

/// Granularity at which interruptible sleeps re-check the token. Bounds
/// shutdown latency to one slice rather than a full sleep duration.
pub const POLL_GRANULARITY: Duration = Duration::from_millis(250);

/// Shared shutdown flag. Cloning shares the underlying token.
///
/// Level-triggered and set-once: `request` is idempotent, and once set the
/// token stays set for the rest of the process lifetime. Safe to set from a
/// signal-handling task and read from the scheduler loop.
#[derive(Debug, Clone, Default)]
pub struct ShutdownToken {
    requested: Arc<AtomicBool>,
}

impl ShutdownToken {
    pub fn new() -> Self {
        Self::default()
    }

    /// Request shutdown. Duplicate calls are no-ops.
    pub fn request(&self) {
        self.requested.store(true, Ordering::Relaxed);
    }

    pub fn is_requested(&self) -> bool {
        self.requested.load(Ordering::Relaxed)
    }
}

/// Sleep for `total`, waking early if shutdown is requested.
///
/// Returns `true` if the full duration elapsed, `false` if interrupted. The
/// wait is sliced at [`POLL_GRANULARITY`] so a pending shutdown is observed
/// within one slice.
pub async fn sleep_interruptible(token: &ShutdownToken, total: Duration) -> bool {
    let deadline = tokio::time::Instant::now() + total;
    loop {
        if token.is_requested() {
            return false;
        }
        let now = tokio::time::Instant::now();
        if now >= deadline {
            return true;
        }
        let slice = (deadline - now).min(POLL_GRANULARITY);
        tokio::time::sleep(slice).await;
    }
}
