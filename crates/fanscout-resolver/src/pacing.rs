//! Minimum spacing between outbound search requests.

use std::sync::Mutex;
use std::time::Duration;

use tokio::time::Instant;

/// Enforces a minimum interval between successive search requests.
///
/// Each call to [`Pacer::wait`] reserves the next free slot under the lock
/// and then sleeps outside it, so concurrent callers queue up one interval
/// apart.
#[derive(Debug)]
pub struct Pacer {
    min_interval: Duration,
    next_slot: Mutex<Option<Instant>>,
}

impl Pacer {
    #[must_use]
    pub fn new(min_interval: Duration) -> Self {
        Self {
            min_interval,
            next_slot: Mutex::new(None),
        }
    }

    #[must_use]
    pub fn from_millis(ms: u64) -> Self {
        Self::new(Duration::from_millis(ms))
    }

    #[must_use]
    pub fn min_interval(&self) -> Duration {
        self.min_interval
    }

    /// Sleeps until at least `min_interval` has passed since the previous slot.
    pub async fn wait(&self) {
        if self.min_interval.is_zero() {
            return;
        }
        let now = Instant::now();
        let slot = {
            let mut next = self
                .next_slot
                .lock()
                .unwrap_or_else(std::sync::PoisonError::into_inner);
            let slot = next.map_or(now, |n| n.max(now));
            *next = Some(slot + self.min_interval);
            slot
        };
        if slot > now {
            tracing::trace!(delay_ms = (slot - now).as_millis(), "pacing search request");
            tokio::time::sleep_until(slot).await;
        }
    }
}
