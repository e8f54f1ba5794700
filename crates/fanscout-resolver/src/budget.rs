//! Per-run cap on search-based resolution attempts.

use std::sync::atomic::{AtomicUsize, Ordering};

/// Default number of commenters allowed to reach the search fallback per run.
pub const DEFAULT_SEARCH_BUDGET: usize = 50;

/// Counts commenters that entered the search fallback.
///
/// One unit is consumed per commenter, not per query, so a commenter whose
/// name produces several query variants still costs one. The check and the
/// increment are a single atomic step; the cap holds even if resolution is
/// spread across tasks.
#[derive(Debug)]
pub struct SearchBudget {
    limit: usize,
    used: AtomicUsize,
}

impl SearchBudget {
    #[must_use]
    pub fn new(limit: usize) -> Self {
        Self {
            limit,
            used: AtomicUsize::new(0),
        }
    }

    /// Takes one unit if any remain. Returns `false` once the cap is reached.
    pub fn try_acquire(&self) -> bool {
        self.used
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |used| {
                (used < self.limit).then_some(used + 1)
            })
            .is_ok()
    }

    #[must_use]
    pub fn used(&self) -> usize {
        self.used.load(Ordering::SeqCst)
    }

    #[must_use]
    pub fn remaining(&self) -> usize {
        self.limit.saturating_sub(self.used())
    }

    #[must_use]
    pub fn limit(&self) -> usize {
        self.limit
    }

    #[must_use]
    pub fn is_exhausted(&self) -> bool {
        self.remaining() == 0
    }
}

impl Default for SearchBudget {
    fn default() -> Self {
        Self::new(DEFAULT_SEARCH_BUDGET)
    }
}
