use std::sync::atomic::{AtomicU64, Ordering};

/// Fixed pool of iterations shared by every VU of a `shared-iterations` run.
#[derive(Debug)]
pub(crate) struct IterationPool {
    limit: u64,
    claimed: AtomicU64,
}

impl IterationPool {
    pub(crate) const fn new(limit: u64) -> Self {
        Self {
            limit,
            claimed: AtomicU64::new(0),
        }
    }

    /// Claims the next iteration. Returns `false` once the pool is empty.
    pub(crate) fn try_claim(&self) -> bool {
        loop {
            let current = self.claimed.load(Ordering::Relaxed);
            if current >= self.limit {
                return false;
            }
            let Some(next) = current.checked_add(1) else {
                return false;
            };
            if self
                .claimed
                .compare_exchange(current, next, Ordering::Relaxed, Ordering::Relaxed)
                .is_ok()
            {
                return true;
            }
        }
    }

    pub(crate) fn claimed(&self) -> u64 {
        self.claimed.load(Ordering::Relaxed)
    }
}
