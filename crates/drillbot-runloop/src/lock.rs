//! Single-flight guard for cycles.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

/// At most one cycle body executes at any instant.
#[derive(Debug, Default)]
pub struct CycleLock {
    processing: AtomicBool,
}

impl CycleLock {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    /// Take the lock, or `None` if a cycle is already in flight.
    pub fn try_acquire(self: &Arc<Self>) -> Option<CycleGuard> {
        self.processing
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .ok()
            .map(|_| CycleGuard { lock: self.clone() })
    }

    pub fn is_held(&self) -> bool {
        self.processing.load(Ordering::Acquire)
    }
}

/// Releases the lock when dropped, whether the cycle succeeded, failed or panicked.
#[derive(Debug)]
pub struct CycleGuard {
    lock: Arc<CycleLock>,
}

impl Drop for CycleGuard {
    fn drop(&mut self) {
        self.lock.processing.store(false, Ordering::Release);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_second_acquire_fails_while_held() {
        let lock = CycleLock::new();
        let guard = lock.try_acquire();
        assert!(guard.is_some());
        assert!(lock.is_held());
        assert!(lock.try_acquire().is_none());

        drop(guard);
        assert!(!lock.is_held());
        assert!(lock.try_acquire().is_some());
    }

    #[test]
    fn test_released_on_panic() {
        let lock = CycleLock::new();
        let cloned = lock.clone();
        let result = std::panic::catch_unwind(move || {
            let _guard = cloned.try_acquire();
            panic!("solver blew up");
        });
        assert!(result.is_err());
        assert!(!lock.is_held());
    }
}
