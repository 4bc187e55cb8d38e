use parking_lot::Mutex;
use std::sync::Arc;

#[derive(Debug, Default)]
struct GuardState {
    latched: bool,
    epoch: u64,
}

/// Latch allowing at most one connect attempt in flight.
///
/// [`ConnectionGuard::try_acquire`] hands out a [`GuardPermit`] that releases
/// the latch when dropped, so a finished, failed or cancelled attempt can
/// never leave it stuck. [`ConnectionGuard::force_release`] is for teardown;
/// permits from before a forced release no longer affect the latch.
#[derive(Debug, Clone, Default)]
pub struct ConnectionGuard {
    inner: Arc<Mutex<GuardState>>,
}

impl ConnectionGuard {
    /// Creates an unlatched guard.
    pub fn new() -> Self {
        Self::default()
    }

    /// Latch the guard, or `None` if an attempt is already in flight.
    pub fn try_acquire(&self) -> Option<GuardPermit> {
        let mut state = self.inner.lock();
        if state.latched {
            return None;
        }
        state.latched = true;
        Some(GuardPermit {
            inner: Arc::clone(&self.inner),
            epoch: state.epoch,
        })
    }

    /// Whether a permit is currently outstanding.
    pub fn is_latched(&self) -> bool {
        self.inner.lock().latched
    }

    /// Unlatch unconditionally.
    pub fn force_release(&self) {
        let mut state = self.inner.lock();
        state.latched = false;
        state.epoch = state.epoch.wrapping_add(1);
    }
}

/// Proof of holding the [`ConnectionGuard`].
#[derive(Debug)]
pub struct GuardPermit {
    inner: Arc<Mutex<GuardState>>,
    epoch: u64,
}

impl Drop for GuardPermit {
    fn drop(&mut self) {
        let mut state = self.inner.lock();
        if state.epoch == self.epoch {
            state.latched = false;
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;

    #[test]
    fn test_second_acquire_blocked_until_drop() {
        let guard = ConnectionGuard::new();
        let permit = guard.try_acquire().unwrap();
        assert!(guard.is_latched());
        assert!(guard.try_acquire().is_none());

        drop(permit);
        assert!(!guard.is_latched());
        assert!(guard.try_acquire().is_some());
    }

    #[test]
    fn test_force_release_ignores_stale_permit() {
        let guard = ConnectionGuard::new();
        let stale = guard.try_acquire().unwrap();

        guard.force_release();
        let fresh = guard.try_acquire().unwrap();

        // the old permit must not unlatch the new attempt
        drop(stale);
        assert!(guard.is_latched());

        drop(fresh);
        assert!(!guard.is_latched());
    }

    #[test]
    fn test_clones_share_latch() {
        let guard = ConnectionGuard::new();
        let other = guard.clone();
        let _permit = guard.try_acquire().unwrap();
        assert!(other.try_acquire().is_none());
    }
}
