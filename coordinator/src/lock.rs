//! Re-entrancy guard for the coordinator's state-mutating entry points.

use crate::error::CoordinatorError;
use std::cell::Cell;

/// A non-reentrant lock. Entering while held fails with
/// [`CoordinatorError::Reentrancy`] and bumps a rejection counter that
/// callback dispatch uses to detect re-entry attempts a consumer swallowed.
#[derive(Debug, Default)]
pub struct ReentrancyLock {
    held: Cell<bool>,
    rejected: Cell<u64>,
}

impl ReentrancyLock {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn enter(&self) -> Result<LockGuard<'_>, CoordinatorError> {
        if self.held.replace(true) {
            self.rejected.set(self.rejected.get().saturating_add(1));
            tracing::debug!("re-entrant call rejected");
            return Err(CoordinatorError::Reentrancy);
        }
        Ok(LockGuard { lock: self })
    }

    pub fn is_held(&self) -> bool {
        self.held.get()
    }

    /// Total number of rejected entries since construction.
    pub fn rejected_count(&self) -> u64 {
        self.rejected.get()
    }
}

/// Releases the lock on drop, on every exit path.
#[derive(Debug)]
pub struct LockGuard<'a> {
    lock: &'a ReentrancyLock,
}

impl Drop for LockGuard<'_> {
    fn drop(&mut self) {
        self.lock.held.set(false);
    }
}
