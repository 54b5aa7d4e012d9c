//! # Lifecycle Lock
//!
//! Serializes container-mutating commands. One instance is shared by every
//! handler that creates, starts or stops containers. Waiters are served in
//! arrival order and there is no timeout.

use std::sync::Arc;
use tokio::sync::{Mutex, OwnedMutexGuard};

/// Shared, injectable lock around container mutations.
#[derive(Debug, Clone, Default)]
pub struct LifecycleLock {
    inner: Arc<Mutex<()>>,
}

/// Held for the duration of one container mutation.
pub type LifecycleGuard = OwnedMutexGuard<()>;

impl LifecycleLock {
    pub fn new() -> Self {
        Self::default()
    }

    /// Wait for exclusive access.
    pub async fn acquire(&self) -> LifecycleGuard {
        Arc::clone(&self.inner).lock_owned().await
    }

    /// Whether a mutation currently holds the lock.
    pub fn is_held(&self) -> bool {
        self.inner.try_lock().is_err()
    }

    /// Whether two handles refer to the same lock.
    pub fn same_as(&self, other: &LifecycleLock) -> bool {
        Arc::ptr_eq(&self.inner, &other.inner)
    }
}
