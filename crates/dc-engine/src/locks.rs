//! Per-user serialization of event handling.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, PoisonError, Weak};

use dc_core::UserId;
use tokio::sync::{Mutex as AsyncMutex, OwnedMutexGuard};

/// Dead entries are pruned once the map grows past this size.
const PRUNE_THRESHOLD: usize = 128;

/// Hands out one async lock per user. Events for different users never wait
/// on each other; events for the same user run one at a time.
#[derive(Debug, Default)]
pub(crate) struct UserLocks {
    locks: Mutex<HashMap<UserId, Weak<AsyncMutex<()>>>>,
}

impl UserLocks {
    /// Waits for exclusive access to `user`'s state.
    pub(crate) async fn lock(&self, user: &UserId) -> OwnedMutexGuard<()> {
        self.entry(user).lock_owned().await
    }

    fn entry(&self, user: &UserId) -> Arc<AsyncMutex<()>> {
        let mut locks = self.locks.lock().unwrap_or_else(PoisonError::into_inner);

        if locks.len() > PRUNE_THRESHOLD {
            locks.retain(|_, weak| weak.strong_count() > 0);
        }

        if let Some(existing) = locks.get(user).and_then(Weak::upgrade) {
            return existing;
        }

        let lock = Arc::new(AsyncMutex::new(()));
        locks.insert(user.clone(), Arc::downgrade(&lock));
        lock
    }

    #[cfg(test)]
    fn len(&self) -> usize {
        self.locks
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }
}
