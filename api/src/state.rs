use std::collections::HashMap;
use std::sync::Arc;

use sqlx::SqlitePool;
use tokio::sync::{Mutex, OwnedMutexGuard};

use crate::groq::GroqClient;

/// Requests that touch a user's profile or plan state are fallback user 1
/// when the client does not identify one (single-learner deployments).
pub const DEFAULT_USER_ID: i64 = 1;

#[derive(Clone)]
pub struct AppState {
    pub db: SqlitePool,
    pub groq: GroqClient,
    pub locks: UserLocks,
}

/// Per-user critical sections. The profile MA-update-then-level-adjust
/// sequence and the plan "no pending item → append" sequence are
/// read-modify-write; two concurrent requests for the same user racing
/// through them would lose updates or append duplicate items. Locks are
/// acquired only after any provider call has returned, never held across
/// the network.
#[derive(Clone, Default)]
pub struct UserLocks {
    inner: Arc<Mutex<HashMap<i64, Arc<Mutex<()>>>>>,
}

impl UserLocks {
    pub async fn acquire(&self, user_id: i64) -> OwnedMutexGuard<()> {
        let lock = {
            let mut registry = self.inner.lock().await;
            // entries nobody holds carry only the registry's own reference;
            // dropping them keeps the map bounded by in-flight users
            registry.retain(|_, lock| Arc::strong_count(lock) > 1);
            registry
                .entry(user_id)
                .or_insert_with(|| Arc::new(Mutex::new(())))
                .clone()
        };
        lock.lock_owned().await
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;
    use std::sync::atomic::{AtomicI64, Ordering};

    use super::UserLocks;

    #[tokio::test]
    async fn same_user_sections_are_serialized() {
        let locks = UserLocks::default();
        let counter = Arc::new(AtomicI64::new(0));

        let mut handles = Vec::new();
        for _ in 0..8 {
            let locks = locks.clone();
            let counter = counter.clone();
            handles.push(tokio::spawn(async move {
                let _guard = locks.acquire(1).await;
                // read-modify-write with a yield in the middle; without the
                // lock this loses increments
                let read = counter.load(Ordering::SeqCst);
                tokio::task::yield_now().await;
                counter.store(read + 1, Ordering::SeqCst);
            }));
        }
        for handle in handles {
            handle.await.unwrap();
        }

        assert_eq!(counter.load(Ordering::SeqCst), 8);
    }

    #[tokio::test]
    async fn released_locks_are_swept_from_the_registry() {
        let locks = UserLocks::default();
        let guard_one = locks.acquire(1).await;
        drop(guard_one);

        // a later acquire for another user drops the idle entry
        let _guard_two = locks.acquire(2).await;

        let registry = locks.inner.lock().await;
        assert_eq!(registry.len(), 1);
        assert!(registry.contains_key(&2));
    }

    #[tokio::test]
    async fn held_locks_survive_the_sweep() {
        let locks = UserLocks::default();
        let _guard_one = locks.acquire(1).await;
        let _guard_two = locks.acquire(2).await;

        let registry = locks.inner.lock().await;
        assert_eq!(registry.len(), 2);
    }

    #[tokio::test]
    async fn different_users_do_not_block_each_other() {
        let locks = UserLocks::default();
        let guard_one = locks.acquire(1).await;
        // must not deadlock while user 1 is held
        let _guard_two = locks.acquire(2).await;
        drop(guard_one);
    }
}
