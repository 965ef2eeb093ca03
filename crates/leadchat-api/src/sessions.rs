//! Live HTTP chat sessions, keyed by id.
//!
//! A session leaves the registry when its conversation completes or when it
//! has been idle for longer than the configured timeout. The sweeper task
//! stops on its own once the registry is dropped.

use std::sync::{Arc, Weak};
use std::time::Duration;

use dashmap::DashMap;
use tokio::sync::Mutex;
use tokio::task::JoinHandle;
use tokio::time::{Instant, MissedTickBehavior};
use uuid::Uuid;

/// How often the sweeper looks for idle sessions.
pub const SWEEP_INTERVAL: Duration = Duration::from_secs(60);

struct Entry<T> {
    session: Arc<Mutex<T>>,
    last_active: Instant,
}

/// Sessions by id. A session is locked for the whole of a turn.
pub struct SessionRegistry<T> {
    entries: DashMap<Uuid, Entry<T>>,
}

impl<T> Default for SessionRegistry<T> {
    fn default() -> Self {
        Self {
            entries: DashMap::new(),
        }
    }
}

impl<T> SessionRegistry<T> {
    /// Register a session under a fresh id.
    pub fn insert(&self, session: T) -> Uuid {
        let id = Uuid::now_v7();
        self.entries.insert(
            id,
            Entry {
                session: Arc::new(Mutex::new(session)),
                last_active: Instant::now(),
            },
        );
        id
    }

    /// Look up a session and mark it active.
    pub fn checkout(&self, id: &Uuid) -> Option<Arc<Mutex<T>>> {
        let mut entry = self.entries.get_mut(id)?;
        entry.last_active = Instant::now();
        Some(entry.session.clone())
    }

    pub fn remove(&self, id: &Uuid) -> bool {
        self.entries.remove(id).is_some()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Drop every session idle for longer than `idle`; returns how many went.
    pub fn evict_idle(&self, idle: Duration) -> usize {
        let now = Instant::now();
        let mut evicted = 0;
        self.entries.retain(|_, entry| {
            let keep = now.duration_since(entry.last_active) <= idle;
            if !keep {
                evicted += 1;
            }
            keep
        });
        evicted
    }
}

/// Evict idle sessions every `every` until the registry is dropped.
pub fn spawn_sweeper<T: Send + 'static>(
    registry: &Arc<SessionRegistry<T>>,
    idle: Duration,
    every: Duration,
) -> JoinHandle<()> {
    let registry: Weak<SessionRegistry<T>> = Arc::downgrade(registry);
    tokio::spawn(async move {
        let mut ticker = tokio::time::interval(every);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
        loop {
            ticker.tick().await;
            let Some(registry) = registry.upgrade() else {
                break;
            };
            let evicted = registry.evict_idle(idle);
            if evicted > 0 {
                tracing::debug!(evicted, remaining = registry.len(), "evicted idle chat sessions");
            }
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test(start_paused = true)]
    async fn test_evict_idle_keeps_recent_sessions() {
        let registry = SessionRegistry::default();
        let stale = registry.insert("stale");
        tokio::time::advance(Duration::from_secs(90)).await;
        let fresh = registry.insert("fresh");
        tokio::time::advance(Duration::from_secs(20)).await;

        assert_eq!(registry.evict_idle(Duration::from_secs(60)), 1);
        assert!(registry.checkout(&stale).is_none());
        assert!(registry.checkout(&fresh).is_some());
    }

    #[tokio::test(start_paused = true)]
    async fn test_checkout_refreshes_activity() {
        let registry = SessionRegistry::default();
        let id = registry.insert(1u8);
        tokio::time::advance(Duration::from_secs(50)).await;
        assert!(registry.checkout(&id).is_some());
        tokio::time::advance(Duration::from_secs(50)).await;

        assert_eq!(registry.evict_idle(Duration::from_secs(60)), 0);
        assert_eq!(registry.len(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_sweeper_evicts_expired_sessions() {
        let registry = Arc::new(SessionRegistry::default());
        let id = registry.insert(());
        let sweeper = spawn_sweeper(&registry, Duration::from_secs(30), Duration::from_secs(10));

        tokio::time::sleep(Duration::from_secs(45)).await;
        assert!(registry.checkout(&id).is_none());
        assert_eq!(registry.len(), 0);

        drop(registry);
        tokio::time::sleep(Duration::from_secs(20)).await;
        assert!(sweeper.is_finished());
    }

    #[tokio::test]
    async fn test_remove() {
        let registry = SessionRegistry::default();
        let id = registry.insert(());
        assert!(registry.remove(&id));
        assert!(!registry.remove(&id));
    }
}
