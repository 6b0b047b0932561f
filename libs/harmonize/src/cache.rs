//! Time-bounded key/value cache with background eviction
//!
//! Entries are stamped when written and removed only by a periodic sweep that
//! runs on the Tokio runtime. Reads never expire anything, so an entry older
//! than the TTL stays visible (and counted) until the next sweep tick.

use crate::{Error, Result};
use parking_lot::Mutex;
use std::collections::HashMap;
use std::hash::Hash;
use std::sync::{Arc, Weak};
use std::time::Duration;
use tokio::runtime::Handle;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::{Instant, MissedTickBehavior};

/// Cached value with the time it was written
#[derive(Debug, Clone)]
pub struct CacheEntry<V> {
    pub value: V,
    pub inserted_at: Instant,
}

impl<V> CacheEntry<V> {
    fn new(value: V) -> Self {
        Self {
            value,
            inserted_at: Instant::now(),
        }
    }

    /// Whether the entry has reached `ttl` at `now`
    pub fn is_expired(&self, ttl: Duration, now: Instant) -> bool {
        now.saturating_duration_since(self.inserted_at) >= ttl
    }
}

struct Shared<K, V> {
    entries: Mutex<HashMap<K, CacheEntry<V>>>,
    ttl: Duration,
    // Dropping the sender (last cache handle gone) also stops the sweeper.
    shutdown: watch::Sender<bool>,
}

impl<K: Eq + Hash, V> Shared<K, V> {
    fn sweep(&self, now: Instant) -> usize {
        let mut entries = self.entries.lock();
        let before = entries.len();
        entries.retain(|_, entry| !entry.is_expired(self.ttl, now));
        before - entries.len()
    }
}

/// Concurrency-safe TTL cache
///
/// Cloning yields another handle to the same entries and sweeper.
pub struct ExpiringCache<K, V> {
    shared: Arc<Shared<K, V>>,
}

impl<K, V> Clone for ExpiringCache<K, V> {
    fn clone(&self) -> Self {
        Self {
            shared: Arc::clone(&self.shared),
        }
    }
}

impl<K, V> std::fmt::Debug for ExpiringCache<K, V> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ExpiringCache")
            .field("entries", &self.shared.entries.lock().len())
            .field("ttl", &self.shared.ttl)
            .finish()
    }
}

impl<K, V> ExpiringCache<K, V>
where
    K: Eq + Hash + Send + 'static,
    V: Send + 'static,
{
    /// Create a cache whose sweeper runs on the current Tokio runtime.
    ///
    /// Fails with [`Error::AsyncRuntimeUnavailable`] outside a runtime.
    pub fn new(ttl: Duration, cleanup_interval: Duration) -> Result<Self> {
        let handle = Handle::try_current().map_err(|_| Error::AsyncRuntimeUnavailable)?;
        Self::with_handle(&handle, ttl, cleanup_interval)
    }

    /// Create a cache whose sweeper runs on `handle`.
    pub fn with_handle(handle: &Handle, ttl: Duration, cleanup_interval: Duration) -> Result<Self> {
        Self::spawn(handle, ttl, cleanup_interval).map(|(cache, _sweeper)| cache)
    }

    fn spawn(
        handle: &Handle,
        ttl: Duration,
        cleanup_interval: Duration,
    ) -> Result<(Self, JoinHandle<()>)> {
        if cleanup_interval.is_zero() {
            return Err(Error::Validation(
                "cache cleanup interval must be greater than zero".to_string(),
            ));
        }

        let (shutdown_tx, shutdown_rx) = watch::channel(false);
        let shared = Arc::new(Shared {
            entries: Mutex::new(HashMap::new()),
            ttl,
            shutdown: shutdown_tx,
        });

        let sweeper = handle.spawn(run_sweeper(
            Arc::downgrade(&shared),
            cleanup_interval,
            shutdown_rx,
        ));

        tracing::debug!(?ttl, ?cleanup_interval, "Expiring cache started");

        Ok((Self { shared }, sweeper))
    }

    /// Insert or overwrite `key`, stamping it with the current time.
    pub fn put(&self, key: K, value: V) {
        self.shared
            .entries
            .lock()
            .insert(key, CacheEntry::new(value));
    }

    /// Number of resident entries, including ones past their TTL that have
    /// not been swept yet.
    pub fn len(&self) -> usize {
        self.shared.entries.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Remove every entry whose key matches `predicate`, returning how many
    /// were removed.
    pub fn invalidate_where<F>(&self, mut predicate: F) -> usize
    where
        F: FnMut(&K) -> bool,
    {
        let mut entries = self.shared.entries.lock();
        let before = entries.len();
        entries.retain(|key, _| !predicate(key));
        before - entries.len()
    }

    pub fn ttl(&self) -> Duration {
        self.shared.ttl
    }

    /// Stop the background sweeper. Entries stay resident afterwards.
    pub fn shutdown(&self) {
        let _ = self.shared.shutdown.send(true);
    }
}

impl<K, V> ExpiringCache<K, V>
where
    K: Eq + Hash + Send + 'static,
    V: Clone + Send + 'static,
{
    /// Resident value for `key`. Does not refresh or expire the entry.
    pub fn get(&self, key: &K) -> Option<V> {
        self.shared
            .entries
            .lock()
            .get(key)
            .map(|entry| entry.value.clone())
    }
}

async fn run_sweeper<K, V>(
    shared: Weak<Shared<K, V>>,
    cleanup_interval: Duration,
    mut shutdown: watch::Receiver<bool>,
) where
    K: Eq + Hash + Send + 'static,
    V: Send + 'static,
{
    let mut ticker = tokio::time::interval(cleanup_interval);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
    // The first tick completes immediately.
    ticker.tick().await;

    loop {
        tokio::select! {
            changed = shutdown.changed() => {
                if changed.is_err() || *shutdown.borrow() {
                    break;
                }
            }
            _ = ticker.tick() => {
                let Some(shared) = shared.upgrade() else {
                    break;
                };
                let removed = shared.sweep(Instant::now());
                if removed > 0 {
                    tracing::debug!(removed, "Evicted expired cache entries");
                }
            }
        }
    }

    tracing::debug!("Expiring cache sweeper stopped");
}
