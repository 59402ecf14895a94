//! In-memory key store with per-mode expiry

use crate::cache::DeleteMode;
use crate::config::{compile_excludes, Config};
use crate::error::JobsResult;
use regex::Regex;
use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;
use tokio::task::JoinHandle;
use tokio::time::{self, Instant, MissedTickBehavior};
use tokio_util::sync::CancellationToken;
use tracing::debug;

#[derive(Debug, Clone, Copy)]
struct Entry {
    /// `None` means the entry only leaves through `release`
    expires_at: Option<Instant>,
}

impl Entry {
    fn is_expired(&self, now: Instant) -> bool {
        self.expires_at.is_some_and(|deadline| now >= deadline)
    }
}

/// Thread-safe set of command keys that are running or ran recently.
///
/// Each method is atomic on its own. A `contains` followed by a `set` is
/// not: two callers can both observe a key as absent and both go on to
/// dispatch it. Duplicate suppression is best-effort.
#[derive(Debug)]
pub struct DedupCache {
    entries: Mutex<HashMap<String, Entry>>,
    mode: DeleteMode,
    ttl: Duration,
    excludes: Vec<Regex>,
}

impl DedupCache {
    /// Create a cache. A zero `ttl` means entries never expire.
    pub fn new(mode: DeleteMode, ttl: Duration, excludes: Vec<Regex>) -> Self {
        Self {
            entries: Mutex::new(HashMap::new()),
            mode,
            ttl,
            excludes,
        }
    }

    /// Build the cache described by the configuration
    pub fn from_config(config: &Config) -> JobsResult<Self> {
        let excludes = compile_excludes(&config.cache_excludes)?;
        Ok(Self::new(
            config.cache_delete_mode,
            config.cache_ttl(),
            excludes,
        ))
    }

    pub fn mode(&self) -> DeleteMode {
        self.mode
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    /// True iff an unexpired entry exists for `key`
    pub fn contains(&self, key: &str) -> bool {
        let now = Instant::now();
        self.lock()
            .get(key)
            .is_some_and(|entry| !entry.is_expired(now))
    }

    /// Mark `key` as tracked. No-op for excluded keys. Re-setting a key
    /// restarts its TTL.
    pub fn set(&self, key: &str) {
        if self.is_excluded(key) {
            debug!(key, "Key matches cache exclude, not caching");
            return;
        }

        let expires_at = self.deadline();
        self.lock().insert(key.to_string(), Entry { expires_at });
    }

    /// Drop `key` if the delete mode allows explicit removal
    pub fn release(&self, key: &str) {
        if !self.mode.releases() {
            return;
        }
        self.lock().remove(key);
    }

    /// Number of live entries
    pub fn len(&self) -> usize {
        let now = Instant::now();
        self.lock()
            .values()
            .filter(|entry| !entry.is_expired(now))
            .count()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Evict expired entries, returning how many were removed
    pub fn purge_expired(&self) -> usize {
        let now = Instant::now();
        let mut entries = self.lock();
        let before = entries.len();
        entries.retain(|_, entry| !entry.is_expired(now));
        before - entries.len()
    }

    /// Periodically evict expired entries until `cancel` fires.
    ///
    /// Returns `None` when entries in this mode never expire, or when
    /// `interval` reaches past the clock's range.
    pub fn spawn_sweeper(
        self: &Arc<Self>,
        interval: Duration,
        cancel: CancellationToken,
    ) -> Option<JoinHandle<()>> {
        if self.deadline().is_none() || interval.is_zero() {
            return None;
        }

        let start = Instant::now().checked_add(interval)?;
        let cache = Arc::clone(self);
        Some(tokio::spawn(async move {
            let mut ticker = time::interval_at(start, interval);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

            loop {
                tokio::select! {
                    _ = cancel.cancelled() => break,
                    _ = ticker.tick() => {
                        let evicted = cache.purge_expired();
                        if evicted > 0 {
                            debug!(evicted, "Evicted expired cache entries");
                        }
                    }
                }
            }
        }))
    }

    fn is_excluded(&self, key: &str) -> bool {
        self.excludes.iter().any(|re| re.is_match(key))
    }

    /// Past the clock's range the entry is treated as never expiring
    fn deadline(&self) -> Option<Instant> {
        if self.mode.expires() && !self.ttl.is_zero() {
            Instant::now().checked_add(self.ttl)
        } else {
            None
        }
    }

    fn lock(&self) -> MutexGuard<'_, HashMap<String, Entry>> {
        // Entries stay consistent even if a holder panicked mid-operation.
        self.entries.lock().unwrap_or_else(PoisonError::into_inner)
    }
}
