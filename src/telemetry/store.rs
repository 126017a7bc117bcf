//! Bounded, time-expiring key-value store used for per-session state.
//!
//! Both the prediction timer store and the validation duration store are
//! instances of [`ExpiringStore`]. A cache miss is a normal outcome (the
//! session is unknown or its entry expired), so the API returns `Option`
//! and never an error.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::{Duration, Instant};

/// Injectable time source so expiry can be driven by a simulated clock in
/// tests instead of waiting out the TTL.
pub trait Clock: Send + Sync {
    fn now(&self) -> Instant;
}

/// The wall clock used in production.
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> Instant {
        Instant::now()
    }
}

struct Slot<V> {
    value: V,
    expires_at: Instant,
}

/// A bounded key-value cache with per-entry expiration.
///
/// Entries expire `ttl` after their last write; reads never refresh the
/// clock. When a new key would push the store past `capacity`, the
/// least-recently-inserted live entry is evicted first. Expired entries are
/// pruned lazily on access.
pub struct ExpiringStore<V> {
    entries: HashMap<String, Slot<V>>,
    // Keys in insertion order; an overwrite moves its key to the back.
    insertion_order: Vec<String>,
    ttl: Duration,
    capacity: usize,
    clock: Arc<dyn Clock>,
}

impl<V: Clone> ExpiringStore<V> {
    pub fn new(ttl: Duration, capacity: usize, clock: Arc<dyn Clock>) -> Self {
        ExpiringStore {
            entries: HashMap::new(),
            insertion_order: Vec::new(),
            ttl,
            capacity,
            clock,
        }
    }

    /// Insert or overwrite an entry, resetting its expiration to
    /// `now + ttl`. Evicts the oldest insertion when a new key would
    /// exceed capacity.
    pub fn put(&mut self, key: &str, value: V) {
        let now = self.clock.now();
        self.prune_expired(now);

        if self.entries.contains_key(key) {
            self.insertion_order.retain(|k| k != key);
        } else if self.entries.len() >= self.capacity {
            if !self.insertion_order.is_empty() {
                let oldest = self.insertion_order.remove(0);
                self.entries.remove(&oldest);
            }
        }

        self.insertion_order.push(key.to_string());
        self.entries.insert(
            key.to_string(),
            Slot {
                value,
                expires_at: now + self.ttl,
            },
        );
    }

    /// Look up a live entry. Expired entries behave as absent and are
    /// dropped; the TTL is not refreshed by reads.
    pub fn get(&mut self, key: &str) -> Option<V> {
        let now = self.clock.now();
        match self.entries.get(key) {
            Some(slot) if now < slot.expires_at => Some(slot.value.clone()),
            Some(_) => {
                self.entries.remove(key);
                self.insertion_order.retain(|k| k != key);
                None
            }
            None => None,
        }
    }

    /// Delete an entry if present; no-op otherwise.
    pub fn remove(&mut self, key: &str) {
        if self.entries.remove(key).is_some() {
            self.insertion_order.retain(|k| k != key);
        }
    }

    /// Number of live (unexpired) entries.
    pub fn len(&mut self) -> usize {
        let now = self.clock.now();
        self.prune_expired(now);
        self.entries.len()
    }

    fn prune_expired(&mut self, now: Instant) {
        let entries = &mut self.entries;
        self.insertion_order.retain(|key| {
            let live = entries
                .get(key)
                .map(|slot| now < slot.expires_at)
                .unwrap_or(false);
            if !live {
                entries.remove(key);
            }
            live
        });
    }
}
