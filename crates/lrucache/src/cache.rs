//! LruCache: hash index + recency list under a single lock

use std::borrow::Borrow;
use std::collections::HashMap;
use std::fmt::{self, Write as _};
use std::hash::Hash;

use ahash::RandomState;
use parking_lot::Mutex;
use tracing::{debug, trace};

use crate::config::{CacheConfig, Capacity};
use crate::error::Result;
use crate::list::{Handle, RecencyList};
use crate::stats::CacheStats;

/// Upper bound on slots reserved up front; larger caches grow on demand
const MAX_PREALLOCATED: usize = 4096;

/// Marker rendered by `describe` for an empty cache
const EMPTY_MARKER: &str = "[Empty]";

/// Separator between keys rendered by `describe`
const KEY_SEPARATOR: &str = " > ";

/// State guarded by the cache lock
struct Inner<K, V> {
    /// Key -> slot of the entry holding that key
    map: HashMap<K, Handle, RandomState>,

    /// Entries from most- to least-recently-used
    list: RecencyList<K, V>,

    stats: CacheStats,
}

impl<K, V> Inner<K, V>
where
    K: Hash + Eq,
{
    /// Drop the least-recently-used entry from both list and index
    ///
    /// Returns the size left behind, or `None` if there was nothing to evict.
    fn evict_lru(&mut self) -> Option<usize> {
        let (key, _) = self.list.pop_back()?;
        self.map.remove(&key);
        self.stats.record_eviction();
        Some(self.list.len())
    }

    #[cfg(test)]
    fn check_invariants(&self) -> std::result::Result<(), String> {
        self.list.check_links()?;
        if self.map.len() != self.list.len() {
            return Err(format!(
                "index holds {} keys, list holds {} entries",
                self.map.len(),
                self.list.len()
            ));
        }
        for (key, &handle) in &self.map {
            if self.list.key(handle) != Some(key) {
                return Err(format!("index handle {:?} points at another entry", handle));
            }
        }
        Ok(())
    }
}

/// Bounded, thread-safe key-value cache with least-recently-used eviction
///
/// `add`, `get` and `evict` run in O(1). Every operation takes one exclusive
/// lock for its whole duration, so each is atomic with respect to the others.
///
/// Adding a key that is already cached is ignored: neither its value nor its
/// recency changes.
pub struct LruCache<K, V> {
    inner: Mutex<Inner<K, V>>,

    /// Fixed at construction
    max_size: Capacity,
}

impl<K, V> LruCache<K, V>
where
    K: Hash + Eq + Clone,
    V: Clone,
{
    /// Create an unbounded cache; `add` never evicts
    pub fn new() -> Self {
        Self::with_config(CacheConfig::unbounded())
    }

    /// Create a cache holding at most `max_size` entries
    ///
    /// # Arguments
    /// * `max_size` - Number of entries beyond which `add` evicts the
    ///   least-recently-used entry
    ///
    /// # Returns
    /// * `Result<LruCache<K, V>>` - `Error::InvalidArgument` if `max_size` is zero
    pub fn with_max_size(max_size: usize) -> Result<Self> {
        Ok(Self::with_config(CacheConfig::bounded(max_size)?))
    }

    /// Create a cache from a validated config
    pub fn with_config(config: CacheConfig) -> Self {
        let max_size = config.max_size;
        let reserve = max_size.limit().unwrap_or(0).min(MAX_PREALLOCATED);
        debug!(max_size = %max_size, "created LRU cache");

        Self {
            inner: Mutex::new(Inner {
                map: HashMap::with_capacity_and_hasher(reserve, RandomState::new()),
                list: RecencyList::with_capacity(reserve),
                stats: CacheStats::default(),
            }),
            max_size,
        }
    }

    /// Insert a key-value pair as the most-recently-used entry
    ///
    /// If the key is already present the call does nothing. Otherwise, when
    /// the cache is full, the least-recently-used entry is evicted first.
    pub fn add(&self, key: K, value: V) {
        let mut inner = self.inner.lock();

        if inner.map.contains_key(&key) {
            drop(inner);
            trace!("ignored add for a key already cached");
            return;
        }

        let evicted = if self.max_size.is_reached_by(inner.list.len()) {
            inner.evict_lru()
        } else {
            None
        };

        let handle = inner.list.push_front(key.clone(), value);
        inner.map.insert(key, handle);
        inner.stats.record_insert();
        drop(inner);

        // Log only after the lock is released
        if let Some(size) = evicted {
            trace!(size, "evicted least-recently-used entry");
        }
    }

    /// Look up a key, marking it most-recently-used on a hit
    ///
    /// # Returns
    /// * `Option<V>` - A clone of the cached value, or `None` on a miss
    pub fn get<Q>(&self, key: &Q) -> Option<V>
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        let mut inner = self.inner.lock();

        let Some(handle) = inner.map.get(key).copied() else {
            inner.stats.record_miss();
            return None;
        };

        inner.stats.record_hit();
        inner.list.move_to_front(handle);
        inner.list.value(handle).cloned()
    }

    /// Remove the least-recently-used entry; does nothing on an empty cache
    pub fn evict(&self) {
        let evicted = self.inner.lock().evict_lru();
        if let Some(size) = evicted {
            trace!(size, "evicted least-recently-used entry");
        }
    }

    /// Get the current number of entries
    pub fn size(&self) -> usize {
        self.inner.lock().list.len()
    }

    /// Check if the cache is empty
    pub fn is_empty(&self) -> bool {
        self.size() == 0
    }

    /// Get the configured capacity
    pub fn max_size(&self) -> Capacity {
        self.max_size
    }

    /// Lookups that found their key since construction
    pub fn hits(&self) -> u64 {
        self.inner.lock().stats.hits
    }

    /// Lookups that missed since construction
    pub fn misses(&self) -> u64 {
        self.inner.lock().stats.misses
    }

    /// Get a consistent snapshot of all counters
    pub fn stats(&self) -> CacheStats {
        self.inner.lock().stats
    }

    /// Keys from most- to least-recently-used
    ///
    /// Does not count as a lookup and does not reorder entries.
    pub fn keys(&self) -> Vec<K> {
        let inner = self.inner.lock();
        inner.list.iter().map(|(key, _)| key.clone()).collect()
    }

    /// Render keys from most- to least-recently-used, e.g. `LruCache: c > b > a`
    pub fn describe(&self) -> String
    where
        K: fmt::Display,
    {
        let inner = self.inner.lock();

        let mut out = String::from("LruCache: ");
        if inner.list.is_empty() {
            out.push_str(EMPTY_MARKER);
            return out;
        }

        for (i, (key, _)) in inner.list.iter().enumerate() {
            if i > 0 {
                out.push_str(KEY_SEPARATOR);
            }
            // Writing into a String cannot fail
            let _ = write!(out, "{}", key);
        }
        out
    }

    #[cfg(test)]
    fn check_invariants(&self) -> std::result::Result<(), String> {
        self.inner.lock().check_invariants()
    }
}

impl<K, V> Default for LruCache<K, V>
where
    K: Hash + Eq + Clone,
    V: Clone,
{
    fn default() -> Self {
        Self::new()
    }
}

impl<K, V> fmt::Display for LruCache<K, V>
where
    K: Hash + Eq + Clone + fmt::Display,
    V: Clone,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        // Render first so the lock is not held while writing to `f`
        let rendered = self.describe();
        f.write_str(&rendered)
    }
}

impl<K, V> fmt::Debug for LruCache<K, V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let (size, stats) = {
            let inner = self.inner.lock();
            (inner.list.len(), inner.stats)
        };

        f.debug_struct("LruCache")
            .field("size", &size)
            .field("max_size", &self.max_size)
            .field("bounded", &self.max_size.is_bounded())
            .field("hits", &stats.hits)
            .field("misses", &stats.misses)
            .finish()
    }
}
