//! # lrucache
//!
//! Bounded, thread-safe key-value cache with least-recently-used eviction.
//!
//! ## Architecture
//! - **Index**: AHash map from key to a slot handle (O(1) lookup)
//! - **Recency list**: Doubly-linked list over a slot arena, with head and
//!   tail sentinels (O(1) relink and eviction)
//! - **Locking**: One `parking_lot::Mutex` over index, list and counters, so
//!   every operation is atomic
//!
//! ## Example
//! ```
//! use lrucache::LruCache;
//!
//! let cache = LruCache::with_max_size(2).unwrap();
//! cache.add("a", 1);
//! cache.add("b", 2);
//! cache.get("a");
//! cache.add("c", 3); // evicts "b"
//!
//! assert_eq!(cache.get("b"), None);
//! assert_eq!(cache.describe(), "LruCache: c > a");
//! ```

#![warn(missing_docs)]

mod cache;
mod config;
mod error;
mod list;
mod stats;

pub use cache::LruCache;
pub use config::{CacheConfig, Capacity};
pub use error::{Error, Result};
pub use stats::CacheStats;
