//! # Route Cache Module
//!
//! Thread-safe memoization of path resolution.
//!
//! ## Overview
//!
//! Resolving a path walks every group and compares segment by segment. For a
//! service that sees the same handful of paths over and over, that work is pure
//! repetition: the routing tree never changes after the dispatcher is built, so
//! the outcome of a successful match for a given raw path never changes either.
//!
//! The cache maps the raw request path (query string excluded, no
//! normalization) to a [`CacheEntry`]: the match chain and the parameters the
//! match captured. A hit restores both into the fresh request context and skips
//! matching entirely; every group in the restored chain still runs its
//! middleware.
//!
//! ## Policy
//!
//! - Only successful matches are stored. Misses (404s) are never cached.
//! - Entries are never evicted. Memory grows with the number of distinct
//!   matched paths, which for parameterized routes is unbounded; disable the
//!   cache (`use_cache = false`) for such workloads or call [`RouteCache::clear`].
//! - Concurrent writers for the same key are harmless: the last write wins and
//!   every writer stores an equivalent entry.
//!
//! ## Thread Safety
//!
//! `parking_lot::RwLock<HashMap>`: many concurrent readers, exclusive writers.
//! Hit/miss counters are relaxed atomics and only feed monitoring.

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};

use parking_lot::RwLock;
use tracing::{debug, info};

use crate::context::Params;
use crate::router::MatchChain;

/// A memoized successful match.
#[derive(Debug, Clone, Default)]
pub struct CacheEntry {
    /// Routers traversed by the match, outermost first
    pub chain: MatchChain,
    /// Parameters captured by the match
    pub params: Params,
}

/// Path → match memo shared by all requests of one dispatcher.
///
/// # Example
///
/// ```rust
/// use restroute::route_cache::{CacheEntry, RouteCache};
///
/// let cache = RouteCache::new();
/// assert!(cache.get("/pets/1").is_none());
/// cache.set("/pets/1".to_string(), CacheEntry::default());
/// assert!(cache.get("/pets/1").is_some());
/// assert_eq!((cache.hits(), cache.misses()), (1, 1));
/// ```
#[derive(Debug, Default)]
pub struct RouteCache {
    entries: RwLock<HashMap<String, CacheEntry>>,
    hits: AtomicU64,
    misses: AtomicU64,
}

impl RouteCache {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Look up `path`. Returns an owned copy so no lock outlives the call.
    ///
    /// # Performance
    ///
    /// Read lock + one hash lookup + a clone of the chain (one `Arc` increment
    /// per nesting level) and of the captured params.
    pub fn get(&self, path: &str) -> Option<CacheEntry> {
        let found = self.entries.read().get(path).cloned();
        match found {
            Some(entry) => {
                self.hits.fetch_add(1, Ordering::Relaxed);
                debug!(path = %path, depth = entry.chain.len(), "Route cache hit");
                Some(entry)
            }
            None => {
                self.misses.fetch_add(1, Ordering::Relaxed);
                None
            }
        }
    }

    /// Store `entry` under `path`, replacing any previous entry.
    pub fn set(&self, path: String, entry: CacheEntry) {
        let mut entries = self.entries.write();
        let replaced = entries.insert(path, entry).is_some();
        debug!(cache_size = entries.len(), replaced, "Route cached");
    }

    /// Number of cached paths.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.read().len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.read().is_empty()
    }

    /// Drop every entry. Counters are kept.
    pub fn clear(&self) {
        let mut entries = self.entries.write();
        let dropped = entries.len();
        entries.clear();
        info!(dropped, "Route cache cleared");
    }

    #[must_use]
    pub fn hits(&self) -> u64 {
        self.hits.load(Ordering::Relaxed)
    }

    #[must_use]
    pub fn misses(&self) -> u64 {
        self.misses.load(Ordering::Relaxed)
    }
}
