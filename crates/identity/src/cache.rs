//! Memoised directory sniffing.
//!
//! [`DirCache`] maps the exact path a caller asked about to the identity the
//! walk found there, including the "nothing found" outcome. Entries are never
//! evicted or invalidated: a path whose markers change after the first lookup
//! keeps returning the original answer for the lifetime of the cache.
//!
//! The map is a [`DashMap`], so lookups from several threads only contend on
//! the shard holding the path. A miss computes without holding any shard lock
//! and inserts afterwards; two threads racing on the same new path may both
//! walk the filesystem, and the later insert wins.

use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};

use dashmap::DashMap;

use crate::Identity;
use crate::trace;

/// Cache of directory sniff results keyed by the queried path.
#[derive(Debug, Default)]
pub struct DirCache {
    entries: DashMap<PathBuf, Option<Identity>>,
    hits: AtomicU64,
    misses: AtomicU64,
}

impl DirCache {
    /// Creates an empty cache.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates an empty cache sized for `capacity` paths.
    #[must_use]
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            entries: DashMap::with_capacity(capacity),
            hits: AtomicU64::new(0),
            misses: AtomicU64::new(0),
        }
    }

    /// Returns the cached result for `path`, if any.
    ///
    /// The outer `Option` tells whether the path was cached; the inner one is
    /// the cached sniff result.
    #[must_use]
    pub fn get(&self, path: &Path) -> Option<Option<Identity>> {
        self.entries.get(path).map(|entry| *entry.value())
    }

    /// Returns the cached result for `path`, computing and storing it on a miss.
    pub fn get_or_compute<F>(&self, path: &Path, compute: F) -> Option<Identity>
    where
        F: FnOnce() -> Option<Identity>,
    {
        if let Some(cached) = self.get(path) {
            self.hits.fetch_add(1, Ordering::Relaxed);
            trace::cache_hit(path);
            return cached;
        }

        self.misses.fetch_add(1, Ordering::Relaxed);
        trace::cache_miss(path);
        let result = compute();
        self.entries.insert(path.to_path_buf(), result);
        result
    }

    /// Returns the number of cached paths.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns `true` when nothing has been cached yet.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Returns how many lookups were served from the cache.
    #[must_use]
    pub fn hits(&self) -> u64 {
        self.hits.load(Ordering::Relaxed)
    }

    /// Returns how many lookups had to compute a result.
    #[must_use]
    pub fn misses(&self) -> u64 {
        self.misses.load(Ordering::Relaxed)
    }
}
