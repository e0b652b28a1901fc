//! Cache Store Module
//!
//! Fingerprint-keyed response storage with modification-time invalidation.
//! No size bound and no expiry: an entry lives until its files change.

use std::collections::HashMap;
use std::path::Path;
use std::sync::{Arc, Mutex};
use std::time::SystemTime;

use tracing::debug;

use crate::cache::{CacheEntry, CacheStats};
use crate::fingerprint::Fingerprint;

/// Cache store shared across request tasks behind a single mutex.
pub type SharedCache = Arc<Mutex<CacheStore>>;

// == Cache Store ==
/// Response cache keyed by request fingerprint.
#[derive(Debug, Default)]
pub struct CacheStore {
    /// Fingerprint to response snapshot
    entries: HashMap<Fingerprint, Arc<CacheEntry>>,
    /// Performance statistics
    stats: CacheStats,
}

impl CacheStore {
    // == Constructor ==
    pub fn new() -> Self {
        Self::default()
    }

    /// Wraps a new store for sharing across tasks.
    pub fn shared() -> SharedCache {
        Arc::new(Mutex::new(Self::new()))
    }

    // == Lookup ==
    /// Returns the entry for `fingerprint`, counting a hit or a miss.
    pub fn lookup(&mut self, fingerprint: &Fingerprint) -> Option<Arc<CacheEntry>> {
        match self.entries.get(fingerprint) {
            Some(entry) => {
                self.stats.record_hit();
                Some(Arc::clone(entry))
            }
            None => {
                self.stats.record_miss();
                None
            }
        }
    }

    /// Returns the entry for `fingerprint` without touching statistics.
    pub fn peek(&self, fingerprint: &Fingerprint) -> Option<Arc<CacheEntry>> {
        self.entries.get(fingerprint).cloned()
    }

    // == Maybe Invalidate ==
    /// Drops the entry for `fingerprint` if `path` was modified after the
    /// entry was served. A missing or unreadable file leaves the entry alone.
    ///
    /// Returns true if an entry was removed.
    pub fn maybe_invalidate(&mut self, fingerprint: &Fingerprint, path: &Path) -> bool {
        match std::fs::metadata(path).and_then(|meta| meta.modified()) {
            Ok(modified) => self.invalidate_if_modified(fingerprint, modified),
            Err(_) => false,
        }
    }

    /// Drops the entry for `fingerprint` if `modified` is strictly later than
    /// its serve time. Callers that stat asynchronously use this directly so
    /// no filesystem access happens under the lock.
    pub fn invalidate_if_modified(&mut self, fingerprint: &Fingerprint, modified: SystemTime) -> bool {
        let stale = self
            .entries
            .get(fingerprint)
            .is_some_and(|entry| entry.is_stale(modified));

        if stale {
            self.entries.remove(fingerprint);
            self.stats.record_invalidation();
            self.stats.set_total_entries(self.entries.len());
            debug!(fingerprint = %fingerprint, "Invalidated stale cache entry");
        }
        stale
    }

    // == Store ==
    /// Inserts or wholesale-replaces the entry for `fingerprint`.
    pub fn store(&mut self, fingerprint: Fingerprint, entry: CacheEntry) -> Arc<CacheEntry> {
        let entry = Arc::new(entry);
        self.entries.insert(fingerprint, Arc::clone(&entry));
        self.stats.set_total_entries(self.entries.len());
        entry
    }

    // == Stats ==
    /// Returns current cache statistics.
    pub fn stats(&self) -> CacheStats {
        let mut stats = self.stats.clone();
        stats.set_total_entries(self.entries.len());
        stats
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
