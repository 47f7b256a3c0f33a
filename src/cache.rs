//! Change-aware document cache.
//!
//! Maps a storage location to its last normalized `Document`. A stored
//! entry is served only while the underlying content is provably
//! unchanged: a matching modification timestamp is the fast path, and a
//! recomputed content fingerprint is the source of truth whenever the
//! timestamp is missing or inconclusive. Entries are replaced whole per
//! key; a concurrent reader never observes a half-written entry.

use crate::document::Document;
use crate::types::{fingerprint, Fingerprint};
use parking_lot::Mutex;
use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant, SystemTime};
use tracing::trace;

/// Age threshold after which [`DocumentCache::prune`] drops entries.
/// Purely a memory bound: every lookup re-validates regardless of age.
pub const DEFAULT_MAX_AGE: Duration = Duration::from_secs(3600);

struct CacheEntry {
    document: Arc<Document>,
    fingerprint: Fingerprint,
    mtime: Option<SystemTime>,
    inserted_at: Instant,
}

/// Hit and occupancy counters.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CacheStats {
    pub size: usize,
    pub hits: u64,
    pub misses: u64,
}

impl CacheStats {
    pub fn hit_rate(&self) -> f64 {
        let total = self.hits + self.misses;
        if total == 0 {
            0.0
        } else {
            self.hits as f64 / total as f64
        }
    }
}

/// In-memory cache of parsed documents, keyed by storage location.
///
/// An explicit instance owned by its registry; independent registries
/// hold independent caches.
pub struct DocumentCache {
    entries: Mutex<HashMap<PathBuf, CacheEntry>>,
    max_age: Duration,
    hits: AtomicU64,
    misses: AtomicU64,
}

impl DocumentCache {
    pub fn new() -> Self {
        Self::with_max_age(DEFAULT_MAX_AGE)
    }

    pub fn with_max_age(max_age: Duration) -> Self {
        Self {
            entries: Mutex::new(HashMap::new()),
            max_age,
            hits: AtomicU64::new(0),
            misses: AtomicU64::new(0),
        }
    }

    /// Return the cached document iff the file at `path` is unchanged.
    ///
    /// An unreadable or vanished file is a miss, never an error.
    pub fn get(&self, path: &Path) -> Option<Arc<Document>> {
        let (document, recorded_fp, recorded_mtime) = {
            let entries = self.entries.lock();
            match entries.get(path) {
                Some(entry) => (
                    Arc::clone(&entry.document),
                    entry.fingerprint,
                    entry.mtime,
                ),
                None => {
                    self.misses.fetch_add(1, Ordering::Relaxed);
                    return None;
                }
            }
        };

        // Fast pre-check: an exact timestamp match proves the entry valid.
        if let Some(recorded) = recorded_mtime {
            if let Ok(meta) = fs::metadata(path) {
                if meta.modified().ok() == Some(recorded) {
                    self.hits.fetch_add(1, Ordering::Relaxed);
                    return Some(document);
                }
            }
        }

        // Slow path: the fingerprint decides.
        let bytes = match fs::read(path) {
            Ok(bytes) => bytes,
            Err(_) => {
                self.entries.lock().remove(path);
                self.misses.fetch_add(1, Ordering::Relaxed);
                return None;
            }
        };
        if fingerprint(&bytes) == recorded_fp {
            // Content unchanged; refresh the timestamp so the next lookup
            // takes the fast path again.
            let mtime = fs::metadata(path).ok().and_then(|m| m.modified().ok());
            let mut entries = self.entries.lock();
            if let Some(entry) = entries.remove(path) {
                entries.insert(path.to_path_buf(), CacheEntry { mtime, ..entry });
            }
            self.hits.fetch_add(1, Ordering::Relaxed);
            Some(document)
        } else {
            self.entries.lock().remove(path);
            self.misses.fetch_add(1, Ordering::Relaxed);
            None
        }
    }

    /// Store a parsed document, recording the fingerprint and timestamp
    /// of the content it was produced from.
    ///
    /// No entry is stored when the file cannot be re-read: an absent
    /// entry is always correct, a wrong one never is.
    pub fn set(&self, path: &Path, document: Arc<Document>) {
        let bytes = match fs::read(path) {
            Ok(bytes) => bytes,
            Err(err) => {
                trace!(path = %path.display(), error = %err, "skipping cache store for unreadable file");
                return;
            }
        };
        let fp = fingerprint(&bytes);
        let mtime = fs::metadata(path).ok().and_then(|m| m.modified().ok());
        trace!(
            path = %path.display(),
            fingerprint = %hex::encode(&fp[..8]),
            "cache store"
        );
        self.entries.lock().insert(
            path.to_path_buf(),
            CacheEntry {
                document,
                fingerprint: fp,
                mtime,
                inserted_at: Instant::now(),
            },
        );
    }

    /// Drop the entry for one location.
    pub fn invalidate(&self, path: &Path) {
        self.entries.lock().remove(path);
    }

    /// Drop all entries and reset the counters.
    pub fn clear(&self) {
        self.entries.lock().clear();
        self.hits.store(0, Ordering::Relaxed);
        self.misses.store(0, Ordering::Relaxed);
    }

    /// Drop entries older than the age threshold; returns how many went.
    pub fn prune(&self) -> usize {
        let mut entries = self.entries.lock();
        let before = entries.len();
        entries.retain(|_, entry| entry.inserted_at.elapsed() <= self.max_age);
        before - entries.len()
    }

    pub fn stats(&self) -> CacheStats {
        CacheStats {
            size: self.entries.lock().len(),
            hits: self.hits.load(Ordering::Relaxed),
            misses: self.misses.load(Ordering::Relaxed),
        }
    }
}

impl Default for DocumentCache {
    fn default() -> Self {
        Self::new()
    }
}
