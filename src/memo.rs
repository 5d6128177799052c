//! Typed result caches and the memoized wrapper
//!
//! A [`MemoCache`] maps argument values to computed results for one wrapped
//! function. The cache is insert-only: once an argument is present its value
//! is never overwritten, and entries are never removed for the lifetime of
//! the wrapped handle. Keyability is a compile-time capability here — the
//! argument type must be `Eq + Hash + Clone`. For argument types that cannot
//! meet that bound, see the runtime-checked path in [`crate::cache`].

use std::fmt;
use std::hash::Hash;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use dashmap::DashMap;

use crate::func::Func;

/// Result cache for one memoized function.
///
/// The key is the full argument value of a call (a tuple for multi-argument
/// functions): two calls with equal arguments map to the same entry. A cache
/// is created empty when its function is first memoized, grows monotonically,
/// and is dropped together with the memoized handle that owns it.
pub struct MemoCache<A, R> {
    entries: DashMap<A, R>,

    hits: AtomicU64,
    misses: AtomicU64,
}

impl<A, R> MemoCache<A, R>
where
    A: Eq + Hash + Clone,
    R: Clone,
{
    pub(crate) fn new() -> Self {
        MemoCache {
            entries: DashMap::new(),
            hits: AtomicU64::new(0),
            misses: AtomicU64::new(0),
        }
    }

    /// Get the cached result for an argument, if present.
    ///
    /// The value is cloned out, so no lock is held once this returns. Each
    /// lookup is recorded in the hit/miss statistics.
    pub fn get(&self, arg: &A) -> Option<R> {
        match self.entries.get(arg) {
            Some(entry) => {
                self.hits.fetch_add(1, Ordering::Relaxed);
                Some(entry.value().clone())
            }
            None => {
                self.misses.fetch_add(1, Ordering::Relaxed);
                None
            }
        }
    }

    /// Store a computed result. A key that is already present keeps its
    /// first value.
    pub(crate) fn insert(&self, arg: A, value: R) {
        self.entries.entry(arg).or_insert(value);
    }

    /// Whether a result is cached for the given argument.
    ///
    /// Unlike [`MemoCache::get`], this does not touch the statistics.
    pub fn contains(&self, arg: &A) -> bool {
        self.entries.contains_key(arg)
    }

    /// Number of cached results.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the cache is empty.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// All arguments currently cached.
    pub fn keys(&self) -> Vec<A> {
        self.entries.iter().map(|entry| entry.key().clone()).collect()
    }

    /// A point-in-time copy of the cache contents.
    ///
    /// The pairs are clones; mutating them does not affect stored results.
    pub fn snapshot(&self) -> Vec<(A, R)> {
        self.entries
            .iter()
            .map(|entry| (entry.key().clone(), entry.value().clone()))
            .collect()
    }

    /// Current hit/miss statistics.
    pub fn stats(&self) -> CacheStats {
        CacheStats {
            hits: self.hits.load(Ordering::Relaxed),
            misses: self.misses.load(Ordering::Relaxed),
            entries: self.entries.len(),
        }
    }
}

impl<A, R> fmt::Debug for MemoCache<A, R>
where
    A: Eq + Hash,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MemoCache")
            .field("entries", &self.entries.len())
            .finish()
    }
}

/// Statistics about cache usage.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CacheStats {
    /// Lookups answered from the cache.
    pub hits: u64,

    /// Lookups that fell through to the wrapped function.
    pub misses: u64,

    /// Number of cached results.
    pub entries: usize,
}

impl CacheStats {
    /// Cache hit rate (0.0 to 1.0).
    pub fn hit_rate(&self) -> f64 {
        let total = self.hits + self.misses;
        if total == 0 {
            0.0
        } else {
            self.hits as f64 / total as f64
        }
    }
}

impl fmt::Display for CacheStats {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Cache statistics:")?;
        writeln!(
            f,
            "  Hits: {} | Misses: {} | Hit Rate: {:.1}%",
            self.hits,
            self.misses,
            self.hit_rate() * 100.0
        )?;
        writeln!(f, "  Entries: {}", self.entries)?;
        Ok(())
    }
}

/// Build the memoized wrapper for an original callable.
///
/// The wrapper checks the cache first; on a miss it invokes the original
/// with the memoized handle as the recursion hook, so recursive sub-calls
/// land back in the cache. Results are stored only after the original
/// returns — a panic unwinds without leaving a partial entry.
pub(crate) fn wrap<A, R>(original: &Func<A, R>) -> Func<A, R>
where
    A: Eq + Hash + Clone + Send + Sync + 'static,
    R: Clone + Send + Sync + 'static,
{
    let cache = Arc::new(MemoCache::new());
    let lookup = Arc::clone(&cache);
    let inner = original.clone();

    Func::memoized(
        move |this: &Func<A, R>, arg: A| -> R {
            if let Some(value) = lookup.get(&arg) {
                return value;
            }
            let value = inner.call_with(this, arg.clone());
            lookup.insert(arg, value.clone());
            tracing::trace!(entries = lookup.len(), "cached new result");
            value
        },
        cache,
    )
}
