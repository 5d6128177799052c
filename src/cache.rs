//! Content-addressed argument keys
//!
//! The typed cache in [`crate::memo`] requires `Eq + Hash` arguments at
//! compile time. This module is the runtime-checked alternative: arguments
//! are projected to an [`ArgKey`] — a blake3 digest over their canonical
//! serialized form — and the projection itself can fail. A failed
//! projection aborts the call before the wrapped function runs and leaves
//! the cache untouched.

use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};

use blake3::Hasher;
use hashbrown::HashMap;
use parking_lot::RwLock;
use serde::Serialize;
use thiserror::Error;

use crate::func::Func;
use crate::memo::CacheStats;

/// Errors from the memoization engine.
#[derive(Debug, Error)]
pub enum MemoError {
    /// The call's arguments could not serve as a cache key.
    #[error("arguments cannot serve as a cache key: {0}")]
    UnhashableArgument(String),
}

/// A cache key derived from the content of a call's arguments.
///
/// Two argument values with the same canonical encoding map to the same
/// key; argument values with no canonical encoding (maps with composite
/// keys and the like) have no key at all.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ArgKey {
    digest: [u8; 32],
}

impl ArgKey {
    /// Project argument values to a key.
    ///
    /// Fails with [`MemoError::UnhashableArgument`] when the arguments have
    /// no canonical encoding.
    pub fn for_args<A: Serialize>(args: &A) -> Result<Self, MemoError> {
        let bytes = serde_json::to_vec(args)
            .map_err(|err| MemoError::UnhashableArgument(err.to_string()))?;

        let mut hasher = Hasher::new();
        hasher.update(&bytes);
        Ok(ArgKey {
            digest: *hasher.finalize().as_bytes(),
        })
    }

    /// The key as a hex string.
    pub fn to_hex(&self) -> String {
        self.digest.iter().map(|b| format!("{:02x}", b)).collect()
    }
}

impl fmt::Display for ArgKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_hex())
    }
}

/// A memoizing wrapper keyed by argument content.
///
/// This covers argument types that are serializable but cannot meet the
/// `Eq + Hash` bound of the typed path (floating-point arguments being the
/// common case). Because key projection can fail per call, invocation goes
/// through a fallible [`ContentMemo::call`] rather than the plain calling
/// contract.
///
/// The wrapped function must not call back into the same `ContentMemo`;
/// recursive functions belong on the typed path.
pub struct ContentMemo<A, R> {
    func: Func<A, R>,
    entries: RwLock<HashMap<ArgKey, R>>,

    hits: AtomicU64,
    misses: AtomicU64,
}

impl<A, R> ContentMemo<A, R> {
    /// Wrap a callable with a content-keyed result cache.
    pub fn new(f: &Func<A, R>) -> Self {
        ContentMemo {
            func: f.clone(),
            entries: RwLock::new(HashMap::new()),
            hits: AtomicU64::new(0),
            misses: AtomicU64::new(0),
        }
    }

    /// Invoke the wrapped callable, consulting the cache first.
    ///
    /// If the arguments cannot be projected to a key, the call fails before
    /// the wrapped function is invoked and no cache state changes. Once a
    /// key is present its value is never overwritten.
    pub fn call(&self, arg: A) -> Result<R, MemoError>
    where
        A: Serialize,
        R: Clone,
    {
        let key = ArgKey::for_args(&arg)?;

        if let Some(value) = self.entries.read().get(&key).cloned() {
            self.hits.fetch_add(1, Ordering::Relaxed);
            return Ok(value);
        }

        self.misses.fetch_add(1, Ordering::Relaxed);
        let value = self.func.call(arg);
        self.entries
            .write()
            .entry(key)
            .or_insert_with(|| value.clone());
        tracing::trace!(key = %key, "cached new content-keyed result");
        Ok(value)
    }

    /// Number of cached results.
    pub fn len(&self) -> usize {
        self.entries.read().len()
    }

    /// Whether the cache is empty.
    pub fn is_empty(&self) -> bool {
        self.entries.read().is_empty()
    }

    /// Current hit/miss statistics.
    pub fn stats(&self) -> CacheStats {
        CacheStats {
            hits: self.hits.load(Ordering::Relaxed),
            misses: self.misses.load(Ordering::Relaxed),
            entries: self.len(),
        }
    }
}

impl<A, R> fmt::Debug for ContentMemo<A, R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ContentMemo")
            .field("func", &self.func)
            .field("entries", &self.len())
            .finish()
    }
}
