//! Combinator context and the memoize operator
//!
//! A [`Context`] owns the [`WrapRegistry`] that makes memoization
//! idempotent. Clients that need isolation (tests, embedded uses) construct
//! their own; everyone else goes through the process-wide default via the
//! free [`memoize`] function.

use std::hash::Hash;

use once_cell::sync::Lazy;

use crate::func::Func;
use crate::memo;
use crate::registry::WrapRegistry;

/// Owner of the wrap-deduplication state for one family of combinators.
///
/// Memoized handles produced through one context are canonical within that
/// context: memoizing the same original twice returns the identical handle.
/// Two different contexts deduplicate independently.
#[derive(Debug, Default)]
pub struct Context {
    registry: WrapRegistry,
}

impl Context {
    /// Create a context with an empty registry.
    pub fn new() -> Self {
        Context {
            registry: WrapRegistry::new(),
        }
    }

    /// The registry backing this context.
    pub fn registry(&self) -> &WrapRegistry {
        &self.registry
    }

    /// Memoize a callable.
    ///
    /// Returns a handle with the same calling contract as `f`, backed by a
    /// result cache. The original must be a pure function of its argument;
    /// that assumption is never re-validated, and memoizing a function with
    /// side effects silently hides the repeats.
    ///
    /// Re-application is idempotent: memoizing an already-memoized handle
    /// returns that handle itself, and memoizing the same original twice
    /// returns the identical wrapped handle both times.
    pub fn memoize<A, R>(&self, f: &Func<A, R>) -> Func<A, R>
    where
        A: Eq + Hash + Clone + Send + Sync + 'static,
        R: Clone + Send + Sync + 'static,
    {
        if f.is_memoized() {
            return f.clone();
        }
        self.registry.register_or_get(f, |original| {
            tracing::debug!(id = %original.id(), "memoizing callable");
            memo::wrap(original)
        })
    }
}

static DEFAULT_CONTEXT: Lazy<Context> = Lazy::new(Context::new);

/// The process-wide default context.
pub fn default_context() -> &'static Context {
    &DEFAULT_CONTEXT
}

/// Memoize a callable through the process-wide default context.
///
/// See [`Context::memoize`] for the contract.
///
/// ```
/// use fncomb::{memoize, Func};
///
/// let square = Func::from_fn(|n: u64| n * n);
/// let fast = memoize(&square);
///
/// assert_eq!(fast.call(12), 144);
/// assert!(memoize(&square).ptr_eq(&fast));
/// assert!(memoize(&fast).ptr_eq(&fast));
/// ```
pub fn memoize<A, R>(f: &Func<A, R>) -> Func<A, R>
where
    A: Eq + Hash + Clone + Send + Sync + 'static,
    R: Clone + Send + Sync + 'static,
{
    DEFAULT_CONTEXT.memoize(f)
}
