//! Call-counting instrumentation
//!
//! [`counted`] wraps a callable so that every invocation increments a
//! counter before delegating. The counter is an owned state cell on the
//! wrapper; reading or resetting it never touches the wrapped function or
//! any cache it may carry.

use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use crate::func::Func;

/// An owned invocation counter.
#[derive(Debug, Default)]
pub struct CallCount {
    calls: AtomicU64,
}

impl CallCount {
    /// Create a counter at zero.
    pub fn new() -> Self {
        CallCount {
            calls: AtomicU64::new(0),
        }
    }

    /// Record one call.
    pub fn record_call(&self) {
        self.calls.fetch_add(1, Ordering::Relaxed);
    }

    /// Current count, without side effects.
    pub fn get(&self) -> u64 {
        self.calls.load(Ordering::Relaxed)
    }

    /// Reset the count to zero.
    pub fn reset(&self) {
        self.calls.store(0, Ordering::Relaxed);
    }
}

/// A counted callable: delegates to the wrapped function unchanged, but
/// maintains an invocation count.
///
/// Composition order matters and is intentional. Counting outside a
/// memoized function observes every external call, cache hits included;
/// memoizing a counted function means cache hits bypass the counter:
///
/// ```
/// use fncomb::{counted, memoize, Func};
///
/// let identity = Func::from_fn(|n: i64| n);
///
/// // Counter outside the cache: hits still count.
/// let outer = counted(&memoize(&identity));
/// outer.call(5);
/// outer.call(5);
/// assert_eq!(outer.get_count(), 2);
///
/// // Counter inside the cache: the second call never reaches it.
/// let inner = counted(&identity);
/// let fast = memoize(inner.func());
/// fast.call(5);
/// fast.call(5);
/// assert_eq!(inner.get_count(), 1);
/// ```
pub struct Counted<A, R> {
    func: Func<A, R>,
    count: Arc<CallCount>,
}

/// Wrap a callable with an invocation counter.
///
/// The recursion hook passes through the wrapper, so recursive sub-calls
/// are counted at the outermost handle they enter through.
pub fn counted<A, R>(f: &Func<A, R>) -> Counted<A, R>
where
    A: Send + Sync + 'static,
    R: Send + Sync + 'static,
{
    let count = Arc::new(CallCount::new());
    let recorder = Arc::clone(&count);
    let inner = f.clone();

    let func = Func::new(move |this: &Func<A, R>, arg: A| -> R {
        recorder.record_call();
        inner.call_with(this, arg)
    });

    Counted { func, count }
}

impl<A, R> Counted<A, R> {
    /// Invoke the wrapped callable, incrementing the count.
    pub fn call(&self, arg: A) -> R {
        self.func.call(arg)
    }

    /// Number of invocations since creation or the last reset.
    pub fn get_count(&self) -> u64 {
        self.count.get()
    }

    /// Reset the count to zero. Any cache on the wrapped function is
    /// unaffected.
    pub fn reset_count(&self) {
        self.count.reset();
    }

    /// The counted callable as a composable handle.
    ///
    /// Further wrapping (e.g. memoization) goes through this handle; the
    /// counter keeps reporting through [`Counted::get_count`].
    pub fn func(&self) -> &Func<A, R> {
        &self.func
    }
}

impl<A, R> fmt::Debug for Counted<A, R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Counted")
            .field("func", &self.func)
            .field("count", &self.count.get())
            .finish()
    }
}
