//! Callable handles and identity
//!
//! This module defines [`Func`], the polymorphic callable abstraction that
//! every combinator in this crate wraps and returns. A `Func` is a cheaply
//! cloneable handle; all clones share one underlying closure, and identity
//! ([`FuncId`]) is the identity of that shared allocation.

use std::fmt;
use std::hash::{Hash, Hasher};
use std::sync::Arc;

use crate::memo::MemoCache;

/// Unique identity of a callable handle.
///
/// Two handles have the same `FuncId` exactly when they are clones of the
/// same underlying callable. The id is derived from the shared allocation,
/// so it is stable for the lifetime of the handle and all of its clones.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct FuncId(usize);

impl fmt::Display for FuncId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "fn@{:#x}", self.0)
    }
}

type RunFn<A, R> = dyn Fn(&Func<A, R>, A) -> R + Send + Sync;

struct Inner<A, R> {
    /// The wrapped computation. The first parameter is the recursion hook:
    /// the handle the call entered through, passed back down so that a
    /// recursive function reaches its own outermost wrapper.
    run: Box<RunFn<A, R>>,

    /// Present only on handles produced by memoization.
    cache: Option<Arc<MemoCache<A, R>>>,
}

/// A first-class callable from `A` to `R`.
///
/// `Func` values are handles: cloning is cheap and every clone refers to the
/// same underlying closure. Equality and hashing are by handle identity, not
/// by behavior, which is what makes "wrapping the same function twice yields
/// the same wrapper" an observable property.
///
/// Recursive functions are written in open-recursion style: the closure
/// receives a reference to the handle it was invoked through and uses it for
/// sub-calls. Once the handle is memoized, those sub-calls hit the cache.
///
/// ```
/// use fncomb::Func;
///
/// let fib = Func::new(|fib: &Func<u64, u64>, n: u64| -> u64 {
///     if n < 2 {
///         1
///     } else {
///         fib.call(n - 1) + fib.call(n - 2)
///     }
/// });
/// assert_eq!(fib.call(10), 89);
/// ```
pub struct Func<A, R> {
    inner: Arc<Inner<A, R>>,
}

impl<A, R> Func<A, R> {
    /// Create a callable from a closure written in open-recursion style.
    ///
    /// The closure's first parameter is the handle the call entered through;
    /// use it for recursive sub-calls. Non-recursive closures can ignore it,
    /// or use [`Func::from_fn`].
    pub fn new(run: impl Fn(&Func<A, R>, A) -> R + Send + Sync + 'static) -> Self {
        Func {
            inner: Arc::new(Inner {
                run: Box::new(run),
                cache: None,
            }),
        }
    }

    /// Create a callable from a plain closure with no recursion hook.
    pub fn from_fn(f: impl Fn(A) -> R + Send + Sync + 'static) -> Self {
        Self::new(move |_, arg| f(arg))
    }

    /// Construct a memoized handle. Only the memoization engine builds these.
    pub(crate) fn memoized(
        run: impl Fn(&Func<A, R>, A) -> R + Send + Sync + 'static,
        cache: Arc<MemoCache<A, R>>,
    ) -> Self {
        Func {
            inner: Arc::new(Inner {
                run: Box::new(run),
                cache: Some(cache),
            }),
        }
    }

    /// Invoke the callable with this handle as the recursion hook.
    pub fn call(&self, arg: A) -> R {
        (self.inner.run)(self, arg)
    }

    /// Invoke the underlying closure with an explicit recursion hook.
    ///
    /// Wrappers use this to forward the outermost handle down the chain, so
    /// recursion is always observed by every layer of wrapping.
    pub(crate) fn call_with(&self, hook: &Func<A, R>, arg: A) -> R {
        (self.inner.run)(hook, arg)
    }

    /// The identity of this handle.
    pub fn id(&self) -> FuncId {
        FuncId(Arc::as_ptr(&self.inner) as *const () as usize)
    }

    /// Whether two handles refer to the same underlying callable.
    pub fn ptr_eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.inner, &other.inner)
    }

    /// Whether this handle was produced by memoization.
    pub fn is_memoized(&self) -> bool {
        self.inner.cache.is_some()
    }

    /// Read access to the result cache of a memoized handle.
    ///
    /// Returns `None` for handles that are not memoized. The cache only
    /// exposes reads and snapshots; stored values cannot be mutated through
    /// it.
    pub fn cache(&self) -> Option<&MemoCache<A, R>> {
        self.inner.cache.as_deref()
    }
}

impl<A, R> Clone for Func<A, R> {
    fn clone(&self) -> Self {
        Func {
            inner: Arc::clone(&self.inner),
        }
    }
}

/// Identity-based equality: two handles are equal when they are clones of
/// the same underlying callable.
impl<A, R> PartialEq for Func<A, R> {
    fn eq(&self, other: &Self) -> bool {
        self.ptr_eq(other)
    }
}

impl<A, R> Eq for Func<A, R> {}

/// Identity-based hashing, consistent with the identity-based equality.
impl<A, R> Hash for Func<A, R> {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.id().hash(state);
    }
}

impl<A, R> fmt::Debug for Func<A, R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Func")
            .field("id", &self.id())
            .field("memoized", &self.is_memoized())
            .finish()
    }
}
