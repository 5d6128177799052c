//! Function combinators
//!
//! This crate treats functions as data: higher-order utilities transform an
//! arbitrary callable into a new callable with additional behavior, while
//! preserving its calling contract.
//!
//! # Architecture
//!
//! Everything wraps the [`Func`] handle, a cheaply cloneable first-class
//! callable with identity. The combinators compose by wrapping one handle
//! in another:
//!
//! - [`memoize`] returns a handle backed by a result cache; re-memoizing an
//!   already-memoized handle (or the same original twice) returns the
//!   identical wrapped handle rather than stacking caches.
//! - [`counted`] returns a wrapper that counts every invocation and exposes
//!   read/reset access to the count.
//! - [`detect_periodicity`] walks a function's iteration sequence with two
//!   cursors in constant space to decide eventual periodicity.
//! - [`negate`] and [`max_of`] derive new callables from existing ones.
//!
//! Recursive functions are written in open-recursion style — the closure
//! calls back through the handle it was invoked on — so once memoized, an
//! exponential recursion collapses to one evaluation per distinct argument.
//!
//! # Example
//!
//! ```
//! use fncomb::{memoize, Func};
//!
//! let fib = Func::new(|fib: &Func<u64, u64>, n: u64| -> u64 {
//!     if n < 2 {
//!         1
//!     } else {
//!         fib.call(n - 1) + fib.call(n - 2)
//!     }
//! });
//!
//! let fib = memoize(&fib);
//! assert_eq!(fib.call(10), 89);
//!
//! // One cache entry per distinct argument, nothing more.
//! assert_eq!(fib.cache().unwrap().len(), 11);
//! ```
//!
//! The engine assumes wrapped functions are pure: caching a function with
//! side effects silently hides the repeats. The combinators themselves are
//! specified for single-threaded synchronous use; no operation suspends or
//! blocks.

#![warn(missing_docs)]
#![warn(missing_debug_implementations)]

pub mod cache;
pub mod combinators;
pub mod context;
pub mod counter;
pub mod cycle;
pub mod func;
pub mod memo;
pub mod registry;

pub use cache::{ArgKey, ContentMemo, MemoError};
pub use combinators::{max_of, negate};
pub use context::{default_context, memoize, Context};
pub use counter::{counted, CallCount, Counted};
pub use cycle::{detect_periodicity, DEFAULT_MAX_STEPS};
pub use func::{Func, FuncId};
pub use memo::{CacheStats, MemoCache};
pub use registry::WrapRegistry;

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::cache::{ArgKey, ContentMemo, MemoError};
    pub use crate::combinators::{max_of, negate};
    pub use crate::context::{default_context, memoize, Context};
    pub use crate::counter::{counted, Counted};
    pub use crate::cycle::{detect_periodicity, DEFAULT_MAX_STEPS};
    pub use crate::func::{Func, FuncId};
}
