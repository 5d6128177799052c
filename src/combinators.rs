//! Stateless combinators
//!
//! Small wrappers that derive a new callable from existing ones without
//! carrying any state of their own. The results are plain [`Func`] handles
//! and compose freely with memoization and counting.

use crate::func::Func;

/// Negate a predicate.
///
/// ```
/// use fncomb::{negate, Func};
///
/// let is_odd = Func::from_fn(|n: i64| n % 2 != 0);
/// let is_even = negate(&is_odd);
///
/// assert!(is_even.call(2));
/// assert!(!is_even.call(3));
/// ```
pub fn negate<A>(f: &Func<A, bool>) -> Func<A, bool>
where
    A: Send + Sync + 'static,
{
    let inner = f.clone();
    Func::new(move |this: &Func<A, bool>, arg: A| !inner.call_with(this, arg))
}

/// The pointwise maximum of a set of functions.
///
/// Returns a callable whose value at `x` is the largest of `f(x)` over all
/// the given functions.
///
/// # Panics
///
/// Panics if `funcs` is empty — there is no maximum of zero functions.
pub fn max_of<A, R>(funcs: Vec<Func<A, R>>) -> Func<A, R>
where
    A: Clone + Send + Sync + 'static,
    R: Ord + Send + Sync + 'static,
{
    assert!(!funcs.is_empty(), "max_of requires at least one function");

    Func::new(move |_this: &Func<A, R>, arg: A| {
        funcs
            .iter()
            .map(|f| f.call(arg.clone()))
            .max()
            .expect("funcs is non-empty")
    })
}
