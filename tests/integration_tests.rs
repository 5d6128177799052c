//! Integration tests for the combinator toolkit

use fncomb::prelude::*;
use std::collections::HashMap;

#[test]
fn test_memoized_result_matches_original() {
    let c = counted(&Func::from_fn(|n: u64| n * n));
    let m = memoize(c.func());

    assert_eq!(m.call(7), 49);
    assert_eq!(m.call(7), 49);
    // The second call was answered from the cache.
    assert_eq!(c.get_count(), 1);

    assert_eq!(m.call(8), 64);
    assert_eq!(c.get_count(), 2);
}

#[test]
fn test_rewrapping_returns_the_identical_handle() {
    let f = Func::from_fn(|n: i64| n + 1);

    let g1 = memoize(&f);
    let g2 = memoize(&f);
    let g3 = memoize(&g1);

    assert!(g1.ptr_eq(&g2));
    assert!(g1.ptr_eq(&g3));
    assert_eq!(g1, g2);
    assert!(!g1.ptr_eq(&f));
}

#[test]
fn test_memoize_operator_can_memoize_itself() {
    let target = Func::from_fn(|x: i64| x % 3 == 0);

    let memoize_op: Func<Func<i64, bool>, Func<i64, bool>> =
        Func::from_fn(|f: Func<i64, bool>| memoize(&f));
    let memoize_op = memoize(&memoize_op);

    let f1 = memoize_op.call(target.clone());
    let f2 = memoize_op.call(target.clone());

    assert!(f1.ptr_eq(&f2));
    assert!(f1.is_memoized());
    assert_eq!(f1.call(9), true);
    // Both applications resolved to one cache entry on the operator itself.
    assert_eq!(memoize_op.cache().map(|c| c.len()), Some(1));
}

#[test]
fn test_counter_ordering_is_observable() {
    let identity = Func::from_fn(|n: i64| n);

    // Counter outside the cache: cache hits still count.
    let outer = counted(&memoize(&identity));
    outer.call(5);
    outer.call(5);
    assert_eq!(outer.get_count(), 2);

    // Counter inside the cache: the repeated argument never reaches it.
    let inner = counted(&identity);
    let fast = memoize(inner.func());
    fast.call(5);
    fast.call(5);
    assert_eq!(inner.get_count(), 1);
}

#[test]
fn test_periodicity_on_a_finite_state_space() {
    assert!(detect_periodicity(
        |x: u64| (x * x + 1) % 255,
        2,
        DEFAULT_MAX_STEPS
    ));
}

#[test]
fn test_periodicity_rejects_the_successor_function() {
    assert!(!detect_periodicity(|x: u64| x + 1, 3, DEFAULT_MAX_STEPS));
}

#[test]
fn test_periodicity_of_a_constant_function() {
    assert!(detect_periodicity(|_: i64| 1, 5, DEFAULT_MAX_STEPS));
}

#[test]
fn test_memoized_fibonacci_through_its_own_handle() {
    let fib = Func::new(|fib: &Func<u64, u64>, n: u64| -> u64 {
        if n < 2 {
            1
        } else {
            fib.call(n - 1) + fib.call(n - 2)
        }
    });
    let fib = memoize(&fib);

    assert_eq!(fib.call(10), 89);

    let cache = fib.cache().expect("memoized handle exposes its cache");
    assert_eq!(cache.len(), 11);

    let mut keys = cache.keys();
    keys.sort_unstable();
    assert_eq!(keys, (0..=10).collect::<Vec<u64>>());
}

#[test]
fn test_recursion_collapses_to_one_call_per_argument() {
    let fib = Func::new(|fib: &Func<u64, u64>, n: u64| -> u64 {
        if n < 2 {
            1
        } else {
            fib.call(n - 1) + fib.call(n - 2)
        }
    });

    let c = counted(&fib);
    let m = memoize(c.func());

    assert_eq!(m.call(20), 10946);
    // A naive evaluation would make 21891 calls; memoized recursion makes
    // exactly one per distinct argument.
    assert_eq!(c.get_count(), 21);
}

#[test]
fn test_hofstadter_q_sequence() {
    let q = Func::new(|q: &Func<u64, u64>, n: u64| -> u64 {
        if n < 3 {
            1
        } else {
            q.call(n - q.call(n - 1)) + q.call(n - q.call(n - 2))
        }
    });
    let q = memoize(&q);

    assert_eq!(q.call(3), 2);
    assert_eq!(q.call(6), 4);
    assert_eq!(q.call(10), 6);
}

#[test]
fn test_collatz_step_counts_share_subproblems() {
    let collatz = Func::new(|c: &Func<u64, u64>, n: u64| -> u64 {
        if n == 1 {
            0
        } else if n % 2 == 0 {
            1 + c.call(n / 2)
        } else {
            1 + c.call(3 * n + 1)
        }
    });
    let collatz = memoize(&collatz);

    assert_eq!(collatz.call(1), 0);
    assert_eq!(collatz.call(6), 8);
    assert_eq!(collatz.call(7), 16);

    // The orbit of 7 passes through 16; its step count is already cached.
    assert!(collatz.cache().map(|c| c.contains(&16)).unwrap_or(false));
}

#[test]
fn test_thue_morse_collapses_repeated_subproblems() {
    let tm = Func::new(|tm: &Func<(u32, u8), String>, (n, sign): (u32, u8)| -> String {
        if n < 2 {
            sign.to_string()
        } else {
            let mut s = tm.call((n - 1, sign));
            s.push_str(&tm.call((n - 1, 1 - sign)));
            s
        }
    });

    let c = counted(&tm);
    let m = memoize(c.func());

    assert_eq!(m.call((4, 0)), "01101001");
    // Seven distinct (n, sign) pairs, seven evaluations; the naive
    // recursion would make fifteen.
    assert_eq!(c.get_count(), 7);
}

#[test]
fn test_unkeyable_arguments_leave_the_cache_untouched() {
    let size = Func::from_fn(|m: HashMap<(u32, u32), u32>| m.len());
    let memo = ContentMemo::new(&size);

    let mut composite = HashMap::new();
    composite.insert((1, 2), 3);

    let err = memo.call(composite).unwrap_err();
    assert!(matches!(err, MemoError::UnhashableArgument(_)));
    assert_eq!(memo.stats().entries, 0);
}

#[test]
fn test_content_keys_cover_float_arguments() {
    let scale = Func::from_fn(|x: f64| x * 2.5);
    let memo = ContentMemo::new(&scale);

    assert_eq!(memo.call(4.0).unwrap(), 10.0);
    assert_eq!(memo.call(4.0).unwrap(), 10.0);

    let stats = memo.stats();
    assert_eq!((stats.hits, stats.misses, stats.entries), (1, 1, 1));
}

#[test]
fn test_a_panicking_call_populates_nothing() {
    let flaky = Func::from_fn(|n: i64| {
        if n == 0 {
            panic!("undefined at zero");
        }
        100 / n
    });
    let m = memoize(&flaky);

    let outcome = std::panic::catch_unwind(std::panic::AssertUnwindSafe(|| m.call(0)));
    assert!(outcome.is_err());
    assert_eq!(m.cache().map(|c| c.len()), Some(0));

    // The handle stays usable and caches successful calls as before.
    assert_eq!(m.call(4), 25);
    assert_eq!(m.cache().map(|c| c.len()), Some(1));
}

#[test]
fn test_contexts_isolate_their_registries() {
    let a = Context::new();
    let b = Context::new();
    let f = Func::from_fn(|n: i64| n * n);

    let ga = a.memoize(&f);
    let gb = b.memoize(&f);

    assert!(!ga.ptr_eq(&gb));
    assert!(a.memoize(&f).ptr_eq(&ga));
    assert!(b.memoize(&f).ptr_eq(&gb));
}

#[test]
fn test_counting_composes_with_derived_combinators() {
    let is_odd = Func::from_fn(|n: i64| n % 2 != 0);
    let is_even = counted(&negate(&is_odd));

    assert!(is_even.call(2));
    assert!(!is_even.call(3));
    assert_eq!(is_even.get_count(), 2);
}

#[test]
fn test_cache_stats_display() {
    let ctx = Context::new();
    let m = ctx.memoize(&Func::from_fn(|n: u64| n + 1));

    m.call(1);
    m.call(1);
    m.call(2);

    let stats = m.cache().expect("memoized").stats();
    insta::assert_snapshot!(stats.to_string(), @r"
Cache statistics:
  Hits: 1 | Misses: 2 | Hit Rate: 33.3%
  Entries: 2
");
}
