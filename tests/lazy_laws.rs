#![cfg(feature = "control")]
//! Property-based tests for Lazy<T> laws.
//!
//! This module verifies that Lazy satisfies:
//!
//! - **Idempotence**: force() returns the same value every time
//! - **Memoization**: computation runs at most once
//! - **Functor Laws**: identity and composition
//! - **Monad Laws**: left identity, right identity, associativity
//! - **Chain Equivalence**: long sequencing chains agree with a direct fold

use lazyrec::control::Lazy;
use proptest::prelude::*;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

// =============================================================================
// Idempotence and Memoization
// =============================================================================

proptest! {
    /// Idempotence: calling force() multiple times returns the same value
    #[test]
    fn prop_lazy_idempotence(value in any::<String>()) {
        let expected = value.clone();
        let lazy = Lazy::new(move || value);

        let first = lazy.force().clone();
        let second = lazy.force().clone();

        prop_assert_eq!(&first, &second);
        prop_assert_eq!(first, expected);
    }

    /// Memoization: the computation runs exactly once for any number of forces
    #[test]
    fn prop_lazy_memoization(value in any::<i32>(), forces in 1_usize..32) {
        let call_count = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&call_count);
        let lazy = Lazy::new(move || {
            counter.fetch_add(1, Ordering::SeqCst);
            value
        });

        prop_assert_eq!(call_count.load(Ordering::SeqCst), 0);
        for _ in 0..forces {
            prop_assert_eq!(*lazy.force(), value);
        }
        prop_assert_eq!(call_count.load(Ordering::SeqCst), 1);
    }
}

// =============================================================================
// Functor Laws
// =============================================================================

proptest! {
    /// Functor Identity Law: lazy.map(|x| x) == lazy
    #[test]
    fn prop_lazy_functor_identity(value in any::<i32>()) {
        let lazy = Lazy::new(move || value);
        let mapped = Lazy::new(move || value).map(|x| x);
        prop_assert_eq!(*lazy.force(), *mapped.force());
    }

    /// Functor Composition Law: lazy.map(f).map(g) == lazy.map(|x| g(f(x)))
    #[test]
    fn prop_lazy_functor_composition(value in any::<i32>()) {
        let function1 = |n: i32| n.to_string();
        let function2 = |s: String| s.len();

        let left = Lazy::new(move || value).map(function1).map(function2);
        let right = Lazy::new(move || value).map(move |x| function2(function1(x)));

        prop_assert_eq!(*left.force(), *right.force());
    }
}

// =============================================================================
// Monad Laws
// =============================================================================

proptest! {
    /// Monad Left Identity: Lazy::pure(a).flat_map(f) == f(a)
    #[test]
    fn prop_lazy_monad_left_identity(value in any::<i32>()) {
        let function = |x: i32| Lazy::new(move || x.wrapping_mul(2));
        let left = Lazy::pure(value).flat_map(function);
        let right = function(value);
        prop_assert_eq!(*left.force(), *right.force());
    }

    /// Monad Right Identity: lazy.flat_map(Lazy::pure) == lazy
    #[test]
    fn prop_lazy_monad_right_identity(value in any::<i32>()) {
        let lazy = Lazy::new(move || value);
        let flat_mapped = Lazy::new(move || value).flat_map(Lazy::pure);
        prop_assert_eq!(*lazy.force(), *flat_mapped.force());
    }

    /// Monad Associativity:
    /// lazy.flat_map(f).flat_map(g) == lazy.flat_map(|x| f(x).flat_map(g))
    #[test]
    fn prop_lazy_monad_associativity(value in any::<i32>()) {
        let function1 = |x: i32| Lazy::new(move || x.wrapping_add(1));
        let function2 = |x: i32| Lazy::new(move || x.wrapping_mul(2));

        let left = Lazy::new(move || value).flat_map(function1).flat_map(function2);
        let right = Lazy::new(move || value).flat_map(move |x| function1(x).flat_map(function2));

        prop_assert_eq!(*left.force(), *right.force());
    }

    /// flatten is flat_map with identity
    #[test]
    fn prop_lazy_flatten_equivalence(value in any::<i64>()) {
        let left = Lazy::new(move || Lazy::new(move || value)).flatten();
        let right = Lazy::new(move || Lazy::new(move || value)).flat_map(|inner| inner);
        prop_assert_eq!(*left.force(), *right.force());
    }
}

// =============================================================================
// zip Laws
// =============================================================================

proptest! {
    /// zip_with applies function to both values
    #[test]
    fn prop_lazy_zip_with_applies_function(value1 in any::<i32>(), value2 in any::<i32>()) {
        let combined = Lazy::new(move || value1)
            .zip_with(Lazy::new(move || value2), |a, b| a.wrapping_add(b));
        prop_assert_eq!(*combined.force(), value1.wrapping_add(value2));
    }

    /// zip then map equals zip_with
    #[test]
    fn prop_lazy_zip_map_equivalence(value1 in any::<i32>(), value2 in any::<i32>()) {
        let left = Lazy::new(move || value1)
            .zip(Lazy::new(move || value2))
            .map(|(a, b)| a.wrapping_sub(b));
        let right = Lazy::new(move || value1)
            .zip_with(Lazy::new(move || value2), |a, b| a.wrapping_sub(b));
        prop_assert_eq!(*left.force(), *right.force());
    }
}

// =============================================================================
// Chain Equivalence
// =============================================================================

proptest! {
    /// A chain built from increments equals the direct sum of the increments,
    /// whether it is nested to the left or to the right.
    #[test]
    fn prop_lazy_chain_matches_fold(
        start in any::<i64>(),
        increments in prop::collection::vec(any::<i32>(), 0..256)
    ) {
        let expected = increments
            .iter()
            .fold(start, |total, &step| total.wrapping_add(i64::from(step)));

        let mut left = Lazy::new(move || start);
        for &step in &increments {
            left = left.flat_map(move |total| Lazy::pure(total.wrapping_add(i64::from(step))));
        }

        let right = increments.iter().rev().fold(
            Box::new(|total: i64| Lazy::pure(total)) as Box<dyn FnOnce(i64) -> Lazy<i64> + Send>,
            |next, &step| {
                Box::new(move |total: i64| {
                    Lazy::new(move || total.wrapping_add(i64::from(step))).flat_map(next)
                })
            },
        );
        let right = Lazy::new(move || start).flat_map(right);

        prop_assert_eq!(*left.force(), expected);
        prop_assert_eq!(*right.force(), expected);
    }
}
