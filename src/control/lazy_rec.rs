//! Lazy, stack-safe self-recursion.
//!
//! [`LazyRec`] turns a step function of the shape
//! `(self-reference, input) -> Lazy<output>` into a single [`Lazy`] that, when
//! forced, runs the recursion to completion. Each call through the
//! self-reference only builds another unforced `Lazy`; the chain is flattened
//! into the value being forced and driven by its evaluation loop, so the depth
//! of the recursion is limited by memory rather than by the call stack.
//!
//! # Examples
//!
//! ## Factorial
//!
//! ```rust
//! use lazyrec::control::{Lazy, lazy_rec};
//!
//! let factorial = lazy_rec(
//!     |fact, x: u64| {
//!         if x == 1 {
//!             Lazy::pure(1)
//!         } else {
//!             fact.call(x - 1).map(move |y| y * x)
//!         }
//!     },
//!     20,
//! );
//!
//! assert_eq!(*factorial.force(), 2_432_902_008_176_640_000);
//! ```
//!
//! ## Binary Recursion
//!
//! ```rust
//! use lazyrec::control::{Lazy, lazy_rec_fn};
//!
//! let fibonacci = lazy_rec_fn(|fib, n: u32| {
//!     if n < 2 {
//!         Lazy::pure(u64::from(n))
//!     } else {
//!         fib.call(n - 1).zip_with(fib.call(n - 2), |a, b| a + b)
//!     }
//! });
//!
//! assert_eq!(*fibonacci(20).force(), 6765);
//! ```

use std::fmt;
use std::marker::PhantomData;
use std::sync::Arc;

use super::lazy::Lazy;

type StepFunction<A, B> = dyn Fn(Recur<A, B>, A) -> Lazy<B> + Send + Sync;

/// The self-reference handed to a step function.
///
/// Calling [`Recur::call`] with a new input returns a fresh, unforced [`Lazy`]
/// that applies the same step function to that input. Handles are cheap to clone
/// and may be moved into the closures passed to [`Lazy::map`] or
/// [`Lazy::flat_map`].
pub struct Recur<A, B> {
    step: Arc<StepFunction<A, B>>,
}

impl<A: Send + 'static, B: Send + 'static> Recur<A, B> {
    /// Continues the recursion with `input`.
    ///
    /// Nothing runs until the returned value is forced.
    #[inline]
    pub fn call(&self, input: A) -> Lazy<B> {
        unfold(Arc::clone(&self.step), input)
    }
}

impl<A, B> Clone for Recur<A, B> {
    fn clone(&self) -> Self {
        Self {
            step: Arc::clone(&self.step),
        }
    }
}

impl<A, B> fmt::Debug for Recur<A, B> {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter.debug_tuple("Recur").field(&"<step>").finish()
    }
}

/// Builds `join(lazy(|| step(self, input)))`.
fn unfold<A, B>(step: Arc<StepFunction<A, B>>, input: A) -> Lazy<B>
where
    A: Send + 'static,
    B: Send + 'static,
{
    Lazy::new(move || {
        let recur = Recur {
            step: Arc::clone(&step),
        };
        step(recur, input)
    })
    .flatten()
}

/// The lazy recursion combinator.
///
/// `LazyRec` is a stateless, zero-sized value, so a single instance can be
/// copied and shared between any number of threads. It only fixes the input
/// type `A` and output type `B` of the recursion.
///
/// # Examples
///
/// ```rust
/// use lazyrec::control::{Lazy, LazyRec};
///
/// let count_down = LazyRec::<u64, &str>::new().apply(
///     |recur, n| {
///         if n == 0 {
///             Lazy::pure("done")
///         } else {
///             recur.call(n - 1)
///         }
///     },
///     1_000_000,
/// );
///
/// assert_eq!(*count_down.force(), "done");
/// ```
pub struct LazyRec<A, B> {
    _marker: PhantomData<fn(A) -> B>,
}

impl<A, B> LazyRec<A, B> {
    /// Returns the combinator.
    #[inline]
    pub const fn new() -> Self {
        Self {
            _marker: PhantomData,
        }
    }
}

impl<A: Send + 'static, B: Send + 'static> LazyRec<A, B> {
    /// Produces a lazy result for `step` applied to `input`.
    ///
    /// Construction performs no recursive calls and does not invoke `step`.
    /// Forcing the result invokes `step` once per recursive step until it
    /// returns a value that does not call its self-reference.
    pub fn apply<F>(self, step: F, input: A) -> Lazy<B>
    where
        F: Fn(Recur<A, B>, A) -> Lazy<B> + Send + Sync + 'static,
    {
        unfold(Arc::new(step), input)
    }

    /// Fixes `step` and returns a function from input to lazy result.
    ///
    /// Every call of the returned function starts an independent recursion;
    /// results are not shared between calls.
    pub fn bind<F>(self, step: F) -> impl Fn(A) -> Lazy<B> + Send + Sync + 'static
    where
        F: Fn(Recur<A, B>, A) -> Lazy<B> + Send + Sync + 'static,
    {
        let step: Arc<StepFunction<A, B>> = Arc::new(step);
        move |input: A| unfold(Arc::clone(&step), input)
    }
}

impl<A, B> Clone for LazyRec<A, B> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<A, B> Copy for LazyRec<A, B> {}

impl<A, B> Default for LazyRec<A, B> {
    fn default() -> Self {
        Self::new()
    }
}

impl<A, B> fmt::Debug for LazyRec<A, B> {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter.write_str("LazyRec")
    }
}

/// Produces a lazy result for `step` applied to `input`.
///
/// Shorthand for `LazyRec::new().apply(step, input)`.
#[inline]
pub fn lazy_rec<A, B, F>(step: F, input: A) -> Lazy<B>
where
    A: Send + 'static,
    B: Send + 'static,
    F: Fn(Recur<A, B>, A) -> Lazy<B> + Send + Sync + 'static,
{
    lazy_rec_fn(step)(input)
}

/// Fixes `step` and returns a function from input to lazy result.
///
/// Shorthand for `LazyRec::new().bind(step)`.
#[inline]
pub fn lazy_rec_fn<A, B, F>(step: F) -> impl Fn(A) -> Lazy<B> + Send + Sync + 'static
where
    A: Send + 'static,
    B: Send + 'static,
    F: Fn(Recur<A, B>, A) -> Lazy<B> + Send + Sync + 'static,
{
    LazyRec::<A, B>::new().bind(step)
}

static_assertions::assert_eq_size!(LazyRec<u64, String>, ());
static_assertions::assert_impl_all!(LazyRec<u64, String>: Send, Sync, Copy);
static_assertions::assert_impl_all!(Recur<u64, String>: Send, Sync, Clone);
