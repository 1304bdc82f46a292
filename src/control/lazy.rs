//! Lazy evaluation with memoization and stack-safe sequencing.
//!
//! This module provides the `Lazy<T>` type for deferred computation.
//! Values are computed only when needed and cached for subsequent accesses.
//! Sequencing with [`Lazy::map`] and [`Lazy::flat_map`] builds up pending work
//! without forcing anything; forcing drives the whole chain in a loop, so chains
//! of any length evaluate without growing the call stack.
//!
//! # Thread Safety
//!
//! `Lazy<T>` is `Send` and `Sync` whenever `T` is. If several threads force the
//! same value, one of them runs the computation while the others wait, and all
//! of them observe the same cached result.
//!
//! # Poisoning
//!
//! If the computation panics, the panic is propagated to the forcing caller
//! unchanged and the lazy value becomes **poisoned**. A poisoned value never
//! reports a cached result: [`Lazy::force`] panics and [`Lazy::try_force`]
//! returns [`LazyPoisonedError`].
//!
//! # Examples
//!
//! ```rust
//! use lazyrec::control::Lazy;
//!
//! let lazy = Lazy::new(|| {
//!     println!("Computing...");
//!     42
//! });
//!
//! // No output yet - computation is deferred
//! println!("Created lazy value");
//!
//! // Now "Computing..." is printed
//! let value = lazy.force();
//! assert_eq!(*value, 42);
//!
//! // No recomputation - result is memoized
//! let value2 = lazy.force();
//! assert_eq!(*value2, 42);
//! ```

use std::fmt;
use std::panic::{AssertUnwindSafe, catch_unwind, resume_unwind};
use std::sync::OnceLock;
use std::sync::atomic::{AtomicBool, Ordering};

use parking_lot::Mutex;

use super::error::LazyPoisonedError;
use super::eval::{self, Eval};

/// A lazily evaluated value with memoization.
///
/// `Lazy<T>` defers computation until the value is first accessed via `force()`.
/// Once computed, the value is cached and subsequent calls to `force()` return
/// the cached value without recomputation.
///
/// # Type Parameters
///
/// * `T` - The type of the computed value
///
/// # Laws
///
/// `Lazy` forms a monad and satisfies, observed through `force()`:
///
/// - **Left Identity**: `Lazy::pure(a).flat_map(f) == f(a)`
/// - **Right Identity**: `m.flat_map(Lazy::pure) == m`
/// - **Associativity**: `m.flat_map(f).flat_map(g) == m.flat_map(|x| f(x).flat_map(g))`
///
/// # Examples
///
/// ## Memoization
///
/// ```rust
/// use lazyrec::control::Lazy;
/// use std::sync::Arc;
/// use std::sync::atomic::{AtomicUsize, Ordering};
///
/// let call_count = Arc::new(AtomicUsize::new(0));
/// let counter = Arc::clone(&call_count);
/// let lazy = Lazy::new(move || {
///     counter.fetch_add(1, Ordering::SeqCst);
///     42
/// });
///
/// assert_eq!(call_count.load(Ordering::SeqCst), 0); // Not called yet
///
/// let _ = lazy.force();
/// assert_eq!(call_count.load(Ordering::SeqCst), 1); // Called once
///
/// let _ = lazy.force();
/// assert_eq!(call_count.load(Ordering::SeqCst), 1); // Still only once - memoized
/// ```
///
/// ## Long Chains
///
/// ```rust
/// use lazyrec::control::Lazy;
///
/// let mut lazy = Lazy::pure(0_u64);
/// for _ in 0..100_000 {
///     lazy = lazy.flat_map(|value| Lazy::pure(value + 1));
/// }
/// assert_eq!(*lazy.force(), 100_000);
/// ```
pub struct Lazy<T> {
    value: OnceLock<T>,
    pending: Mutex<Option<Eval>>,
    poisoned: AtomicBool,
}

impl<T: Send + 'static> Lazy<T> {
    /// Creates a new lazy value with the given initialization function.
    ///
    /// The function will not be called until `force()` is invoked.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use lazyrec::control::Lazy;
    ///
    /// let lazy = Lazy::new(|| {
    ///     println!("Initializing...");
    ///     42
    /// });
    /// // Nothing printed yet
    /// assert!(!lazy.is_initialized());
    /// ```
    #[inline]
    pub fn new<F>(initializer: F) -> Self
    where
        F: FnOnce() -> T + Send + 'static,
    {
        Self::from_eval(Eval::defer(initializer))
    }

    /// Creates a new lazy value that is already initialized.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use lazyrec::control::Lazy;
    ///
    /// let lazy = Lazy::new_with_value(42);
    /// assert!(lazy.is_initialized());
    /// ```
    #[inline]
    pub fn new_with_value(value: T) -> Self {
        Self {
            value: OnceLock::from(value),
            pending: Mutex::new(None),
            poisoned: AtomicBool::new(false),
        }
    }

    /// Creates a pure lazy value (Applicative pure).
    ///
    /// This is equivalent to `new_with_value`.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use lazyrec::control::Lazy;
    ///
    /// let lazy = Lazy::pure(42);
    /// assert_eq!(*lazy.force(), 42);
    /// ```
    #[inline]
    pub fn pure(value: T) -> Self {
        Self::new_with_value(value)
    }

    #[inline]
    fn from_eval(eval: Eval) -> Self {
        Self {
            value: OnceLock::new(),
            pending: Mutex::new(Some(eval)),
            poisoned: AtomicBool::new(false),
        }
    }

    /// Forces evaluation of the lazy value and returns a reference to it.
    ///
    /// If the value has not been computed yet, the pending computation is run
    /// and the result is cached. Subsequent calls return the cached value.
    ///
    /// # Panics
    ///
    /// - If the computation panics. The original panic payload is propagated
    ///   and the lazy value becomes poisoned.
    /// - If the value is already poisoned from a previous panic.
    ///
    /// Forcing a value from inside its own computation deadlocks.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use lazyrec::control::Lazy;
    ///
    /// let lazy = Lazy::new(|| 42);
    /// assert_eq!(*lazy.force(), 42);
    /// ```
    pub fn force(&self) -> &T {
        match self.try_force() {
            Ok(value) => value,
            Err(error) => panic!("{error}"),
        }
    }

    /// Tries to force evaluation without panicking on poisoned state.
    ///
    /// # Errors
    ///
    /// Returns `Err(LazyPoisonedError)` if a previous evaluation panicked.
    ///
    /// # Panics
    ///
    /// Panics if the computation itself panics. The panic is not caught;
    /// only the poisoned state left behind by it is reported via `Result`.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use lazyrec::control::Lazy;
    /// use std::panic::{AssertUnwindSafe, catch_unwind};
    ///
    /// let lazy = Lazy::new(|| 42);
    /// assert_eq!(lazy.try_force().copied(), Ok(42));
    ///
    /// let poisoned = Lazy::new(|| -> i32 { panic!("init failed") });
    /// let _ = catch_unwind(AssertUnwindSafe(|| poisoned.force()));
    /// assert!(poisoned.try_force().is_err());
    /// ```
    pub fn try_force(&self) -> Result<&T, LazyPoisonedError> {
        if let Some(value) = self.value.get() {
            return Ok(value);
        }

        // Concurrent forcers queue up here; only the first finds pending work.
        let mut pending = self.pending.lock();
        if let Some(value) = self.value.get() {
            return Ok(value);
        }
        let eval = pending.take().ok_or(LazyPoisonedError)?;

        match catch_unwind(AssertUnwindSafe(|| eval::run(eval))) {
            Ok(result) => {
                let value = self.value.get_or_init(|| eval::unerase::<T>(result));
                drop(pending);
                Ok(value)
            }
            Err(payload) => {
                self.poisoned.store(true, Ordering::Release);
                drop(pending);
                tracing::debug!(
                    value_type = std::any::type_name::<T>(),
                    "lazy computation panicked, value is poisoned"
                );
                resume_unwind(payload)
            }
        }
    }

    /// Consumes the `Lazy` and returns the inner value.
    ///
    /// If the value has not been computed yet, it is computed now.
    ///
    /// # Errors
    ///
    /// Returns `Err(LazyPoisonedError)` if the lazy value is poisoned.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use lazyrec::control::Lazy;
    ///
    /// let lazy = Lazy::new(|| 42);
    /// assert_eq!(lazy.into_inner(), Ok(42));
    /// ```
    pub fn into_inner(self) -> Result<T, LazyPoisonedError> {
        let Self {
            value,
            pending,
            poisoned: _,
        } = self;
        if let Some(value) = value.into_inner() {
            return Ok(value);
        }
        let eval = pending.into_inner().ok_or(LazyPoisonedError)?;
        Ok(eval::unerase(eval::run(eval)))
    }

    /// Converts this value into its pending evaluation tree without forcing it.
    ///
    /// A poisoned value becomes a tree that panics when driven.
    fn into_eval(self) -> Eval {
        let Self {
            value,
            pending,
            poisoned: _,
        } = self;
        if let Some(value) = value.into_inner() {
            return Eval::ready(value);
        }
        pending.into_inner().unwrap_or_else(|| {
            Eval::defer(|| -> T { panic!("{}", LazyPoisonedError) })
        })
    }

    /// Applies a function to the lazy value, producing a new lazy value.
    ///
    /// Neither this value nor the function is evaluated until the result is forced.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use lazyrec::control::Lazy;
    ///
    /// let lazy = Lazy::new(|| 21);
    /// let doubled = lazy.map(|x| x * 2);
    ///
    /// assert_eq!(*doubled.force(), 42);
    /// ```
    pub fn map<U, G>(self, function: G) -> Lazy<U>
    where
        U: Send + 'static,
        G: FnOnce(T) -> U + Send + 'static,
    {
        Lazy::from_eval(
            self.into_eval()
                .bind(move |value: T| Eval::ready(function(value))),
        )
    }

    /// Applies a function that returns a Lazy, then flattens the result.
    ///
    /// This is the monadic bind operation for `Lazy`. The returned lazy value
    /// forces this one, feeds the result to `function` and forces the lazy value
    /// it returns. All of this happens inside a single evaluation loop, so
    /// arbitrarily long chains do not grow the call stack.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use lazyrec::control::Lazy;
    ///
    /// let lazy = Lazy::new(|| 21);
    /// let result = lazy.flat_map(|x| Lazy::new(move || x * 2));
    ///
    /// assert_eq!(*result.force(), 42);
    /// ```
    pub fn flat_map<U, G>(self, function: G) -> Lazy<U>
    where
        U: Send + 'static,
        G: FnOnce(T) -> Lazy<U> + Send + 'static,
    {
        Lazy::from_eval(
            self.into_eval()
                .bind(move |value: T| function(value).into_eval()),
        )
    }

    /// Alias for `flat_map`.
    #[inline]
    pub fn and_then<U, G>(self, function: G) -> Lazy<U>
    where
        U: Send + 'static,
        G: FnOnce(T) -> Lazy<U> + Send + 'static,
    {
        self.flat_map(function)
    }

    /// Sequences two lazy values, discarding the result of the first.
    ///
    /// The first value is still forced when the result is forced.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use lazyrec::control::Lazy;
    ///
    /// let result = Lazy::pure("ignored").then(Lazy::pure(42));
    /// assert_eq!(*result.force(), 42);
    /// ```
    #[inline]
    pub fn then<U: Send + 'static>(self, next: Lazy<U>) -> Lazy<U> {
        self.flat_map(move |_| next)
    }

    /// Combines two lazy values into a lazy tuple.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use lazyrec::control::Lazy;
    ///
    /// let lazy1 = Lazy::new(|| 1);
    /// let lazy2 = Lazy::new(|| "hello");
    /// let combined = lazy1.zip(lazy2);
    ///
    /// assert_eq!(*combined.force(), (1, "hello"));
    /// ```
    pub fn zip<U: Send + 'static>(self, other: Lazy<U>) -> Lazy<(T, U)> {
        self.zip_with(other, |first, second| (first, second))
    }

    /// Combines two lazy values using a function.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use lazyrec::control::Lazy;
    ///
    /// let lazy1 = Lazy::new(|| 20);
    /// let lazy2 = Lazy::new(|| 22);
    /// let sum = lazy1.zip_with(lazy2, |a, b| a + b);
    ///
    /// assert_eq!(*sum.force(), 42);
    /// ```
    pub fn zip_with<U, V, CombineFunction>(
        self,
        other: Lazy<U>,
        function: CombineFunction,
    ) -> Lazy<V>
    where
        U: Send + 'static,
        V: Send + 'static,
        CombineFunction: FnOnce(T, U) -> V + Send + 'static,
    {
        self.flat_map(move |first| other.map(move |second| function(first, second)))
    }
}

impl<T: Send + 'static> Lazy<Lazy<T>> {
    /// Removes one level of nesting (monadic join).
    ///
    /// # Examples
    ///
    /// ```rust
    /// use lazyrec::control::Lazy;
    ///
    /// let nested = Lazy::new(|| Lazy::new(|| 42));
    /// assert_eq!(*nested.flatten().force(), 42);
    /// ```
    #[inline]
    pub fn flatten(self) -> Lazy<T> {
        self.flat_map(std::convert::identity)
    }
}

impl<T> Lazy<T> {
    /// Returns a reference to the value if it has been initialized.
    ///
    /// Unlike `force()`, this method does not trigger initialization.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use lazyrec::control::Lazy;
    ///
    /// let lazy = Lazy::new(|| 42);
    /// assert!(lazy.get().is_none());
    ///
    /// let _ = lazy.force();
    /// assert_eq!(lazy.get(), Some(&42));
    /// ```
    #[inline]
    pub fn get(&self) -> Option<&T> {
        self.value.get()
    }

    /// Returns whether the value has been initialized.
    #[inline]
    pub fn is_initialized(&self) -> bool {
        self.value.get().is_some()
    }

    /// Returns whether the lazy value has been poisoned.
    ///
    /// A lazy value becomes poisoned if its computation panics.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use lazyrec::control::Lazy;
    /// use std::panic::{AssertUnwindSafe, catch_unwind};
    ///
    /// let lazy = Lazy::new(|| -> i32 { panic!("initialization failed") });
    ///
    /// let _ = catch_unwind(AssertUnwindSafe(|| lazy.force()));
    ///
    /// assert!(lazy.is_poisoned());
    /// ```
    #[inline]
    pub fn is_poisoned(&self) -> bool {
        self.poisoned.load(Ordering::Acquire)
    }
}

// =============================================================================
// Trait Implementations
// =============================================================================

impl<T: Default + Send + 'static> Default for Lazy<T> {
    /// Creates a lazy value that computes the default value of `T`.
    fn default() -> Self {
        Self::new(T::default)
    }
}

impl<T: Send + 'static> From<T> for Lazy<T> {
    fn from(value: T) -> Self {
        Self::new_with_value(value)
    }
}

impl<T: fmt::Debug> fmt::Debug for Lazy<T> {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.value.get() {
            Some(value) => formatter.debug_tuple("Lazy").field(value).finish(),
            None if self.is_poisoned() => {
                formatter.debug_tuple("Lazy").field(&"<poisoned>").finish()
            }
            None => formatter.debug_tuple("Lazy").field(&"<uninit>").finish(),
        }
    }
}

impl<T: fmt::Display> fmt::Display for Lazy<T> {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.value.get() {
            Some(value) => fmt::Display::fmt(value, formatter),
            None if self.is_poisoned() => formatter.write_str("<poisoned>"),
            None => formatter.write_str("<uninit>"),
        }
    }
}

static_assertions::assert_impl_all!(Lazy<i32>: Send, Sync);
static_assertions::assert_impl_all!(Lazy<String>: Send, Sync);
static_assertions::assert_not_impl_any!(Lazy<std::rc::Rc<i32>>: Send, Sync);
