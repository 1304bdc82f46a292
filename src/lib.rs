//! # lazyrec
//!
//! Memoized lazy values and a stack-safe lazy recursion combinator.
//!
//! ## Overview
//!
//! - **`Lazy`**: A deferred value that is computed at most once, even when
//!   forced from several threads. `map` and `flat_map` chains of any length
//!   are evaluated by a loop, never by nested calls.
//! - **`LazyRec`**: Turns a step function that receives a self-reference into
//!   a single `Lazy` result. Deep recursion is bounded by memory rather than
//!   by the call stack.
//!
//! ## Feature Flags
//!
//! - `control`: Control structures (Lazy, `LazyRec`)
//! - `full`: Enable all features
//!
//! ## Example
//!
//! ```rust
//! use lazyrec::prelude::*;
//!
//! let factorial = lazy_rec(
//!     |fact, x: u64| {
//!         if x == 1 {
//!             Lazy::pure(1)
//!         } else {
//!             fact.call(x - 1).flat_map(move |y| Lazy::pure(y * x))
//!         }
//!     },
//!     5,
//! );
//!
//! assert_eq!(*factorial.force(), 120);
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![warn(clippy::nursery)]
// Note: Disabling redundant_closure_for_method_calls due to clippy 0.1.92 panic bug
#![allow(clippy::redundant_closure_for_method_calls)]

/// Prelude module for convenient imports.
///
/// Re-exports commonly used types and functions.
///
/// # Usage
///
/// ```rust
/// use lazyrec::prelude::*;
/// ```
pub mod prelude {

    #[cfg(feature = "control")]
    pub use crate::control::*;
}

#[cfg(feature = "control")]
pub mod control;
