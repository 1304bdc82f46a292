//! Control structures for deferred computation.
//!
//! This module provides:
//!
//! - [`Lazy`]: Lazy evaluation with memoization and stack-safe sequencing
//! - [`LazyRec`]: Stack-safe self-recursion producing a [`Lazy`] result
//! - [`Recur`]: The self-reference handed to a recursion step function
//!
//! # Examples
//!
//! ## Lazy Evaluation
//!
//! ```rust
//! use lazyrec::control::Lazy;
//!
//! let lazy = Lazy::new(|| {
//!     println!("Computing...");
//!     42
//! });
//! // "Computing..." is not printed yet
//!
//! let value = lazy.force();
//! // Now "Computing..." is printed and value is 42
//! assert_eq!(*value, 42);
//! ```
//!
//! ## Stack-Safe Recursion
//!
//! ```rust
//! use lazyrec::control::{Lazy, lazy_rec};
//!
//! let sum = lazy_rec(
//!     |sum, n: u64| {
//!         if n == 0 {
//!             Lazy::pure(0)
//!         } else {
//!             sum.call(n - 1).map(move |rest| rest + n)
//!         }
//!     },
//!     100_000,
//! );
//!
//! assert_eq!(*sum.force(), 5_000_050_000);
//! ```

mod error;
mod eval;
mod lazy;
mod lazy_rec;

pub use error::LazyPoisonedError;
pub use lazy::Lazy;
pub use lazy_rec::{LazyRec, Recur, lazy_rec, lazy_rec_fn};
