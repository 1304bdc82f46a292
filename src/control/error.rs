//! Error types for deferred values.

/// Error returned when a [`Lazy`](super::Lazy) value cannot produce a result
/// because an earlier evaluation of it panicked.
///
/// This error is returned by [`Lazy::try_force`](super::Lazy::try_force) and
/// [`Lazy::into_inner`](super::Lazy::into_inner).
/// [`Lazy::force`](super::Lazy::force) panics with this error's message instead.
///
/// # Examples
///
/// ```rust
/// use lazyrec::control::LazyPoisonedError;
///
/// assert_eq!(
///     LazyPoisonedError.to_string(),
///     "Lazy instance has been poisoned"
/// );
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
#[error("Lazy instance has been poisoned")]
pub struct LazyPoisonedError;
