//! Type-erased evaluation trees and the loop that drives them.
//!
//! Every [`Lazy`](super::Lazy) keeps its pending work as an [`Eval`]. Sequencing
//! (`map`, `flat_map`, `flatten`) never forces anything: it wraps the current
//! tree in a [`Eval::Bind`] node together with a continuation. Forcing hands the
//! tree to [`run`], which interprets it with a loop and an explicit continuation
//! stack instead of nested calls.
//!
//! # Design
//!
//! Intermediate values along a chain have different types, so both values and
//! continuations are erased to `Box<dyn Any + Send>`. The public wrappers are the
//! only producers of these nodes, and each continuation is paired with the node
//! that produces its input, so a failed downcast means the engine itself is broken.
//!
//! ## Transition Rules
//!
//! 1. `Bind(source, continuation)`: push `continuation`, continue with `source`
//! 2. `Defer(thunk)`: call `thunk` to obtain a value
//! 3. `Ready(value)` or a value from step 2:
//!    - pop a continuation and continue with the tree it returns
//!    - stop with the value once the stack is empty
//!
//! Left-nested binds are unwound by step 1, right-nested binds re-enter the loop
//! through step 3. Neither grows the call stack.
//!
//! Dropping a tree that was never run walks the chain of bind sources the same
//! way (see [`Source`]), so discarding a long unforced chain is stack-safe too.

use std::any::Any;
use std::fmt;

use smallvec::SmallVec;

/// A value whose concrete type is only known to the node that produced it.
pub(crate) type Erased = Box<dyn Any + Send>;

/// A continuation waiting for the result of the tree it is bound to.
pub(crate) type Continuation = Box<dyn FnOnce(Erased) -> Eval + Send>;

/// Number of continuations kept inline before the stack spills to the heap.
const INLINE_CONTINUATIONS: usize = 8;

/// A pending computation, erased over its result type.
pub(crate) enum Eval {
    /// An already computed value.
    Ready(Erased),
    /// A zero-argument computation that has not run yet.
    Defer(Box<dyn FnOnce() -> Erased + Send>),
    /// Evaluate the first tree, then feed its value to the continuation.
    Bind(Source, Continuation),
}

/// The tree a [`Eval::Bind`] node evaluates first.
///
/// Owns the boxed tree so that dropping it unlinks nested bind sources one at a
/// time instead of recursing once per level.
pub(crate) struct Source(Box<Eval>);

impl Source {
    /// Detaches the tree, leaving an empty node behind for the shallow drop.
    #[inline]
    fn into_inner(mut self) -> Eval {
        std::mem::replace(&mut *self.0, Eval::empty())
    }
}

impl Drop for Source {
    fn drop(&mut self) {
        let mut next = std::mem::replace(&mut *self.0, Eval::empty());
        while let Eval::Bind(source, continuation) = next {
            drop(continuation);
            next = source.into_inner();
        }
    }
}

impl fmt::Debug for Source {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(&*self.0, formatter)
    }
}

impl Eval {
    /// A placeholder left behind by [`Source`]. `Box<()>` does not allocate.
    #[inline]
    fn empty() -> Self {
        Self::Ready(Box::new(()))
    }

    /// Wraps a computed value.
    #[inline]
    pub(crate) fn ready<T: Send + 'static>(value: T) -> Self {
        Self::Ready(Box::new(value))
    }

    /// Wraps a computation without running it.
    #[inline]
    pub(crate) fn defer<T, F>(thunk: F) -> Self
    where
        T: Send + 'static,
        F: FnOnce() -> T + Send + 'static,
    {
        Self::Defer(Box::new(move || Box::new(thunk()) as Erased))
    }

    /// Sequences `continuation` after this tree.
    ///
    /// `A` must be the result type of `self`.
    #[inline]
    pub(crate) fn bind<A, F>(self, continuation: F) -> Self
    where
        A: 'static,
        F: FnOnce(A) -> Self + Send + 'static,
    {
        Self::Bind(
            Source(Box::new(self)),
            Box::new(move |value| continuation(unerase::<A>(value))),
        )
    }
}

impl fmt::Debug for Eval {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Ready(_) => formatter.debug_tuple("Ready").field(&"<value>").finish(),
            Self::Defer(_) => formatter.debug_tuple("Defer").field(&"<thunk>").finish(),
            Self::Bind(source, _) => formatter
                .debug_tuple("Bind")
                .field(source)
                .field(&"<continuation>")
                .finish(),
        }
    }
}

/// Restores the concrete type of an erased value.
///
/// # Panics
///
/// Panics if `value` is not a `T`, which means a continuation was bound to a
/// tree of a different result type.
pub(crate) fn unerase<T: 'static>(value: Erased) -> T {
    match value.downcast::<T>() {
        Ok(value) => *value,
        Err(_) => unreachable!(
            "lazy evaluation produced a value that is not a {}",
            std::any::type_name::<T>()
        ),
    }
}

/// Drives `eval` to its final value in constant call-stack depth.
///
/// Pending continuations live on a heap-backed stack, so a computation that
/// never reaches a base case exhausts memory rather than the call stack.
pub(crate) fn run(eval: Eval) -> Erased {
    let mut stack: SmallVec<[Continuation; INLINE_CONTINUATIONS]> = SmallVec::new();
    let mut current = eval;
    let mut steps: u64 = 0;
    let mut max_depth: usize = 0;

    tracing::trace!("lazy evaluation started");

    loop {
        steps += 1;
        let value = match current {
            Eval::Bind(source, continuation) => {
                stack.push(continuation);
                max_depth = max_depth.max(stack.len());
                current = source.into_inner();
                continue;
            }
            Eval::Defer(thunk) => thunk(),
            Eval::Ready(value) => value,
        };

        match stack.pop() {
            Some(continuation) => current = continuation(value),
            None => {
                tracing::trace!(steps, max_depth, "lazy evaluation finished");
                return value;
            }
        }
    }
}
