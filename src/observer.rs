//! Observer trait and implementations
//!
//! An observer is the consuming end of a stream. It receives any number of
//! values through `next`, then at most one terminal notification: `error` or
//! `complete`.

use std::convert::Infallible;

use crate::rc::MutRc;

// ============================================================================
// Observer Trait
// ============================================================================

/// Observer trait: the consumer of data in reactive programming.
pub trait Observer<Item, Err> {
  /// Receive the next value from the observable
  fn next(&mut self, value: Item);

  /// Handle an error from the observable
  ///
  /// This consumes the observer, as no more values can be emitted after an
  /// error
  fn error(self, err: Err);

  /// Handle completion of the observable
  ///
  /// This consumes the observer, as no more values can be emitted after
  /// completion
  fn complete(self);

  /// Returns `true` if the observer will not accept more values.
  ///
  /// Synchronous sources check this between values to stop early, subjects
  /// use it to drop observers that have detached themselves.
  fn is_closed(&self) -> bool;
}

// ============================================================================
// Emitter Trait
// ============================================================================

/// The producer-facing view of an observer, handed to `create` closures.
///
/// All methods take `&mut self` so the producer can be written against
/// `&mut dyn Emitter` without knowing the concrete observer chain behind it.
/// Calls after the first terminal notification are ignored.
pub trait Emitter<Item, Err> {
  fn next(&mut self, value: Item);
  fn error(&mut self, err: Err);
  fn complete(&mut self);
  fn is_closed(&self) -> bool;
}

// ============================================================================
// DynObserver Trait - Object-safe Observer
// ============================================================================

/// Object-safe mirror of [`Observer`], used to store observers of different
/// concrete types together (for example inside a subject).
pub trait DynObserver<Item, Err> {
  fn box_next(&mut self, value: Item);
  fn box_error(self: Box<Self>, err: Err);
  fn box_complete(self: Box<Self>);
  fn box_is_closed(&self) -> bool;
}

impl<T, Item, Err> DynObserver<Item, Err> for T
where
  T: Observer<Item, Err>,
{
  fn box_next(&mut self, value: Item) { self.next(value); }
  fn box_error(self: Box<Self>, err: Err) { (*self).error(err); }
  fn box_complete(self: Box<Self>) { (*self).complete(); }
  fn box_is_closed(&self) -> bool { self.is_closed() }
}

/// Boxed observer for the single-threaded runtime.
pub type BoxedObserver<Item, Err> = Box<dyn DynObserver<Item, Err>>;

impl<Item, Err> Observer<Item, Err> for BoxedObserver<Item, Err> {
  #[inline]
  fn next(&mut self, value: Item) { (**self).box_next(value) }

  #[inline]
  fn error(self, err: Err) { self.box_error(err) }

  #[inline]
  fn complete(self) { self.box_complete() }

  #[inline]
  fn is_closed(&self) -> bool { (**self).box_is_closed() }
}

// ============================================================================
// FnMutObserver - Closure adapter
// ============================================================================

/// Closure adapter behind `subscribe(|v| ...)`.
///
/// Only streams that cannot fail accept a bare closure. A fallible stream has
/// to say what happens to its error first, via `on_error`, `catch_error` or
/// `subscribe_with`.
#[derive(Clone)]
pub struct FnMutObserver<F>(pub F);

impl<F, Item> Observer<Item, Infallible> for FnMutObserver<F>
where
  F: FnMut(Item),
{
  #[inline]
  fn next(&mut self, v: Item) { (self.0)(v); }

  #[inline]
  fn error(self, err: Infallible) { match err {} }

  #[inline]
  fn complete(self) {}

  #[inline]
  fn is_closed(&self) -> bool { false }
}

/// An observer assembled from three callbacks.
///
/// ```rust
/// use rxkoans::prelude::*;
///
/// let ctx = TestCtx::default();
/// ctx
///   .throw_err::<i32, _>("boom")
///   .subscribe_with(ObserverFn::new(
///     |v: i32| println!("value {v}"),
///     |e: &str| println!("error {e}"),
///     || println!("done"),
///   ));
/// ```
pub struct ObserverFn<N, E, C> {
  next: N,
  error: E,
  complete: C,
}

impl<N, E, C> ObserverFn<N, E, C> {
  pub fn new(next: N, error: E, complete: C) -> Self { Self { next, error, complete } }
}

impl<N, E, C, Item, Err> Observer<Item, Err> for ObserverFn<N, E, C>
where
  N: FnMut(Item),
  E: FnOnce(Err),
  C: FnOnce(),
{
  fn next(&mut self, value: Item) { (self.next)(value) }

  fn error(self, err: Err) { (self.error)(err) }

  fn complete(self) { (self.complete)() }

  fn is_closed(&self) -> bool { false }
}

// ============================================================================
// Observer implementations for Option and shared Option wrappers
// ============================================================================

/// Option observer - None ignores all events, Some delegates to inner
impl<O, Item, Err> Observer<Item, Err> for Option<O>
where
  O: Observer<Item, Err>,
{
  fn next(&mut self, value: Item) {
    if let Some(inner) = self {
      inner.next(value);
    }
  }

  fn error(self, err: Err) {
    if let Some(inner) = self {
      inner.error(err);
    }
  }

  fn complete(self) {
    if let Some(inner) = self {
      inner.complete();
    }
  }

  fn is_closed(&self) -> bool { self.as_ref().is_none_or(Observer::is_closed) }
}

/// Shared observer slot. Terminal calls take the inner observer out, so every
/// clone of the slot sees it closed afterwards.
impl<O, Item, Err> Observer<Item, Err> for MutRc<Option<O>>
where
  O: Observer<Item, Err>,
{
  fn next(&mut self, value: Item) { self.rc_deref_mut().next(value); }

  fn error(self, err: Err) {
    let inner = self.rc_deref_mut().take();
    if let Some(inner) = inner {
      inner.error(err);
    }
  }

  fn complete(self) {
    let inner = self.rc_deref_mut().take();
    if let Some(inner) = inner {
      inner.complete();
    }
  }

  fn is_closed(&self) -> bool { self.rc_deref().is_closed() }
}

// ============================================================================
// Tests
// ============================================================================
