//! The execution context.
//!
//! A [`LocalCtx`] pairs a value with the scheduler it runs on. The empty
//! context `LocalCtx<(), S>` is where a pipeline starts: it carries only the
//! scheduler and offers the constructors of
//! [`ObservableFactory`](crate::factory::ObservableFactory). Every
//! observable built from it, and every operator applied after, keeps the
//! same scheduler, so time based operators never reach for a global clock.
//!
//! ```rust
//! use rxkoans::prelude::*;
//!
//! let ctx = TestCtx::default();
//! let delayed = ctx.of(1).delay(Duration::from_millis(10));
//! delayed.subscribe(|v| println!("{v}"));
//!
//! // Nothing happened yet, the virtual clock has not moved.
//! ctx.scheduler().advance_by(Duration::from_millis(10));
//! ```
//!
//! A different scheduler is injected with
//! [`with_scheduler`](LocalCtx::with_scheduler) or by naming another
//! `LocalCtx<T, MyScheduler>` alias; any `Scheduler + Default` works as the
//! starting point.

#[cfg(feature = "scheduler")]
use crate::scheduler::LocalScheduler;
use crate::{observer::Observer, scheduler::TestScheduler};

#[derive(Clone)]
pub struct LocalCtx<T, S> {
  pub inner: T,
  pub scheduler: S,
}

impl<T, S> LocalCtx<T, S> {
  #[inline]
  pub fn from_parts(inner: T, scheduler: S) -> Self { LocalCtx { inner, scheduler } }

  #[inline]
  pub fn scheduler(&self) -> &S { &self.scheduler }

  #[inline]
  pub fn inner(&self) -> &T { &self.inner }

  #[inline]
  pub fn into_inner(self) -> T { self.inner }

  /// Replaces the scheduler, keeping the value.
  pub fn with_scheduler<S2>(self, scheduler: S2) -> LocalCtx<T, S2> {
    LocalCtx { inner: self.inner, scheduler }
  }
}

impl<S: Default> Default for LocalCtx<(), S> {
  fn default() -> Self { LocalCtx { inner: (), scheduler: S::default() } }
}

/// A context around a subject is fed like the subject itself.
impl<Item, Err, T, S> Observer<Item, Err> for LocalCtx<T, S>
where
  T: Observer<Item, Err>,
{
  #[inline]
  fn next(&mut self, value: Item) { self.inner.next(value) }

  #[inline]
  fn error(self, err: Err) { self.inner.error(err) }

  #[inline]
  fn complete(self) { self.inner.complete() }

  #[inline]
  fn is_closed(&self) -> bool { self.inner.is_closed() }
}

// ==================== Type Aliases ====================

/// Real time on the current tokio `LocalSet`.
#[cfg(feature = "scheduler")]
pub type Local<T> = LocalCtx<T, LocalScheduler>;

/// Virtual time, driven by hand through `ctx.scheduler()`.
pub type TestCtx<T> = LocalCtx<T, TestScheduler>;
