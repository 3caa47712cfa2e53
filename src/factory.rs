//! Constructors for observables.
//!
//! [`ObservableFactory`] is implemented for the empty context
//! `LocalCtx<(), S>`. Each constructor borrows the context and returns a new
//! context holding the observable and a clone of the scheduler:
//!
//! ```rust
//! use rxkoans::prelude::*;
//!
//! let ctx = TestCtx::default();
//! ctx.of(42).subscribe(|v| println!("received {v}"));
//! ctx
//!   .timer(Duration::from_millis(500))
//!   .subscribe(|_| println!("timer fired"));
//! ctx.scheduler().advance_by(Duration::from_millis(500));
//! ```
//!
//! ## Trivial observables
//!
//! | Method | Values | Terminates with |
//! |--------|--------|-----------------|
//! | `empty()` | none | completion, at once |
//! | `never()` | none | never |
//! | `throw_err(e)` | none | error `e`, at once |

use std::{
  future::Future,
  iter::{once, Once},
  ops::Range,
};

use crate::{
  context::LocalCtx,
  observable::{
    Create, Empty, EventEmitter, FromEvent, FromFuture, FromIter, Interval, Never, ThrowErr, Timer,
    TryCreate,
  },
  observer::Emitter,
  scheduler::{Duration, Scheduler},
  subject::Subject,
  subscription::Subscription,
};

pub trait ObservableFactory {
  type Scheduler: Scheduler;

  /// Wraps a value built from the scheduler into a new context.
  fn wrap_with<T, F>(&self, f: F) -> LocalCtx<T, Self::Scheduler>
  where
    F: FnOnce(&Self::Scheduler) -> T;

  /// Creates an observable from a producer closure.
  ///
  /// The producer gets an [`Emitter`] and returns the teardown to run on
  /// unsubscribe: `()` for none, a
  /// [`ClosureSubscription`](crate::subscription::ClosureSubscription) for a
  /// callback.
  ///
  /// ```rust
  /// use rxkoans::prelude::*;
  ///
  /// let ctx = TestCtx::default();
  /// ctx
  ///   .create(|emitter: &mut dyn Emitter<i32, Infallible>| {
  ///     emitter.next(1);
  ///     emitter.complete();
  ///   })
  ///   .subscribe(|v| println!("{v}"));
  /// ```
  fn create<Item, Err, F, U>(&self, f: F) -> LocalCtx<Create<F, Item, Err>, Self::Scheduler>
  where
    F: FnOnce(&mut dyn Emitter<Item, Err>) -> U,
    U: Subscription,
  {
    self.wrap_with(|_| Create::new(f))
  }

  /// Like [`create`](ObservableFactory::create), but an `Err` returned by the
  /// producer is delivered as the stream's error.
  fn try_create<Item, Err, F, U>(&self, f: F) -> LocalCtx<TryCreate<F, Item, Err>, Self::Scheduler>
  where
    F: FnOnce(&mut dyn Emitter<Item, Err>) -> Result<U, Err>,
    U: Subscription,
  {
    self.wrap_with(|_| TryCreate::new(f))
  }

  /// Emits `v` and completes.
  fn of<T>(&self, v: T) -> LocalCtx<FromIter<Once<T>>, Self::Scheduler> {
    self.wrap_with(|_| FromIter(once(v)))
  }

  fn from_iter<I>(&self, iter: I) -> LocalCtx<FromIter<I>, Self::Scheduler>
  where
    I: IntoIterator,
  {
    self.wrap_with(|_| FromIter(iter))
  }

  /// Emits `count` consecutive integers starting at `start`.
  fn range(&self, start: i32, count: usize) -> LocalCtx<FromIter<Range<i32>>, Self::Scheduler> {
    let end = start.saturating_add(i32::try_from(count).unwrap_or(i32::MAX));
    self.wrap_with(|_| FromIter(start..end))
  }

  fn from_future<F>(&self, future: F) -> LocalCtx<FromFuture<F, Self::Scheduler>, Self::Scheduler>
  where
    F: Future,
  {
    self.wrap_with(|scheduler| FromFuture { future, scheduler: scheduler.clone() })
  }

  /// Emits `()` once after `delay`, then completes.
  fn timer(&self, delay: Duration) -> LocalCtx<Timer<Self::Scheduler>, Self::Scheduler> {
    self.wrap_with(|scheduler| Timer { delay, scheduler: scheduler.clone() })
  }

  /// Emits `0, 1, 2, ...`, one value every `period`.
  fn interval(&self, period: Duration) -> LocalCtx<Interval<Self::Scheduler>, Self::Scheduler> {
    self.wrap_with(|scheduler| Interval { period, scheduler: scheduler.clone() })
  }

  /// Emits the payload of every `event` emitted on `emitter`.
  fn from_event<T>(
    &self, emitter: &EventEmitter<T>, event: &str,
  ) -> LocalCtx<FromEvent<T>, Self::Scheduler> {
    self.wrap_with(|_| FromEvent { emitter: emitter.clone(), event: event.to_owned() })
  }

  fn empty<Item, Err>(&self) -> LocalCtx<Empty<Item, Err>, Self::Scheduler> {
    self.wrap_with(|_| Empty::new())
  }

  fn never<Item, Err>(&self) -> LocalCtx<Never<Item, Err>, Self::Scheduler> {
    self.wrap_with(|_| Never::new())
  }

  fn throw_err<Item, Err>(&self, err: Err) -> LocalCtx<ThrowErr<Item, Err>, Self::Scheduler> {
    self.wrap_with(|_| ThrowErr::new(err))
  }

  /// A new subject on this context's scheduler.
  fn subject<Item, Err>(&self) -> LocalCtx<Subject<Item, Err>, Self::Scheduler> {
    self.wrap_with(|_| Subject::new())
  }
}

impl<S: Scheduler> ObservableFactory for LocalCtx<(), S> {
  type Scheduler = S;

  #[inline]
  fn wrap_with<T, F>(&self, f: F) -> LocalCtx<T, S>
  where
    F: FnOnce(&S) -> T,
  {
    LocalCtx::from_parts(f(&self.scheduler), self.scheduler.clone())
  }
}
