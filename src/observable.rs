//! Observable traits and the built-in sources.
//!
//! An observable is split in two layers:
//!
//! - the *core* (`ObservableType` + `CoreObservable<O>`), a plain value that
//!   knows how to attach one observer of type `O` and return the teardown,
//! - the *facade* ([`Observable`]), implemented for [`LocalCtx`], which pairs
//!   a core with the scheduler of its context and carries every operator.
//!
//! Operators never touch the observer at build time. They wrap the core of
//! their source in a new core, and subscribing walks the chain from the
//! outermost operator down to the producer.

use crate::{
  context::LocalCtx,
  observer::{FnMutObserver, Observer},
  ops::{
    all::All,
    buffer_count::BufferCount,
    buffer_time::BufferTime,
    catch_error::CatchError,
    collect::Collect,
    concat::Concat,
    debounce::Debounce,
    delay::Delay,
    filter::Filter,
    group_by::GroupBy,
    into_future::{observable_into_future, IntoFutureObserver, ObservableFuture},
    lifecycle::{OnComplete, OnError},
    map::{Map, TryMap},
    map_err::MapErr,
    merge::Merge,
    observe_on::ObserveOn,
    race::Race,
    reduce::{Reduce, ReduceFn, ReduceInitialFn, Scan},
    take::Take,
    take_while::TakeWhile,
    tap::{Tap, TryTap},
    time_interval::TimeIntervalOp,
    timeout::{Timeout, TimeoutWith},
  },
  scheduler::{Duration, Scheduler},
  subscriber::Subscriber,
  subscription::{LocalSubscription, Subscription},
};

pub mod create;
pub mod from_event;
pub mod from_future;
pub mod from_iter;
pub mod timer;
pub mod trivial;

pub use create::*;
pub use from_event::*;
pub use from_future::*;
pub use from_iter::*;
pub use timer::*;
pub use trivial::*;

/// The value and error types a core observable produces.
pub trait ObservableType {
  type Item;
  type Err;
}

/// A core observable that can be subscribed by an observer of type `O`.
pub trait CoreObservable<O>: ObservableType {
  /// Cancels everything the subscription started.
  type Unsub: Subscription + 'static;

  fn actual_subscribe(self, observer: O) -> Self::Unsub;
}

/// The user facing observable: a core plus the scheduler it runs on.
///
/// Every operator consumes `self` and returns a new [`LocalCtx`] holding the
/// wrapped core and the same scheduler. Time based operators take their
/// scheduler from there.
pub trait Observable: Sized {
  type Item;
  type Err;
  type Inner: ObservableType<Item = Self::Item, Err = Self::Err>;
  type Scheduler: Scheduler;

  fn into_parts(self) -> (Self::Inner, Self::Scheduler);

  /// Wraps the core with `f`, keeping the scheduler.
  fn map_inner<U, F>(self, f: F) -> LocalCtx<U, Self::Scheduler>
  where
    F: FnOnce(Self::Inner, &Self::Scheduler) -> U,
  {
    let (inner, scheduler) = self.into_parts();
    let inner = f(inner, &scheduler);
    LocalCtx::from_parts(inner, scheduler)
  }

  // ==================== Subscribing ====================

  /// Subscribes with a closure for the values.
  ///
  /// Only streams whose error type is `Infallible` have this method. Handle a
  /// possible error first with `on_error`, `catch_error` or use
  /// [`subscribe_with`](Observable::subscribe_with).
  fn subscribe<F>(self, next: F) -> LocalSubscription
  where
    F: FnMut(Self::Item),
    FnMutObserver<F>: Observer<Self::Item, Self::Err>,
    Self::Inner: CoreObservable<Subscriber<FnMutObserver<F>>>,
  {
    self.subscribe_with(FnMutObserver(next))
  }

  /// Subscribes with a full observer.
  fn subscribe_with<O>(self, observer: O) -> LocalSubscription
  where
    Self::Inner: CoreObservable<Subscriber<O>>,
  {
    let (inner, _) = self.into_parts();
    let subscription = LocalSubscription::default();
    let unsub = inner.actual_subscribe(Subscriber::new(observer, subscription.clone()));
    subscription.add(unsub);
    subscription
  }

  /// Applies `f` to the whole observable. Lets reusable operator chains be
  /// written as plain functions.
  ///
  /// ```rust
  /// use rxkoans::prelude::*;
  ///
  /// let ctx = TestCtx::default();
  /// ctx
  ///   .range(1, 6)
  ///   .pipe(|evens| evens.filter(|v| v % 2 == 0))
  ///   .subscribe(|v| println!("{v}"));
  /// ```
  fn pipe<R, F>(self, f: F) -> R
  where
    F: FnOnce(Self) -> R,
  {
    f(self)
  }

  /// Subscribes now and resolves with the last value once the stream ends.
  fn into_future(self) -> ObservableFuture<Self::Item, Self::Err>
  where
    Self::Inner: CoreObservable<Subscriber<IntoFutureObserver<Self::Item, Self::Err>>>,
  {
    observable_into_future(|observer| self.subscribe_with(observer))
  }

  // ==================== Transformation ====================

  fn map<B, F>(self, f: F) -> LocalCtx<Map<Self::Inner, F>, Self::Scheduler>
  where
    F: FnMut(Self::Item) -> B,
  {
    self.map_inner(|source, _| Map { source, func: f })
  }

  fn try_map<B, F>(self, f: F) -> LocalCtx<TryMap<Self::Inner, F>, Self::Scheduler>
  where
    F: FnMut(Self::Item) -> Result<B, Self::Err>,
  {
    self.map_inner(|source, _| TryMap { source, func: f })
  }

  fn filter<F>(self, predicate: F) -> LocalCtx<Filter<Self::Inner, F>, Self::Scheduler>
  where
    F: FnMut(&Self::Item) -> bool,
  {
    self.map_inner(|source, _| Filter { source, predicate })
  }

  fn tap<F>(self, f: F) -> LocalCtx<Tap<Self::Inner, F>, Self::Scheduler>
  where
    F: FnMut(&Self::Item),
  {
    self.map_inner(|source, _| Tap { source, func: f })
  }

  fn try_tap<F>(self, f: F) -> LocalCtx<TryTap<Self::Inner, F>, Self::Scheduler>
  where
    F: FnMut(&Self::Item) -> Result<(), Self::Err>,
  {
    self.map_inner(|source, _| TryTap { source, func: f })
  }

  /// Emits every intermediate accumulator. The first value is the seed.
  fn scan<F>(
    self, f: F,
  ) -> LocalCtx<Scan<Self::Inner, ReduceFn<F>, Self::Item>, Self::Scheduler>
  where
    F: FnMut(Self::Item, Self::Item) -> Self::Item,
  {
    self.map_inner(|source, _| Scan { source, strategy: ReduceFn(f), initial: None })
  }

  fn scan_initial<Acc, F>(
    self, initial: Acc, f: F,
  ) -> LocalCtx<Scan<Self::Inner, ReduceInitialFn<F>, Acc>, Self::Scheduler>
  where
    F: FnMut(Acc, Self::Item) -> Acc,
  {
    self.map_inner(|source, _| Scan {
      source,
      strategy: ReduceInitialFn(f),
      initial: Some(initial),
    })
  }

  /// Emits the final accumulator on completion, nothing for an empty source.
  fn reduce<F>(
    self, f: F,
  ) -> LocalCtx<Reduce<Self::Inner, ReduceFn<F>, Self::Item>, Self::Scheduler>
  where
    F: FnMut(Self::Item, Self::Item) -> Self::Item,
  {
    self.map_inner(|source, _| Reduce { source, strategy: ReduceFn(f), initial: None })
  }

  /// Emits the final accumulator on completion, `initial` for an empty
  /// source.
  fn reduce_initial<Acc, F>(
    self, initial: Acc, f: F,
  ) -> LocalCtx<Reduce<Self::Inner, ReduceInitialFn<F>, Acc>, Self::Scheduler>
  where
    F: FnMut(Acc, Self::Item) -> Acc,
  {
    self.map_inner(|source, _| Reduce {
      source,
      strategy: ReduceInitialFn(f),
      initial: Some(initial),
    })
  }

  fn all<F>(self, predicate: F) -> LocalCtx<All<Self::Inner, F>, Self::Scheduler>
  where
    F: FnMut(&Self::Item) -> bool,
  {
    self.map_inner(|source, _| All { source, predicate })
  }

  /// Gathers every value into `C` and emits it on completion.
  fn collect<C>(self) -> LocalCtx<Collect<Self::Inner, C>, Self::Scheduler>
  where
    C: Default + Extend<Self::Item>,
  {
    self.map_inner(|source, _| Collect { source, collection: C::default() })
  }

  fn buffer_count(
    self, size: usize, skip: usize,
  ) -> LocalCtx<BufferCount<Self::Inner>, Self::Scheduler> {
    self.map_inner(|source, _| BufferCount { source, size, skip })
  }

  fn buffer_time(
    self, duration: Duration,
  ) -> LocalCtx<BufferTime<Self::Inner, Self::Scheduler>, Self::Scheduler> {
    self.map_inner(|source, scheduler| BufferTime {
      source,
      duration,
      scheduler: scheduler.clone(),
    })
  }

  fn group_by<Key, F>(
    self, key_fn: F,
  ) -> LocalCtx<GroupBy<Self::Inner, F, Self::Scheduler>, Self::Scheduler>
  where
    F: FnMut(&Self::Item) -> Key,
  {
    self.map_inner(|source, scheduler| GroupBy { source, key_fn, scheduler: scheduler.clone() })
  }

  // ==================== Limiting ====================

  fn take(self, count: usize) -> LocalCtx<Take<Self::Inner>, Self::Scheduler> {
    self.map_inner(|source, _| Take { source, count })
  }

  fn take_while<F>(self, predicate: F) -> LocalCtx<TakeWhile<Self::Inner, F>, Self::Scheduler>
  where
    F: FnMut(&Self::Item) -> bool,
  {
    self.map_inner(|source, _| TakeWhile { source, predicate, inclusive: false })
  }

  /// Like [`take_while`](Observable::take_while), but the value that failed
  /// the predicate is forwarded before completing.
  fn take_while_inclusive<F>(
    self, predicate: F,
  ) -> LocalCtx<TakeWhile<Self::Inner, F>, Self::Scheduler>
  where
    F: FnMut(&Self::Item) -> bool,
  {
    self.map_inner(|source, _| TakeWhile { source, predicate, inclusive: true })
  }

  // ==================== Time ====================

  fn debounce(
    self, duration: Duration,
  ) -> LocalCtx<Debounce<Self::Inner, Self::Scheduler>, Self::Scheduler> {
    self.map_inner(|source, scheduler| Debounce { source, duration, scheduler: scheduler.clone() })
  }

  fn delay(
    self, delay: Duration,
  ) -> LocalCtx<Delay<Self::Inner, Self::Scheduler>, Self::Scheduler> {
    self.map_inner(|source, scheduler| Delay { source, delay, scheduler: scheduler.clone() })
  }

  /// Re-delivers every notification on `scheduler`, one turn later.
  fn observe_on<Sch: Scheduler>(
    self, scheduler: Sch,
  ) -> LocalCtx<ObserveOn<Self::Inner, Sch>, Self::Scheduler> {
    self.map_inner(|source, _| ObserveOn { source, scheduler })
  }

  fn timeout(
    self, duration: Duration,
  ) -> LocalCtx<Timeout<Self::Inner, Self::Scheduler>, Self::Scheduler> {
    self.map_inner(|source, scheduler| Timeout { source, duration, scheduler: scheduler.clone() })
  }

  /// Switches to `fallback` when no value arrives within `duration`.
  fn timeout_with<R>(
    self, duration: Duration, fallback: R,
  ) -> LocalCtx<TimeoutWith<Self::Inner, R::Inner, Self::Scheduler>, Self::Scheduler>
  where
    R: Observable<Item = Self::Item, Err = Self::Err>,
  {
    let (fallback, _) = fallback.into_parts();
    self.map_inner(|source, scheduler| TimeoutWith {
      source,
      duration,
      fallback,
      scheduler: scheduler.clone(),
    })
  }

  fn time_interval(
    self,
  ) -> LocalCtx<TimeIntervalOp<Self::Inner, Self::Scheduler>, Self::Scheduler> {
    self.map_inner(|source, scheduler| TimeIntervalOp { source, scheduler: scheduler.clone() })
  }

  // ==================== Combination ====================

  fn merge<R>(self, other: R) -> LocalCtx<Merge<Self::Inner, R::Inner>, Self::Scheduler>
  where
    R: Observable<Item = Self::Item, Err = Self::Err>,
  {
    let (source2, _) = other.into_parts();
    self.map_inner(|source1, _| Merge { source1, source2 })
  }

  fn concat<R>(self, other: R) -> LocalCtx<Concat<Self::Inner, R::Inner>, Self::Scheduler>
  where
    R: Observable<Item = Self::Item, Err = Self::Err>,
  {
    let (second, _) = other.into_parts();
    self.map_inner(|first, _| Concat { first, second })
  }

  /// Mirrors whichever source notifies first and drops the other.
  fn race<R>(self, other: R) -> LocalCtx<Race<Self::Inner, R::Inner>, Self::Scheduler>
  where
    R: Observable<Item = Self::Item, Err = Self::Err>,
  {
    let (source2, _) = other.into_parts();
    self.map_inner(|source1, _| Race { source1, source2 })
  }

  // ==================== Errors and lifecycle ====================

  fn on_error<F>(self, f: F) -> LocalCtx<OnError<Self::Inner, F>, Self::Scheduler>
  where
    F: FnOnce(Self::Err),
  {
    self.map_inner(|source, _| OnError { source, callback: f })
  }

  fn on_complete<F>(self, f: F) -> LocalCtx<OnComplete<Self::Inner, F>, Self::Scheduler>
  where
    F: FnOnce(),
  {
    self.map_inner(|source, _| OnComplete { source, callback: f })
  }

  fn map_err<E, F>(self, f: F) -> LocalCtx<MapErr<Self::Inner, F>, Self::Scheduler>
  where
    F: FnOnce(Self::Err) -> E,
  {
    self.map_inner(|source, _| MapErr { source, func: f })
  }

  fn catch_error<R, F>(self, handler: F) -> LocalCtx<CatchError<Self::Inner, F>, Self::Scheduler>
  where
    F: FnOnce(Self::Err) -> R,
    R: Observable<Item = Self::Item>,
  {
    self.map_inner(|source, _| CatchError { source, handler })
  }
}

impl<T, S> Observable for LocalCtx<T, S>
where
  T: ObservableType,
  S: Scheduler,
{
  type Item = T::Item;
  type Err = T::Err;
  type Inner = T;
  type Scheduler = S;

  #[inline]
  fn into_parts(self) -> (T, S) { (self.inner, self.scheduler) }
}
