//! Timeout operators.
//!
//! A deadline is armed at subscription and re-armed by every value. If it
//! passes first, the source is unsubscribed and the stream either fails
//! with [`TimeoutError::Elapsed`] (`timeout`) or continues with a fallback
//! observable (`timeout_with`).

use log::debug;
use thiserror::Error;

use crate::{
  observable::{CoreObservable, ObservableType},
  observer::Observer,
  rc::MutRc,
  scheduler::{Duration, Scheduler, Task, TaskHandle},
  subscription::{LocalSubscription, Subscription, TupleSubscription},
};

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TimeoutError<E> {
  /// No value arrived within the duration.
  #[error("no value within {0:?}")]
  Elapsed(Duration),
  /// The source failed on its own.
  #[error("source failed: {0}")]
  Source(E),
}

type TimerSlot = MutRc<Option<TaskHandle>>;

struct Deadline<Sch> {
  scheduler: Sch,
  duration: Duration,
  timer: TimerSlot,
}

impl<Sch: Scheduler> Deadline<Sch> {
  fn arm(&self, task: Task) {
    self.cancel();
    let handle = self.scheduler.schedule(task, Some(self.duration));
    *self.timer.rc_deref_mut() = Some(handle);
  }

  fn cancel(&self) {
    let handle = self.timer.rc_deref_mut().take();
    handle.unsubscribe();
  }
}

// ==================== timeout ====================

#[derive(Clone)]
pub struct Timeout<S, Sch> {
  pub source: S,
  pub duration: Duration,
  pub scheduler: Sch,
}

impl<S: ObservableType, Sch> ObservableType for Timeout<S, Sch> {
  type Item = S::Item;
  type Err = TimeoutError<S::Err>;
}

pub struct TimeoutObserver<O, Sch> {
  observer: MutRc<Option<O>>,
  source: LocalSubscription,
  deadline: Deadline<Sch>,
}

fn elapsed<O, Item, Err>(
  (observer, source, duration): (MutRc<Option<O>>, LocalSubscription, Duration),
) where
  O: Observer<Item, TimeoutError<Err>>,
{
  debug!("timeout: no value within {duration:?}");
  source.unsubscribe();
  let observer = observer.rc_deref_mut().take();
  observer.error(TimeoutError::Elapsed(duration));
}

impl<O, Sch: Scheduler> TimeoutObserver<O, Sch> {
  fn arm<Item, Err>(&self)
  where
    O: Observer<Item, TimeoutError<Err>> + 'static,
  {
    let state = (self.observer.clone(), self.source.clone(), self.deadline.duration);
    self.deadline.arm(Task::once(state, elapsed::<O, Item, Err>));
  }
}

impl<S, Sch, O> CoreObservable<O> for Timeout<S, Sch>
where
  S: CoreObservable<TimeoutObserver<O, Sch>>,
  O: Observer<S::Item, TimeoutError<S::Err>> + 'static,
  Sch: Scheduler,
{
  type Unsub = TupleSubscription<LocalSubscription, TimerSlot>;

  fn actual_subscribe(self, observer: O) -> Self::Unsub {
    let Timeout { source, duration, scheduler } = self;
    let timer = TimerSlot::default();
    let source_slot = LocalSubscription::default();
    let observer = TimeoutObserver {
      observer: MutRc::own(Some(observer)),
      source: source_slot.clone(),
      deadline: Deadline { scheduler, duration, timer: timer.clone() },
    };
    observer.arm::<S::Item, S::Err>();
    source_slot.add(source.actual_subscribe(observer));
    TupleSubscription::new(source_slot, timer)
  }
}

impl<Item, Err, O, Sch> Observer<Item, Err> for TimeoutObserver<O, Sch>
where
  O: Observer<Item, TimeoutError<Err>> + 'static,
  Sch: Scheduler,
{
  fn next(&mut self, value: Item) {
    self.deadline.cancel();
    self.observer.next(value);
    if !self.observer.rc_deref().is_closed() {
      self.arm::<Item, Err>();
    }
  }

  fn error(self, err: Err) {
    self.deadline.cancel();
    self.observer.error(TimeoutError::Source(err));
  }

  fn complete(self) {
    self.deadline.cancel();
    self.observer.complete();
  }

  fn is_closed(&self) -> bool { self.observer.rc_deref().is_closed() }
}

// ==================== timeout_with ====================

#[derive(Clone)]
pub struct TimeoutWith<S, R, Sch> {
  pub source: S,
  pub duration: Duration,
  pub fallback: R,
  pub scheduler: Sch,
}

impl<S: ObservableType, R, Sch> ObservableType for TimeoutWith<S, R, Sch> {
  type Item = S::Item;
  type Err = S::Err;
}

struct Switch<O, R> {
  observer: MutRc<Option<O>>,
  source: LocalSubscription,
  fallback: MutRc<Option<R>>,
  fallback_slot: LocalSubscription,
}

impl<O, R> Clone for Switch<O, R> {
  fn clone(&self) -> Self {
    Switch {
      observer: self.observer.clone(),
      source: self.source.clone(),
      fallback: self.fallback.clone(),
      fallback_slot: self.fallback_slot.clone(),
    }
  }
}

fn switch_to_fallback<O, R>(switch: Switch<O, R>)
where
  R: CoreObservable<MutRc<Option<O>>>,
{
  debug!("timeout: switching to the fallback source");
  switch.source.unsubscribe();
  let fallback = switch.fallback.rc_deref_mut().take();
  if let Some(fallback) = fallback {
    switch.fallback_slot.add(fallback.actual_subscribe(switch.observer));
  }
}

pub struct TimeoutWithObserver<O, R, Sch> {
  switch: Switch<O, R>,
  deadline: Deadline<Sch>,
}

impl<O, R, Sch> TimeoutWithObserver<O, R, Sch>
where
  O: 'static,
  R: CoreObservable<MutRc<Option<O>>> + 'static,
  Sch: Scheduler,
{
  fn arm(&self) {
    self
      .deadline
      .arm(Task::once(self.switch.clone(), switch_to_fallback::<O, R>));
  }
}

impl<S, R, Sch, O> CoreObservable<O> for TimeoutWith<S, R, Sch>
where
  S: CoreObservable<TimeoutWithObserver<O, R, Sch>>,
  R: CoreObservable<MutRc<Option<O>>> + ObservableType<Item = S::Item, Err = S::Err> + 'static,
  O: Observer<S::Item, S::Err> + 'static,
  Sch: Scheduler,
{
  type Unsub =
    TupleSubscription<TupleSubscription<LocalSubscription, LocalSubscription>, TimerSlot>;

  fn actual_subscribe(self, observer: O) -> Self::Unsub {
    let TimeoutWith { source, duration, fallback, scheduler } = self;
    let timer = TimerSlot::default();
    let switch = Switch {
      observer: MutRc::own(Some(observer)),
      source: LocalSubscription::default(),
      fallback: MutRc::own(Some(fallback)),
      fallback_slot: LocalSubscription::default(),
    };
    let slots = TupleSubscription::new(switch.source.clone(), switch.fallback_slot.clone());
    let observer = TimeoutWithObserver {
      switch: switch.clone(),
      deadline: Deadline { scheduler, duration, timer: timer.clone() },
    };
    observer.arm();
    switch.source.add(source.actual_subscribe(observer));
    TupleSubscription::new(slots, timer)
  }
}

impl<Item, Err, O, R, Sch> Observer<Item, Err> for TimeoutWithObserver<O, R, Sch>
where
  O: Observer<Item, Err> + 'static,
  R: CoreObservable<MutRc<Option<O>>> + 'static,
  Sch: Scheduler,
{
  fn next(&mut self, value: Item) {
    self.deadline.cancel();
    self.switch.observer.next(value);
    if !self.switch.observer.rc_deref().is_closed() {
      self.arm();
    }
  }

  fn error(self, err: Err) {
    self.deadline.cancel();
    self.switch.observer.error(err);
  }

  fn complete(self) {
    self.deadline.cancel();
    self.switch.observer.complete();
  }

  fn is_closed(&self) -> bool { self.switch.observer.rc_deref().is_closed() }
}
