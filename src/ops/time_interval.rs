use crate::{
  observable::{CoreObservable, ObservableType},
  observer::Observer,
  scheduler::{Duration, Scheduler},
};

/// A value together with the scheduler time since the previous value.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TimeInterval<T> {
  pub value: T,
  pub interval: Duration,
}

/// Measures the time between emissions. The first interval is measured
/// from subscription.
#[derive(Clone)]
pub struct TimeIntervalOp<S, Sch> {
  pub source: S,
  pub scheduler: Sch,
}

impl<S: ObservableType, Sch> ObservableType for TimeIntervalOp<S, Sch> {
  type Item = TimeInterval<S::Item>;
  type Err = S::Err;
}

pub struct TimeIntervalObserver<O, Sch> {
  observer: O,
  scheduler: Sch,
  last: Duration,
}

impl<S, Sch, O> CoreObservable<O> for TimeIntervalOp<S, Sch>
where
  S: CoreObservable<TimeIntervalObserver<O, Sch>>,
  O: Observer<TimeInterval<S::Item>, S::Err>,
  Sch: Scheduler,
{
  type Unsub = S::Unsub;

  fn actual_subscribe(self, observer: O) -> Self::Unsub {
    let last = self.scheduler.now();
    self
      .source
      .actual_subscribe(TimeIntervalObserver { observer, scheduler: self.scheduler, last })
  }
}

impl<Item, Err, O, Sch> Observer<Item, Err> for TimeIntervalObserver<O, Sch>
where
  O: Observer<TimeInterval<Item>, Err>,
  Sch: Scheduler,
{
  fn next(&mut self, value: Item) {
    let now = self.scheduler.now();
    let interval = now.saturating_sub(self.last);
    self.last = now;
    self.observer.next(TimeInterval { value, interval });
  }

  fn error(self, err: Err) { self.observer.error(err) }

  fn complete(self) { self.observer.complete() }

  fn is_closed(&self) -> bool { self.observer.is_closed() }
}
