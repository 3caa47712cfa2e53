use std::convert::Infallible;

use crate::{
  observable::{CoreObservable, ObservableType},
  observer::Observer,
  scheduler::{Duration, Scheduler, Task, TaskHandle, TaskState},
};

/// Emits `()` once after `delay`, then completes.
#[derive(Clone)]
pub struct Timer<S> {
  pub delay: Duration,
  pub scheduler: S,
}

fn timer_task<O>(mut observer: O)
where
  O: Observer<(), Infallible>,
{
  observer.next(());
  observer.complete();
}

impl<S> ObservableType for Timer<S> {
  type Item = ();
  type Err = Infallible;
}

impl<S, O> CoreObservable<O> for Timer<S>
where
  O: Observer<(), Infallible> + 'static,
  S: Scheduler,
{
  type Unsub = TaskHandle;

  fn actual_subscribe(self, observer: O) -> Self::Unsub {
    self
      .scheduler
      .schedule(Task::once(observer, timer_task::<O>), Some(self.delay))
  }
}

/// Emits `0, 1, 2, ...` every `period`, starting one period after
/// subscription. Never completes.
#[derive(Clone)]
pub struct Interval<S> {
  pub period: Duration,
  pub scheduler: S,
}

struct IntervalState<O> {
  observer: O,
  count: usize,
  period: Duration,
}

fn interval_task<O>(state: &mut IntervalState<O>) -> TaskState
where
  O: Observer<usize, Infallible>,
{
  if state.observer.is_closed() {
    return TaskState::Finished;
  }
  state.observer.next(state.count);
  state.count += 1;
  TaskState::Sleeping(state.period)
}

impl<S> ObservableType for Interval<S> {
  type Item = usize;
  type Err = Infallible;
}

impl<S, O> CoreObservable<O> for Interval<S>
where
  O: Observer<usize, Infallible> + 'static,
  S: Scheduler,
{
  type Unsub = TaskHandle;

  fn actual_subscribe(self, observer: O) -> Self::Unsub {
    let state = IntervalState { observer, count: 0, period: self.period };
    self
      .scheduler
      .schedule(Task::new(state, interval_task::<O>), Some(self.period))
  }
}
