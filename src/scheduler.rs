//! Scheduling of deferred work.
//!
//! Time-based operators never call downstream observers from a timer of
//! their own. They hand a [`Task`] to the [`Scheduler`] of their context and
//! the scheduler decides when it runs: on a virtual clock in tests
//! ([`TestScheduler`]) or on tokio timers ([`LocalScheduler`]).
//!
//! Ordering: tasks run in non-decreasing scheduled time and, for equal
//! times, in the order they were scheduled. A task scheduled without delay
//! runs on the scheduler's next turn, never inside the `schedule` call.

use std::{cell::Cell, rc::Rc};

use futures::future::LocalBoxFuture;
pub use std::time::Duration;

use crate::subscription::Subscription;

#[cfg(feature = "scheduler")]
mod local_scheduler;
pub mod test_scheduler;

#[cfg(feature = "scheduler")]
pub use local_scheduler::LocalScheduler;
pub use test_scheduler::TestScheduler;

// ==================== Task ====================

/// What a task wants after one step.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TaskState {
  /// Done, drop the task.
  Finished,
  /// Run again on the next turn at the same time.
  Yield,
  /// Run again after the given duration.
  Sleeping(Duration),
}

/// A unit of deferred work: some state plus a step function over it.
///
/// The step function is a plain `fn`, so every capture is spelled out in the
/// state and the task stays `'static`.
pub struct Task(Box<dyn FnMut() -> TaskState>);

impl Task {
  pub fn new<S: 'static>(mut state: S, handler: fn(&mut S) -> TaskState) -> Self {
    Task(Box::new(move || handler(&mut state)))
  }

  /// A task that runs `handler` once with the state by value.
  pub fn once<S: 'static>(state: S, handler: fn(S)) -> Self {
    let mut state = Some(state);
    Task(Box::new(move || {
      if let Some(state) = state.take() {
        handler(state);
      }
      TaskState::Finished
    }))
  }

  #[inline]
  pub fn step(&mut self) -> TaskState { (self.0)() }
}

// ==================== TaskHandle ====================

/// Cancel handle of a scheduled task or spawned future.
///
/// It closes when the task finishes or when it is unsubscribed. A cancelled
/// task never runs again, even if it is already due.
#[derive(Clone, Default, Debug)]
pub struct TaskHandle(Rc<Cell<bool>>);

impl TaskHandle {
  pub fn new() -> Self { Self::default() }

  /// A handle for work that already happened.
  pub fn finished() -> Self { TaskHandle(Rc::new(Cell::new(true))) }

  pub(crate) fn mark_finished(&self) { self.0.set(true) }
}

impl Subscription for TaskHandle {
  #[inline]
  fn unsubscribe(self) { self.0.set(true) }

  #[inline]
  fn is_closed(&self) -> bool { self.0.get() }
}

// ==================== Scheduler ====================

pub trait Scheduler: Clone + 'static {
  /// Run `task` after `delay`, or on the next turn when `delay` is `None`.
  fn schedule(&self, task: Task, delay: Option<Duration>) -> TaskHandle;

  /// Drive `future` to completion on this scheduler.
  fn spawn(&self, future: LocalBoxFuture<'static, ()>) -> TaskHandle;

  /// Time elapsed on this scheduler's clock since it was created.
  fn now(&self) -> Duration;
}

#[cfg(test)]
mod tests {
  use super::*;

  #[rxkoans_macro::test]
  fn once_runs_a_single_time() {
    let hits = Rc::new(Cell::new(0));
    let mut task = Task::once(hits.clone(), |h| h.set(h.get() + 1));

    assert_eq!(task.step(), TaskState::Finished);
    assert_eq!(task.step(), TaskState::Finished);
    assert_eq!(hits.get(), 1);
  }

  #[rxkoans_macro::test]
  fn handle_closes_on_unsubscribe() {
    let handle = TaskHandle::new();
    assert!(!handle.is_closed());
    handle.clone().unsubscribe();
    assert!(handle.is_closed());
    assert!(TaskHandle::finished().is_closed());
  }
}
