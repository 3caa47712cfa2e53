//! Test Scheduler for deterministic testing of time-based operators.
//!
//! Time is virtual: it only moves when the test calls [`TestScheduler::advance_by`],
//! [`TestScheduler::advance_to`] or [`TestScheduler::flush`], and every task
//! that becomes due runs synchronously inside that call.
//!
//! # Usage
//!
//! ```rust
//! use std::{cell::RefCell, rc::Rc};
//!
//! use rxkoans::prelude::*;
//!
//! let ctx = TestCtx::default();
//! let received = Rc::new(RefCell::new(Vec::new()));
//! let r = received.clone();
//!
//! ctx
//!   .of(42)
//!   .delay(Duration::from_millis(100))
//!   .subscribe(move |v| r.borrow_mut().push(v));
//!
//! assert!(received.borrow().is_empty());
//! ctx.scheduler().advance_by(Duration::from_millis(100));
//! assert_eq!(*received.borrow(), vec![42]);
//! ```
//!
//! Each `TestScheduler::new()` owns its own clock and queue; clones share
//! them. Nothing is global, so tests running on the same thread stay
//! isolated.

use std::{
  cell::RefCell,
  cmp::Ordering,
  collections::BinaryHeap,
  mem,
  rc::Rc,
  task::{Context, Poll},
};

use futures::future::LocalBoxFuture;
use log::trace;

use super::{Duration, Scheduler, Task, TaskHandle, TaskState};
use crate::subscription::Subscription;

// ==================== Internal State ====================

#[derive(Default)]
struct TestSchedulerState {
  virtual_time: Duration,
  task_queue: BinaryHeap<ScheduledTask>,
  next_task_id: usize,
  futures: Vec<SpawnedFuture>,
}

struct ScheduledTask {
  scheduled_time: Duration,
  task_id: usize,
  task: Task,
  handle: TaskHandle,
  // Re-queued by a step that asked to run again with no delay.
  rerun: bool,
}

struct SpawnedFuture {
  future: LocalBoxFuture<'static, ()>,
  handle: TaskHandle,
}

impl PartialEq for ScheduledTask {
  fn eq(&self, other: &Self) -> bool {
    self.scheduled_time == other.scheduled_time && self.task_id == other.task_id
  }
}

impl Eq for ScheduledTask {}

impl PartialOrd for ScheduledTask {
  fn partial_cmp(&self, other: &Self) -> Option<Ordering> { Some(self.cmp(other)) }
}

impl Ord for ScheduledTask {
  fn cmp(&self, other: &Self) -> Ordering {
    // Min-heap: earlier times first, then FIFO by task_id
    other
      .scheduled_time
      .cmp(&self.scheduled_time)
      .then_with(|| other.task_id.cmp(&self.task_id))
  }
}

impl TestSchedulerState {
  fn push(&mut self, task: Task, handle: TaskHandle, delay: Duration) {
    self.enqueue(task, handle, delay, false);
  }

  fn requeue(&mut self, task: Task, handle: TaskHandle, delay: Duration) {
    self.enqueue(task, handle, delay, delay.is_zero());
  }

  fn enqueue(&mut self, task: Task, handle: TaskHandle, delay: Duration, rerun: bool) {
    let task_id = self.next_task_id;
    self.next_task_id += 1;
    let scheduled_time = self.virtual_time + delay;
    self
      .task_queue
      .push(ScheduledTask { scheduled_time, task_id, task, handle, rerun });
  }
}

// ==================== TestScheduler ====================

/// A virtual time scheduler for deterministic testing.
#[derive(Clone, Default)]
pub struct TestScheduler(Rc<RefCell<TestSchedulerState>>);

impl TestScheduler {
  pub fn new() -> Self { Self::default() }

  /// The current virtual time.
  pub fn now(&self) -> Duration { self.0.borrow().virtual_time }

  /// Number of queued tasks and unfinished futures that are not cancelled.
  pub fn pending_count(&self) -> usize {
    let state = self.0.borrow();
    let tasks = state
      .task_queue
      .iter()
      .filter(|t| !t.handle.is_closed())
      .count();
    let futures = state
      .futures
      .iter()
      .filter(|f| !f.handle.is_closed())
      .count();
    tasks + futures
  }

  pub fn is_empty(&self) -> bool { self.pending_count() == 0 }

  /// Advance virtual time by `duration`, running every task that becomes due.
  ///
  /// Tasks run in order of their scheduled time, FIFO for equal times. A
  /// task that returns `Sleeping(d)` runs again `d` after the time it was
  /// due. One that returns `Yield` or `Sleeping(Duration::ZERO)` runs again
  /// at the same time, but not before the next call that moves the clock.
  pub fn advance_by(&self, duration: Duration) {
    let target = self.now() + duration;
    self.advance_to(target);
  }

  /// Advance virtual time to `target`. Moving backwards is a no-op.
  pub fn advance_to(&self, target: Duration) {
    if target < self.now() {
      return;
    }
    self.execute_tasks_until(Some(target));
    self.0.borrow_mut().virtual_time = target;
  }

  /// Run until the queue is empty, jumping the clock to each task's time.
  ///
  /// A repeating task keeps running until it finishes or is cancelled, so
  /// never flush while an endless `interval` with a non-zero period is
  /// subscribed.
  pub fn flush(&self) { self.execute_tasks_until(None); }

  fn execute_tasks_until(&self, target: Option<Duration>) {
    // Zero-delay reruns queued from here on wait for the next call.
    let cutoff = self.0.borrow().next_task_id;
    let mut held = Vec::new();
    loop {
      self.poll_futures();

      let next = {
        let mut state = self.0.borrow_mut();
        loop {
          match state.task_queue.peek() {
            Some(t) if t.handle.is_closed() => {
              state.task_queue.pop();
            }
            Some(t) if t.rerun && t.task_id >= cutoff => {
              held.extend(state.task_queue.pop());
            }
            _ => break,
          }
        }
        let due = state
          .task_queue
          .peek()
          .is_some_and(|t| target.is_none_or(|limit| t.scheduled_time <= limit));
        if due {
          let task = state.task_queue.pop();
          if let Some(task) = &task {
            state.virtual_time = state.virtual_time.max(task.scheduled_time);
          }
          task
        } else {
          None
        }
      };

      // The state borrow is released here: tasks schedule more tasks.
      let Some(mut scheduled) = next else {
        break;
      };
      trace!(
        "test scheduler at {:?}: running task {}",
        scheduled.scheduled_time, scheduled.task_id
      );

      let result = scheduled.task.step();
      if scheduled.handle.is_closed() {
        continue;
      }
      let mut state = self.0.borrow_mut();
      match result {
        TaskState::Finished => scheduled.handle.mark_finished(),
        TaskState::Yield => state.requeue(scheduled.task, scheduled.handle, Duration::ZERO),
        TaskState::Sleeping(sleep) => state.requeue(scheduled.task, scheduled.handle, sleep),
      }
    }
    self.0.borrow_mut().task_queue.extend(held);
    self.poll_futures();
  }

  fn poll_futures(&self) {
    let futures = mem::take(&mut self.0.borrow_mut().futures);
    if futures.is_empty() {
      return;
    }
    let waker = futures::task::noop_waker();
    let mut cx = Context::from_waker(&waker);
    let mut pending = Vec::with_capacity(futures.len());
    for mut spawned in futures {
      if spawned.handle.is_closed() {
        continue;
      }
      match spawned.future.as_mut().poll(&mut cx) {
        Poll::Ready(()) => spawned.handle.mark_finished(),
        Poll::Pending => pending.push(spawned),
      }
    }
    let mut state = self.0.borrow_mut();
    pending.append(&mut state.futures);
    state.futures = pending;
  }
}

impl Scheduler for TestScheduler {
  fn schedule(&self, task: Task, delay: Option<Duration>) -> TaskHandle {
    let handle = TaskHandle::new();
    self
      .0
      .borrow_mut()
      .push(task, handle.clone(), delay.unwrap_or(Duration::ZERO));
    handle
  }

  /// Spawned futures are polled each time the clock runs, with a no-op
  /// waker.
  fn spawn(&self, future: LocalBoxFuture<'static, ()>) -> TaskHandle {
    let handle = TaskHandle::new();
    self
      .0
      .borrow_mut()
      .futures
      .push(SpawnedFuture { future, handle: handle.clone() });
    handle
  }

  fn now(&self) -> Duration { TestScheduler::now(self) }
}

#[cfg(test)]
mod tests {
  use std::cell::Cell;

  use super::*;

  #[rxkoans_macro::test]
  fn test_advance_by_cumulative() {
    let scheduler = TestScheduler::new();

    scheduler.advance_by(Duration::from_millis(100));
    assert_eq!(scheduler.now(), Duration::from_millis(100));

    scheduler.advance_by(Duration::from_millis(50));
    assert_eq!(scheduler.now(), Duration::from_millis(150));
  }

  #[rxkoans_macro::test]
  fn instances_do_not_share_time() {
    let a = TestScheduler::new();
    let b = TestScheduler::new();
    a.advance_by(Duration::from_secs(1));

    assert_eq!(b.now(), Duration::ZERO);
    assert_eq!(a.clone().now(), Duration::from_secs(1));
  }

  #[rxkoans_macro::test]
  fn test_flush_empty_queue() {
    let scheduler = TestScheduler::new();
    scheduler.flush();
    assert_eq!(scheduler.now(), Duration::ZERO);
  }

  #[rxkoans_macro::test]
  fn test_schedule_immediate_and_delayed() {
    let scheduler = TestScheduler::new();
    let results = Rc::new(RefCell::new(Vec::new()));

    scheduler.schedule(
      Task::new(results.clone(), |v| {
        v.borrow_mut().push("immediate");
        TaskState::Finished
      }),
      None,
    );
    scheduler.schedule(
      Task::new(results.clone(), |v| {
        v.borrow_mut().push("delayed");
        TaskState::Finished
      }),
      Some(Duration::from_millis(100)),
    );

    assert_eq!(scheduler.pending_count(), 2);
    assert!(results.borrow().is_empty());

    scheduler.advance_by(Duration::ZERO);
    assert_eq!(*results.borrow(), vec!["immediate"]);

    scheduler.advance_by(Duration::from_millis(100));
    assert_eq!(*results.borrow(), vec!["immediate", "delayed"]);
    assert!(scheduler.is_empty());
  }

  #[rxkoans_macro::test]
  fn test_task_cancellation() {
    let scheduler = TestScheduler::new();
    let executed = Rc::new(Cell::new(false));

    let handle = scheduler.schedule(
      Task::new(executed.clone(), |v| {
        v.set(true);
        TaskState::Finished
      }),
      Some(Duration::from_millis(100)),
    );

    handle.unsubscribe();
    assert_eq!(scheduler.pending_count(), 0);
    scheduler.advance_by(Duration::from_millis(150));

    assert!(!executed.get());
  }

  #[rxkoans_macro::test]
  fn test_fifo_ordering_same_time() {
    let scheduler = TestScheduler::new();
    let order = Rc::new(RefCell::new(Vec::new()));

    for i in 0..5 {
      scheduler.schedule(
        Task::new((order.clone(), i), |(v, id)| {
          v.borrow_mut().push(*id);
          TaskState::Finished
        }),
        Some(Duration::from_millis(100)),
      );
    }

    scheduler.advance_by(Duration::from_millis(100));
    assert_eq!(*order.borrow(), vec![0, 1, 2, 3, 4]);
  }

  #[rxkoans_macro::test]
  fn earlier_time_runs_first() {
    let scheduler = TestScheduler::new();
    let order = Rc::new(RefCell::new(Vec::new()));

    for (name, ms) in [("late", 30), ("early", 10), ("middle", 20)] {
      scheduler.schedule(
        Task::new((order.clone(), name), |(v, name)| {
          v.borrow_mut().push(*name);
          TaskState::Finished
        }),
        Some(Duration::from_millis(ms)),
      );
    }

    scheduler.flush();
    assert_eq!(*order.borrow(), vec!["early", "middle", "late"]);
    assert_eq!(scheduler.now(), Duration::from_millis(30));
  }

  #[rxkoans_macro::test]
  fn sleeping_task_repeats_without_drift() {
    let scheduler = TestScheduler::new();
    let ticks = Rc::new(RefCell::new(Vec::new()));

    scheduler.schedule(
      Task::new((ticks.clone(), scheduler.clone()), |(ticks, scheduler)| {
        ticks.borrow_mut().push(scheduler.now());
        if ticks.borrow().len() == 3 {
          TaskState::Finished
        } else {
          TaskState::Sleeping(Duration::from_millis(10))
        }
      }),
      Some(Duration::from_millis(10)),
    );

    scheduler.advance_by(Duration::from_millis(25));
    assert_eq!(*ticks.borrow(), vec![Duration::from_millis(10), Duration::from_millis(20)]);

    scheduler.advance_by(Duration::from_millis(100));
    assert_eq!(ticks.borrow().len(), 3);
    assert!(scheduler.is_empty());
  }

  #[rxkoans_macro::test]
  fn yield_reruns_at_same_time() {
    let scheduler = TestScheduler::new();
    let count = Rc::new(Cell::new(0));

    scheduler.schedule(
      Task::new(count.clone(), |c| {
        c.set(c.get() + 1);
        if c.get() < 3 { TaskState::Yield } else { TaskState::Finished }
      }),
      None,
    );

    scheduler.advance_by(Duration::ZERO);
    assert_eq!(count.get(), 1);
    scheduler.advance_by(Duration::ZERO);
    scheduler.advance_by(Duration::ZERO);
    assert_eq!(count.get(), 3);
    assert_eq!(scheduler.now(), Duration::ZERO);
    assert!(scheduler.is_empty());
  }

  #[rxkoans_macro::test]
  fn zero_sleep_runs_once_per_advance() {
    let scheduler = TestScheduler::new();
    let ticks = Rc::new(RefCell::new(Vec::new()));

    scheduler.schedule(
      Task::new((ticks.clone(), scheduler.clone()), |(ticks, scheduler)| {
        ticks.borrow_mut().push(scheduler.now());
        TaskState::Sleeping(Duration::ZERO)
      }),
      None,
    );

    scheduler.advance_by(Duration::from_millis(1));
    scheduler.advance_by(Duration::from_millis(1));
    scheduler.flush();
    assert_eq!(
      *ticks.borrow(),
      vec![Duration::ZERO, Duration::from_millis(1), Duration::from_millis(2)]
    );
    assert_eq!(scheduler.pending_count(), 1);
  }

  #[rxkoans_macro::test]
  fn zero_rerun_does_not_block_other_tasks() {
    let scheduler = TestScheduler::new();
    let order = Rc::new(RefCell::new(Vec::new()));

    scheduler.schedule(
      Task::new(order.clone(), |v| {
        v.borrow_mut().push("spin");
        TaskState::Yield
      }),
      None,
    );
    scheduler.schedule(
      Task::new(order.clone(), |v| {
        v.borrow_mut().push("later");
        TaskState::Finished
      }),
      Some(Duration::from_millis(5)),
    );

    scheduler.advance_by(Duration::from_millis(10));
    assert_eq!(*order.borrow(), vec!["spin", "later"]);
    assert_eq!(scheduler.now(), Duration::from_millis(10));
  }

  #[rxkoans_macro::test]
  fn spawned_future_runs_when_clock_runs() {
    let scheduler = TestScheduler::new();
    let done = Rc::new(Cell::new(false));
    let d = done.clone();

    let handle = scheduler.spawn(Box::pin(async move { d.set(true) }));
    assert!(!done.get());

    scheduler.flush();
    assert!(done.get());
    assert!(handle.is_closed());
  }
}
