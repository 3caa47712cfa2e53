use std::{
  future::{poll_fn, Future},
  task::Poll,
};

use futures::future::LocalBoxFuture;
use tokio::time::{sleep_until, Instant};

use super::{Duration, Scheduler, Task, TaskHandle, TaskState};
use crate::subscription::Subscription;

/// Real-time scheduler on the current tokio `LocalSet`.
///
/// Tasks are spawned with `tokio::task::spawn_local`, so scheduling outside
/// a `LocalSet` panics. Time comes from `tokio::time`, which makes a paused
/// runtime (`#[rxkoans_macro::test(paused)]`) drive it deterministically.
#[derive(Clone, Copy, Debug)]
pub struct LocalScheduler {
  epoch: Instant,
}

impl LocalScheduler {
  pub fn new() -> Self { LocalScheduler { epoch: Instant::now() } }
}

impl Default for LocalScheduler {
  fn default() -> Self { Self::new() }
}

impl Scheduler for LocalScheduler {
  fn schedule(&self, mut task: Task, delay: Option<Duration>) -> TaskHandle {
    let handle = TaskHandle::new();
    let running = handle.clone();
    let mut due = Instant::now() + delay.unwrap_or(Duration::ZERO);
    tokio::task::spawn_local(async move {
      match delay {
        Some(_) => sleep_until(due).await,
        None => tokio::task::yield_now().await,
      }
      loop {
        if running.is_closed() {
          return;
        }
        match task.step() {
          TaskState::Finished => break,
          TaskState::Yield => tokio::task::yield_now().await,
          TaskState::Sleeping(period) => {
            // Measured from the due time, not from wake-up.
            due += period;
            sleep_until(due).await;
          }
        }
      }
      running.mark_finished();
    });
    handle
  }

  fn spawn(&self, future: LocalBoxFuture<'static, ()>) -> TaskHandle {
    let handle = TaskHandle::new();
    let running = handle.clone();
    tokio::task::spawn_local(async move {
      let mut future = future;
      poll_fn(|cx| {
        if running.is_closed() {
          Poll::Ready(())
        } else {
          future.as_mut().poll(cx)
        }
      })
      .await;
      running.mark_finished();
    });
    handle
  }

  fn now(&self) -> Duration { Instant::now() - self.epoch }
}
