//! Everything needed to build and drive a pipeline.

pub use std::convert::Infallible;

#[cfg(feature = "scheduler")]
pub use crate::scheduler::LocalScheduler;
pub use crate::{
  context::*,
  factory::ObservableFactory,
  observable::{CoreObservable, EventEmitter, ListenerId, Observable, ObservableType},
  observer::{Emitter, Observer, ObserverFn},
  ops::{
    group_by::GroupedObservable,
    into_future::ObservableFuture,
    time_interval::TimeInterval,
    timeout::TimeoutError,
  },
  scheduler::{Duration, Scheduler, Task, TaskHandle, TaskState, TestScheduler},
  subject::Subject,
  subscription::{ClosureSubscription, LocalSubscription, Subscription, SubscriptionGuard},
};
