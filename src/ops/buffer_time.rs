//! BufferTime operator implementation
//!
//! Collects the values of each time window and emits them as one `Vec` when
//! the window ends. Windows are back to back and an empty window is still
//! emitted, as an empty `Vec`.

use std::mem;

use crate::{
  observable::{CoreObservable, ObservableType},
  observer::Observer,
  rc::MutRc,
  scheduler::{Duration, Scheduler, Task, TaskHandle, TaskState},
  subscription::{Subscription, TupleSubscription},
};

// ==================== BufferTime ====================

#[derive(Clone)]
pub struct BufferTime<S, Sch> {
  pub source: S,
  pub duration: Duration,
  pub scheduler: Sch,
}

impl<S: ObservableType, Sch> ObservableType for BufferTime<S, Sch> {
  type Item = Vec<S::Item>;
  type Err = S::Err;
}

// ==================== Observer ====================

pub struct BufferTimeObserver<O, Item> {
  observer: MutRc<Option<O>>,
  buffer: MutRc<Vec<Item>>,
  handle: TaskHandle,
}

impl<O, Item, Err> Observer<Item, Err> for BufferTimeObserver<O, Item>
where
  O: Observer<Vec<Item>, Err>,
{
  fn next(&mut self, v: Item) {
    if !self.observer.rc_deref().is_closed() {
      self.buffer.rc_deref_mut().push(v);
    }
  }

  fn error(self, e: Err) {
    self.handle.unsubscribe();
    self.buffer.rc_deref_mut().clear();
    self.observer.error(e);
  }

  fn complete(self) {
    self.handle.unsubscribe();
    let Some(mut observer) = self.observer.rc_deref_mut().take() else {
      return;
    };
    let pending = mem::take(&mut *self.buffer.rc_deref_mut());
    if !pending.is_empty() {
      observer.next(pending);
    }
    observer.complete();
  }

  fn is_closed(&self) -> bool { self.observer.rc_deref().is_closed() }
}

// ==================== Task Handler ====================

type WindowState<O, Item> = (MutRc<Option<O>>, MutRc<Vec<Item>>, Duration);

fn emit_window<O, Item, Err>(
  (observer, buffer, duration): &mut WindowState<O, Item>,
) -> TaskState
where
  O: Observer<Vec<Item>, Err>,
{
  let window = mem::take(&mut *buffer.rc_deref_mut());
  match observer.rc_deref_mut().as_mut() {
    Some(observer) if !observer.is_closed() => observer.next(window),
    _ => return TaskState::Finished,
  }
  TaskState::Sleeping(*duration)
}

// ==================== CoreObservable ====================

impl<S, Sch, O> CoreObservable<O> for BufferTime<S, Sch>
where
  S: CoreObservable<BufferTimeObserver<O, <S as ObservableType>::Item>>,
  S::Item: 'static,
  O: Observer<Vec<S::Item>, S::Err> + 'static,
  Sch: Scheduler,
{
  type Unsub = TupleSubscription<TaskHandle, S::Unsub>;

  fn actual_subscribe(self, observer: O) -> Self::Unsub {
    let BufferTime { source, duration, scheduler } = self;
    let observer = MutRc::own(Some(observer));
    let buffer = MutRc::own(Vec::new());

    let task = Task::new(
      (observer.clone(), buffer.clone(), duration),
      emit_window::<O, S::Item, S::Err>,
    );
    let handle = scheduler.schedule(task, Some(duration));

    let source = source.actual_subscribe(BufferTimeObserver {
      observer,
      buffer,
      handle: handle.clone(),
    });
    TupleSubscription::new(handle, source)
  }
}
