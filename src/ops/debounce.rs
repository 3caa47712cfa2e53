use crate::{
  observable::{CoreObservable, ObservableType},
  observer::Observer,
  rc::MutRc,
  scheduler::{Duration, Scheduler, Task, TaskHandle},
  subscription::{Subscription, TupleSubscription},
};

/// Emits a value only after `duration` passed without another value.
///
/// Every value restarts the timer and replaces the pending one. On
/// completion the pending value is emitted right away, before the
/// completion; an error drops it.
#[derive(Clone)]
pub struct Debounce<S, Sch> {
  pub source: S,
  pub duration: Duration,
  pub scheduler: Sch,
}

impl<S: ObservableType, Sch> ObservableType for Debounce<S, Sch> {
  type Item = S::Item;
  type Err = S::Err;
}

type PendingHandle = MutRc<Option<TaskHandle>>;

impl<S, Sch, O> CoreObservable<O> for Debounce<S, Sch>
where
  S: CoreObservable<DebounceObserver<O, Sch, <S as ObservableType>::Item>>,
  S::Item: 'static,
  O: Observer<S::Item, S::Err> + 'static,
  Sch: Scheduler,
{
  type Unsub = TupleSubscription<S::Unsub, PendingHandle>;

  fn actual_subscribe(self, observer: O) -> Self::Unsub {
    let Self { source, duration, scheduler } = self;
    let handle = PendingHandle::default();
    let observer = DebounceObserver {
      observer: MutRc::own(Some(observer)),
      duration,
      scheduler,
      trailing_value: MutRc::own(None),
      handle: handle.clone(),
    };
    let u = source.actual_subscribe(observer);
    TupleSubscription::new(u, handle)
  }
}

pub struct DebounceObserver<O, Sch, Item> {
  observer: MutRc<Option<O>>,
  scheduler: Sch,
  duration: Duration,
  trailing_value: MutRc<Option<Item>>,
  handle: PendingHandle,
}

fn debounce_task<O, Item, Err>((observer, value): (MutRc<Option<O>>, MutRc<Option<Item>>))
where
  O: Observer<Item, Err>,
{
  let value = value.rc_deref_mut().take();
  if let (Some(value), Some(observer)) = (value, observer.rc_deref_mut().as_mut()) {
    observer.next(value);
  }
}

impl<O, Sch, Item> DebounceObserver<O, Sch, Item> {
  fn cancel_pending(&self) {
    let pending = self.handle.rc_deref_mut().take();
    pending.unsubscribe();
  }
}

impl<Item, Err, O, Sch> Observer<Item, Err> for DebounceObserver<O, Sch, Item>
where
  Item: 'static,
  O: Observer<Item, Err> + 'static,
  Sch: Scheduler,
{
  fn next(&mut self, value: Item) {
    self.cancel_pending();
    *self.trailing_value.rc_deref_mut() = Some(value);
    let task = Task::once(
      (self.observer.clone(), self.trailing_value.clone()),
      debounce_task::<O, Item, Err>,
    );
    let handle = self.scheduler.schedule(task, Some(self.duration));
    *self.handle.rc_deref_mut() = Some(handle);
  }

  fn error(self, err: Err) {
    self.cancel_pending();
    self.trailing_value.rc_deref_mut().take();
    self.observer.error(err);
  }

  fn complete(mut self) {
    self.cancel_pending();
    let value = self.trailing_value.rc_deref_mut().take();
    if let Some(value) = value {
      self.observer.next(value);
    }
    self.observer.complete();
  }

  fn is_closed(&self) -> bool { self.observer.rc_deref().is_closed() }
}
