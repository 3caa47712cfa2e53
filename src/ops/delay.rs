use crate::{
  observable::{CoreObservable, ObservableType},
  observer::Observer,
  rc::MutRc,
  scheduler::{Duration, Scheduler, Task, TaskHandle},
  subscription::{DynamicSubscriptions, Subscription},
};

/// Re-emits every value, and the completion, `delay` after it arrived.
///
/// Relative order is kept because all deliveries share the same delay. An
/// error is forwarded at once and drops whatever is still waiting.
#[derive(Debug, Clone)]
pub struct Delay<S, Sch> {
  pub source: S,
  pub delay: Duration,
  pub scheduler: Sch,
}

impl<S: ObservableType, Sch> ObservableType for Delay<S, Sch> {
  type Item = S::Item;
  type Err = S::Err;
}

pub(crate) type PendingTasks = MutRc<DynamicSubscriptions<TaskHandle>>;

pub struct DelayObserver<O, Sch> {
  delay: Duration,
  scheduler: Sch,
  observer: MutRc<Option<O>>,
  pending: PendingTasks,
}

/// Cancels the source and every delivery not yet made.
pub struct DelaySubscription<U> {
  source: U,
  pending: PendingTasks,
}

impl<U> DelaySubscription<U> {
  pub(crate) fn new(source: U, pending: PendingTasks) -> Self { Self { source, pending } }
}

impl<U: Subscription> Subscription for DelaySubscription<U> {
  fn unsubscribe(self) {
    self.source.unsubscribe();
    self.pending.rc_deref_mut().unsubscribe_all();
  }

  fn is_closed(&self) -> bool { self.source.is_closed() && self.pending.rc_deref().all_closed() }
}

impl<S, Sch, O> CoreObservable<O> for Delay<S, Sch>
where
  S: CoreObservable<DelayObserver<O, Sch>>,
  S::Item: 'static,
  O: Observer<S::Item, S::Err> + 'static,
  Sch: Scheduler,
{
  type Unsub = DelaySubscription<S::Unsub>;

  fn actual_subscribe(self, observer: O) -> Self::Unsub {
    let Self { source, delay, scheduler } = self;
    let pending = PendingTasks::default();
    let observer = DelayObserver {
      delay,
      scheduler,
      observer: MutRc::own(Some(observer)),
      pending: pending.clone(),
    };
    let source = source.actual_subscribe(observer);
    DelaySubscription { source, pending }
  }
}

fn delay_emit_value<O, Item, Err>((observer, value): (MutRc<Option<O>>, Item))
where
  O: Observer<Item, Err>,
{
  if let Some(observer) = observer.rc_deref_mut().as_mut() {
    observer.next(value);
  }
}

fn delay_complete<O, Item, Err>(observer: MutRc<Option<O>>)
where
  O: Observer<Item, Err>,
{
  let observer = observer.rc_deref_mut().take();
  if let Some(observer) = observer {
    observer.complete();
  }
}

impl<Item, Err, O, Sch> Observer<Item, Err> for DelayObserver<O, Sch>
where
  Item: 'static,
  O: Observer<Item, Err> + 'static,
  Sch: Scheduler,
{
  fn next(&mut self, value: Item) {
    let task = Task::once((self.observer.clone(), value), delay_emit_value::<O, Item, Err>);
    let handle = self.scheduler.schedule(task, Some(self.delay));
    self.pending.rc_deref_mut().push_open(handle);
  }

  fn error(self, err: Err) {
    self.pending.rc_deref_mut().unsubscribe_all();
    self.observer.error(err)
  }

  fn complete(self) {
    let task = Task::once(self.observer.clone(), delay_complete::<O, Item, Err>);
    let handle = self.scheduler.schedule(task, Some(self.delay));
    self.pending.rc_deref_mut().push_open(handle);
  }

  fn is_closed(&self) -> bool { self.observer.rc_deref().is_closed() }
}
