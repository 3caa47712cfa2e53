//! Re-delivers notifications on another scheduler.

use super::delay::{DelaySubscription, PendingTasks};
use crate::{
  observable::{CoreObservable, ObservableType},
  observer::Observer,
  rc::MutRc,
  scheduler::{Scheduler, Task},
};

/// Every notification becomes a task on `scheduler`, scheduled without
/// delay, so the downstream observer runs on the scheduler's next turn and
/// never inside the source's call. Order is kept.
#[derive(Clone)]
pub struct ObserveOn<S, Sch> {
  pub source: S,
  pub scheduler: Sch,
}

impl<S: ObservableType, Sch> ObservableType for ObserveOn<S, Sch> {
  type Item = S::Item;
  type Err = S::Err;
}

pub struct ObserveOnObserver<O, Sch> {
  observer: MutRc<Option<O>>,
  scheduler: Sch,
  pending: PendingTasks,
}

impl<S, Sch, O> CoreObservable<O> for ObserveOn<S, Sch>
where
  S: CoreObservable<ObserveOnObserver<O, Sch>>,
  S::Item: 'static,
  S::Err: 'static,
  O: Observer<S::Item, S::Err> + 'static,
  Sch: Scheduler,
{
  type Unsub = DelaySubscription<S::Unsub>;

  fn actual_subscribe(self, observer: O) -> Self::Unsub {
    let pending = PendingTasks::default();
    let observer = ObserveOnObserver {
      observer: MutRc::own(Some(observer)),
      scheduler: self.scheduler,
      pending: pending.clone(),
    };
    DelaySubscription::new(self.source.actual_subscribe(observer), pending)
  }
}

fn deliver_next<O, Item, Err>((observer, value): (MutRc<Option<O>>, Item))
where
  O: Observer<Item, Err>,
{
  if let Some(observer) = observer.rc_deref_mut().as_mut() {
    observer.next(value);
  }
}

fn deliver_error<O, Item, Err>((observer, err): (MutRc<Option<O>>, Err))
where
  O: Observer<Item, Err>,
{
  let observer = observer.rc_deref_mut().take();
  observer.error(err);
}

fn deliver_complete<O, Item, Err>(observer: MutRc<Option<O>>)
where
  O: Observer<Item, Err>,
{
  let observer = observer.rc_deref_mut().take();
  observer.complete();
}

impl<O, Sch> ObserveOnObserver<O, Sch>
where
  Sch: Scheduler,
{
  fn push(&self, task: Task) {
    let handle = self.scheduler.schedule(task, None);
    self.pending.rc_deref_mut().push_open(handle);
  }
}

impl<Item, Err, O, Sch> Observer<Item, Err> for ObserveOnObserver<O, Sch>
where
  Item: 'static,
  Err: 'static,
  O: Observer<Item, Err> + 'static,
  Sch: Scheduler,
{
  fn next(&mut self, value: Item) {
    self.push(Task::once((self.observer.clone(), value), deliver_next::<O, Item, Err>));
  }

  fn error(self, err: Err) {
    self.push(Task::once((self.observer.clone(), err), deliver_error::<O, Item, Err>));
  }

  fn complete(self) {
    self.push(Task::once(self.observer.clone(), deliver_complete::<O, Item, Err>));
  }

  fn is_closed(&self) -> bool { self.observer.rc_deref().is_closed() }
}
