use std::{convert::Infallible, future::Future};

use futures::FutureExt;

use crate::{
  observable::{CoreObservable, ObservableType},
  observer::Observer,
  scheduler::{Scheduler, TaskHandle},
};

/// Emits the output of a future, then completes.
///
/// The future is driven by the scheduler of the context: polled whenever a
/// [`TestScheduler`](crate::scheduler::TestScheduler) runs, or spawned on the
/// current `LocalSet` by the tokio backed scheduler. Unsubscribing drops it
/// at the next poll.
#[derive(Clone)]
pub struct FromFuture<F, S> {
  pub future: F,
  pub scheduler: S,
}

impl<F: Future, S> ObservableType for FromFuture<F, S> {
  type Item = F::Output;
  type Err = Infallible;
}

impl<F, S, O> CoreObservable<O> for FromFuture<F, S>
where
  F: Future + 'static,
  O: Observer<F::Output, Infallible> + 'static,
  S: Scheduler,
{
  type Unsub = TaskHandle;

  fn actual_subscribe(self, mut observer: O) -> Self::Unsub {
    let Self { future, scheduler } = self;
    let task = async move {
      let value = future.await;
      observer.next(value);
      observer.complete();
    };
    scheduler.spawn(task.boxed_local())
  }
}

#[cfg(test)]
mod tests {
  use std::{cell::RefCell, rc::Rc};

  use futures::{channel::oneshot, FutureExt};

  use crate::prelude::*;

  #[rxkoans_macro::test]
  fn ready_future_emits_on_next_turn() {
    let ctx = TestCtx::default();
    let log = Rc::new(RefCell::new(vec![]));
    let (n, c) = (log.clone(), log.clone());

    ctx
      .from_future(std::future::ready(42))
      .on_complete(move || c.borrow_mut().push("complete".to_owned()))
      .subscribe(move |v| n.borrow_mut().push(v.to_string()));

    assert!(log.borrow().is_empty());
    ctx.scheduler().flush();
    assert_eq!(*log.borrow(), ["42", "complete"]);
  }

  #[rxkoans_macro::test]
  fn waits_for_the_future() {
    let ctx = TestCtx::default();
    let seen = Rc::new(RefCell::new(None));
    let s = seen.clone();
    let (tx, rx) = oneshot::channel::<&'static str>();

    ctx
      .from_future(rx.map(|v| v.unwrap_or("dropped")))
      .subscribe(move |v| *s.borrow_mut() = Some(v));

    ctx.scheduler().flush();
    assert_eq!(*seen.borrow(), None);

    let _ = tx.send("resolved");
    ctx.scheduler().flush();
    assert_eq!(*seen.borrow(), Some("resolved"));
  }

  #[rxkoans_macro::test]
  fn unsubscribe_drops_the_future() {
    let ctx = TestCtx::default();
    let seen = Rc::new(RefCell::new(false));
    let s = seen.clone();

    ctx
      .from_future(std::future::ready(()))
      .subscribe(move |_| *s.borrow_mut() = true)
      .unsubscribe();

    ctx.scheduler().flush();
    assert!(!*seen.borrow());
    assert!(ctx.scheduler().is_empty());
  }
}
