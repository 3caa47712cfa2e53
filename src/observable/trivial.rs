use std::marker::PhantomData;

use crate::{
  observable::{CoreObservable, ObservableType},
  observer::Observer,
};

/// Completes as soon as it is subscribed.
pub struct Empty<Item, Err>(PhantomData<fn() -> (Item, Err)>);

/// Never emits and never terminates.
pub struct Never<Item, Err>(PhantomData<fn() -> (Item, Err)>);

/// Errors with the given value as soon as it is subscribed.
#[derive(Clone)]
pub struct ThrowErr<Item, Err> {
  err: Err,
  _marker: PhantomData<fn() -> Item>,
}

impl<Item, Err> Empty<Item, Err> {
  pub fn new() -> Self { Empty(PhantomData) }
}

impl<Item, Err> Never<Item, Err> {
  pub fn new() -> Self { Never(PhantomData) }
}

impl<Item, Err> ThrowErr<Item, Err> {
  pub fn new(err: Err) -> Self { ThrowErr { err, _marker: PhantomData } }
}

// Manual impls: the markers should not require `Item: Clone`.
impl<Item, Err> Clone for Empty<Item, Err> {
  fn clone(&self) -> Self { Self::new() }
}

impl<Item, Err> Clone for Never<Item, Err> {
  fn clone(&self) -> Self { Self::new() }
}

impl<Item, Err> Default for Empty<Item, Err> {
  fn default() -> Self { Self::new() }
}

impl<Item, Err> Default for Never<Item, Err> {
  fn default() -> Self { Self::new() }
}

impl<Item, Err> ObservableType for Empty<Item, Err> {
  type Item = Item;
  type Err = Err;
}

impl<Item, Err> ObservableType for Never<Item, Err> {
  type Item = Item;
  type Err = Err;
}

impl<Item, Err> ObservableType for ThrowErr<Item, Err> {
  type Item = Item;
  type Err = Err;
}

impl<Item, Err, O> CoreObservable<O> for Empty<Item, Err>
where
  O: Observer<Item, Err>,
{
  type Unsub = ();

  fn actual_subscribe(self, observer: O) -> Self::Unsub { observer.complete() }
}

impl<Item, Err, O> CoreObservable<O> for Never<Item, Err>
where
  O: Observer<Item, Err>,
{
  type Unsub = ();

  fn actual_subscribe(self, _: O) -> Self::Unsub {}
}

impl<Item, Err, O> CoreObservable<O> for ThrowErr<Item, Err>
where
  O: Observer<Item, Err>,
{
  type Unsub = ();

  fn actual_subscribe(self, observer: O) -> Self::Unsub { observer.error(self.err) }
}

#[cfg(test)]
mod tests {
  use std::{cell::RefCell, rc::Rc};

  use crate::prelude::*;

  type Log = Rc<RefCell<Vec<String>>>;

  fn recording(log: &Log) -> impl Observer<i32, String> {
    let (n, e, c) = (log.clone(), log.clone(), log.clone());
    ObserverFn::new(
      move |v: i32| n.borrow_mut().push(format!("next {v}")),
      move |err: String| e.borrow_mut().push(format!("error {err}")),
      move || c.borrow_mut().push("complete".to_owned()),
    )
  }

  #[rxkoans_macro::test]
  fn throw_err_only_errors() {
    let ctx = TestCtx::default();
    let log = Log::default();
    ctx
      .throw_err::<i32, _>("error".to_owned())
      .subscribe_with(recording(&log));
    assert_eq!(*log.borrow(), ["error error"]);
  }

  #[rxkoans_macro::test]
  fn empty_only_completes() {
    let ctx = TestCtx::default();
    let log = Log::default();
    let subscription = ctx.empty::<i32, String>().subscribe_with(recording(&log));
    assert_eq!(*log.borrow(), ["complete"]);
    assert!(subscription.is_closed());
  }

  #[rxkoans_macro::test]
  fn never_stays_open() {
    let ctx = TestCtx::default();
    let log = Log::default();
    let subscription = ctx.never::<i32, String>().subscribe_with(recording(&log));
    ctx.scheduler().flush();
    assert!(log.borrow().is_empty());
    assert!(!subscription.is_closed());
  }
}
