use std::marker::PhantomData;

use crate::{
  observable::{CoreObservable, ObservableType},
  observer::{Emitter, Observer},
  subscription::Subscription,
};

/// An observable built from a producer closure.
///
/// The producer runs once per subscription, receives an [`Emitter`] and
/// returns its teardown.
#[derive(Clone)]
pub struct Create<F, Item, Err> {
  f: F,
  _marker: PhantomData<fn() -> (Item, Err)>,
}

impl<F, Item, Err> Create<F, Item, Err> {
  pub fn new(f: F) -> Self { Self { f, _marker: PhantomData } }
}

impl<F, Item, Err> ObservableType for Create<F, Item, Err> {
  type Item = Item;
  type Err = Err;
}

struct CreateEmitter<O>(Option<O>);

impl<O, Item, Err> Emitter<Item, Err> for CreateEmitter<O>
where
  O: Observer<Item, Err>,
{
  #[inline]
  fn next(&mut self, value: Item) {
    if let Some(observer) = &mut self.0 {
      observer.next(value);
    }
  }

  #[inline]
  fn error(&mut self, err: Err) {
    if let Some(observer) = self.0.take() {
      observer.error(err);
    }
  }

  #[inline]
  fn complete(&mut self) {
    if let Some(observer) = self.0.take() {
      observer.complete();
    }
  }

  #[inline]
  fn is_closed(&self) -> bool { self.0.is_closed() }
}

impl<F, Item, Err, U, O> CoreObservable<O> for Create<F, Item, Err>
where
  O: Observer<Item, Err>,
  F: FnOnce(&mut dyn Emitter<Item, Err>) -> U,
  U: Subscription + 'static,
{
  type Unsub = U;

  fn actual_subscribe(self, observer: O) -> Self::Unsub {
    let mut emitter = CreateEmitter(Some(observer));
    (self.f)(&mut emitter)
  }
}

/// Like [`Create`], but the producer may fail before or while emitting. An
/// `Err` is delivered as the stream's error.
#[derive(Clone)]
pub struct TryCreate<F, Item, Err> {
  f: F,
  _marker: PhantomData<fn() -> (Item, Err)>,
}

impl<F, Item, Err> TryCreate<F, Item, Err> {
  pub fn new(f: F) -> Self { Self { f, _marker: PhantomData } }
}

impl<F, Item, Err> ObservableType for TryCreate<F, Item, Err> {
  type Item = Item;
  type Err = Err;
}

impl<F, Item, Err, U, O> CoreObservable<O> for TryCreate<F, Item, Err>
where
  O: Observer<Item, Err>,
  F: FnOnce(&mut dyn Emitter<Item, Err>) -> Result<U, Err>,
  U: Subscription + 'static,
{
  type Unsub = Option<U>;

  fn actual_subscribe(self, observer: O) -> Self::Unsub {
    let mut emitter = CreateEmitter(Some(observer));
    match (self.f)(&mut emitter) {
      Ok(teardown) => Some(teardown),
      Err(err) => {
        emitter.error(err);
        None
      }
    }
  }
}

#[cfg(test)]
mod tests {
  use std::{cell::RefCell, rc::Rc};

  use crate::{prelude::*, subscription::ClosureSubscription};

  #[rxkoans_macro::test]
  fn next_then_complete() {
    let ctx = TestCtx::default();
    let emitted = Rc::new(RefCell::new(vec![]));
    let e = emitted.clone();

    ctx
      .create(|emitter: &mut dyn Emitter<i32, Infallible>| {
        emitter.next(1);
        emitter.next(2);
        emitter.complete();
        emitter.next(3);
      })
      .subscribe(move |v| e.borrow_mut().push(v));

    assert_eq!(*emitted.borrow(), vec![1, 2]);
  }

  #[rxkoans_macro::test]
  fn error_reaches_handler() {
    let ctx = TestCtx::default();
    let error = Rc::new(RefCell::new(None));
    let e = error.clone();

    ctx
      .create(|emitter: &mut dyn Emitter<(), &'static str>| emitter.error("oops"))
      .on_error(move |err| *e.borrow_mut() = Some(err))
      .subscribe(|_| {});

    assert_eq!(*error.borrow(), Some("oops"));
  }

  #[rxkoans_macro::test]
  fn teardown_runs_on_unsubscribe() {
    let ctx = TestCtx::default();
    let torn_down = Rc::new(RefCell::new(false));
    let t = torn_down.clone();

    let subscription = ctx
      .create(move |emitter: &mut dyn Emitter<i32, Infallible>| {
        emitter.next(1);
        ClosureSubscription(move || *t.borrow_mut() = true)
      })
      .subscribe(|_| {});

    assert!(!*torn_down.borrow());
    subscription.unsubscribe();
    assert!(*torn_down.borrow());
  }

  #[rxkoans_macro::test]
  fn teardown_runs_after_synchronous_completion() {
    let ctx = TestCtx::default();
    let log = Rc::new(RefCell::new(vec![]));
    let (n, t) = (log.clone(), log.clone());

    let subscription = ctx
      .create(move |emitter: &mut dyn Emitter<&'static str, Infallible>| {
        emitter.next("value");
        emitter.complete();
        ClosureSubscription(move || t.borrow_mut().push("teardown"))
      })
      .subscribe(move |v| n.borrow_mut().push(v));

    assert_eq!(*log.borrow(), ["value", "teardown"]);
    assert!(subscription.is_closed());
  }

  #[rxkoans_macro::test]
  fn each_subscription_runs_the_producer() {
    let ctx = TestCtx::default();
    let runs = Rc::new(RefCell::new(0));
    let r = runs.clone();
    let source = ctx.create(move |emitter: &mut dyn Emitter<i32, Infallible>| {
      *r.borrow_mut() += 1;
      emitter.complete();
    });

    source.clone().subscribe(|_| {});
    source.subscribe(|_| {});
    assert_eq!(*runs.borrow(), 2);
  }

  #[rxkoans_macro::test]
  fn try_create_failure_becomes_error() {
    let ctx = TestCtx::default();
    let log = Rc::new(RefCell::new(vec![]));
    let (n, e) = (log.clone(), log.clone());

    ctx
      .try_create(|emitter: &mut dyn Emitter<i32, String>| {
        emitter.next(1);
        Err::<(), _>("producer failed".to_owned())
      })
      .subscribe_with(ObserverFn::new(
        move |v: i32| n.borrow_mut().push(v.to_string()),
        move |err: String| e.borrow_mut().push(err),
        || unreachable!(),
      ));

    assert_eq!(*log.borrow(), ["1", "producer failed"]);
  }
}
