use crate::{
  observable::{CoreObservable, ObservableType},
  observer::Observer,
};

/// Runs a side effect for every value and forwards the value unchanged.
#[derive(Clone)]
pub struct Tap<S, F> {
  pub source: S,
  pub func: F,
}

pub struct TapObserver<O, F> {
  observer: O,
  func: F,
}

impl<S, F> ObservableType for Tap<S, F>
where
  S: ObservableType,
{
  type Item = S::Item;
  type Err = S::Err;
}

impl<S, F, O> CoreObservable<O> for Tap<S, F>
where
  S: CoreObservable<TapObserver<O, F>>,
  F: FnMut(&S::Item),
  O: Observer<S::Item, S::Err>,
{
  type Unsub = S::Unsub;

  fn actual_subscribe(self, observer: O) -> Self::Unsub {
    self
      .source
      .actual_subscribe(TapObserver { observer, func: self.func })
  }
}

impl<O, F, Item, Err> Observer<Item, Err> for TapObserver<O, F>
where
  O: Observer<Item, Err>,
  F: FnMut(&Item),
{
  fn next(&mut self, value: Item) {
    (self.func)(&value);
    self.observer.next(value)
  }

  fn error(self, err: Err) { self.observer.error(err) }

  fn complete(self) { self.observer.complete() }

  fn is_closed(&self) -> bool { self.observer.is_closed() }
}

/// A tap whose side effect may fail; the failure becomes the stream error.
#[derive(Clone)]
pub struct TryTap<S, F> {
  pub source: S,
  pub func: F,
}

pub struct TryTapObserver<O, F> {
  observer: Option<O>,
  func: F,
}

impl<S, F> ObservableType for TryTap<S, F>
where
  S: ObservableType,
{
  type Item = S::Item;
  type Err = S::Err;
}

impl<S, F, O> CoreObservable<O> for TryTap<S, F>
where
  S: CoreObservable<TryTapObserver<O, F>>,
  F: FnMut(&S::Item) -> Result<(), S::Err>,
  O: Observer<S::Item, S::Err>,
{
  type Unsub = S::Unsub;

  fn actual_subscribe(self, observer: O) -> Self::Unsub {
    self
      .source
      .actual_subscribe(TryTapObserver { observer: Some(observer), func: self.func })
  }
}

impl<O, F, Item, Err> Observer<Item, Err> for TryTapObserver<O, F>
where
  O: Observer<Item, Err>,
  F: FnMut(&Item) -> Result<(), Err>,
{
  fn next(&mut self, value: Item) {
    if self.observer.is_none() {
      return;
    }
    match (self.func)(&value) {
      Ok(()) => self.observer.next(value),
      Err(e) => self.observer.take().error(e),
    }
  }

  fn error(self, err: Err) { self.observer.error(err) }

  fn complete(self) { self.observer.complete() }

  fn is_closed(&self) -> bool { self.observer.is_closed() }
}

#[cfg(test)]
mod tests {
  use std::{cell::RefCell, rc::Rc};

  use crate::prelude::*;

  #[rxkoans_macro::test]
  fn nothing_runs_until_subscribe() {
    let ctx = TestCtx::default();
    let sum = Rc::new(RefCell::new(0));
    let s = sum.clone();
    let observable = ctx.range(1, 5).tap(move |x| *s.borrow_mut() += x);

    assert_eq!(*sum.borrow(), 0);
    observable.subscribe(|_| {});
    assert_eq!(*sum.borrow(), 1 + 2 + 3 + 4 + 5);
  }

  #[rxkoans_macro::test]
  fn before_and_after_filter() {
    let ctx = TestCtx::default();
    let a = Rc::new(RefCell::new(String::new()));
    let b = Rc::new(RefCell::new(String::new()));
    let (a2, b2) = (a.clone(), b.clone());

    ctx
      .range(1, 6)
      .tap(move |n| a2.borrow_mut().push_str(&n.to_string()))
      .filter(|n| n % 2 == 0)
      .tap(move |n| b2.borrow_mut().push_str(&n.to_string()))
      .subscribe(|_| {});

    assert_eq!(*a.borrow(), "123456");
    assert_eq!(*b.borrow(), "246");
  }

  #[rxkoans_macro::test]
  fn try_tap_failure_is_the_stream_error() {
    let ctx = TestCtx::default();
    let seen = Rc::new(RefCell::new(Vec::new()));
    let err = Rc::new(RefCell::new(None));
    let (s, e) = (seen.clone(), err.clone());

    ctx
      .from_iter(1..10)
      .map_err(|never| -> &'static str { match never {} })
      .try_tap(|v| if *v > 2 { Err("too big") } else { Ok(()) })
      .on_error(move |reason| *e.borrow_mut() = Some(reason))
      .subscribe(move |v| s.borrow_mut().push(v));

    assert_eq!(*seen.borrow(), vec![1, 2]);
    assert_eq!(*err.borrow(), Some("too big"));
  }
}
