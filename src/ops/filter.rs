use crate::{
  observable::{CoreObservable, ObservableType},
  observer::Observer,
};

/// Forwards only the values that satisfy the predicate.
#[derive(Clone)]
pub struct Filter<S, F> {
  pub source: S,
  pub predicate: F,
}

pub struct FilterObserver<O, F> {
  observer: O,
  predicate: F,
}

impl<S, F> ObservableType for Filter<S, F>
where
  S: ObservableType,
{
  type Item = S::Item;
  type Err = S::Err;
}

impl<S, F, O> CoreObservable<O> for Filter<S, F>
where
  S: CoreObservable<FilterObserver<O, F>>,
  F: FnMut(&S::Item) -> bool,
  O: Observer<S::Item, S::Err>,
{
  type Unsub = S::Unsub;

  fn actual_subscribe(self, observer: O) -> Self::Unsub {
    self
      .source
      .actual_subscribe(FilterObserver { observer, predicate: self.predicate })
  }
}

impl<O, F, Item, Err> Observer<Item, Err> for FilterObserver<O, F>
where
  O: Observer<Item, Err>,
  F: FnMut(&Item) -> bool,
{
  fn next(&mut self, value: Item) {
    if (self.predicate)(&value) {
      self.observer.next(value)
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
  fn keeps_short_names() {
    let ctx = TestCtx::default();
    let received = Rc::new(RefCell::new(Vec::new()));
    let r = received.clone();

    ctx
      .from_iter(["Bart", "Marge", "Wes", "Linus", "Erik", "Matt"])
      .filter(|n| n.len() <= 4)
      .subscribe(move |n| r.borrow_mut().push(n));

    assert_eq!(received.borrow().join(","), "Bart,Wes,Erik,Matt");
  }

  #[rxkoans_macro::test]
  fn forwards_completion() {
    let ctx = TestCtx::default();
    let done = Rc::new(RefCell::new(false));
    let d = done.clone();

    ctx
      .from_iter(0..10)
      .filter(|_| false)
      .on_complete(move || *d.borrow_mut() = true)
      .subscribe(|_| unreachable!());

    assert!(*done.borrow());
  }
}
