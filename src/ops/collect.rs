use crate::{
  observable::{CoreObservable, ObservableType},
  observer::Observer,
};

/// Gathers every value into a collection and emits it once, on completion.
#[derive(Clone)]
pub struct Collect<S, C> {
  pub source: S,
  pub collection: C,
}

pub struct CollectObserver<O, C> {
  observer: O,
  collection: C,
}

impl<S: ObservableType, C> ObservableType for Collect<S, C> {
  type Item = C;
  type Err = S::Err;
}

impl<S, C, O> CoreObservable<O> for Collect<S, C>
where
  S: CoreObservable<CollectObserver<O, C>>,
  C: Extend<S::Item>,
  O: Observer<C, S::Err>,
{
  type Unsub = S::Unsub;

  fn actual_subscribe(self, observer: O) -> Self::Unsub {
    self
      .source
      .actual_subscribe(CollectObserver { observer, collection: self.collection })
  }
}

impl<O, C, Item, Err> Observer<Item, Err> for CollectObserver<O, C>
where
  O: Observer<C, Err>,
  C: Extend<Item>,
{
  fn next(&mut self, value: Item) { self.collection.extend(Some(value)); }

  fn error(self, err: Err) { self.observer.error(err) }

  fn complete(mut self) {
    self.observer.next(self.collection);
    self.observer.complete();
  }

  fn is_closed(&self) -> bool { self.observer.is_closed() }
}

#[cfg(test)]
mod tests {
  use std::{cell::RefCell, collections::BTreeSet, rc::Rc};

  use crate::prelude::*;

  #[rxkoans_macro::test]
  fn basic_querying() {
    let ctx = TestCtx::default();
    let out = Rc::new(RefCell::new(Vec::new()));
    let o = out.clone();

    ctx
      .range(1, 100)
      .filter(|x| x % 11 == 0)
      .map(|x| x.to_string())
      .collect::<Vec<_>>()
      .subscribe(move |v| o.borrow_mut().push(v.join(",")));

    assert_eq!(*out.borrow(), vec!["11,22,33,44,55,66,77,88,99"]);
  }

  #[rxkoans_macro::test]
  fn any_extendable_collection() {
    let ctx = TestCtx::default();
    let out = Rc::new(RefCell::new(BTreeSet::new()));
    let o = out.clone();

    ctx
      .from_iter([3, 1, 3, 2])
      .collect::<BTreeSet<_>>()
      .subscribe(move |set| *o.borrow_mut() = set);

    assert_eq!(out.borrow().iter().copied().collect::<Vec<_>>(), vec![1, 2, 3]);
  }
}
