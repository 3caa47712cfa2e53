use crate::{
  observable::{CoreObservable, ObservableType},
  observer::Observer,
};

/// Transforms the error of a stream. Values and completion pass through.
#[derive(Clone)]
pub struct MapErr<S, F> {
  pub source: S,
  pub func: F,
}

pub struct MapErrObserver<O, F> {
  observer: O,
  func: F,
}

impl<O, F, Item, Err, OutErr> Observer<Item, Err> for MapErrObserver<O, F>
where
  O: Observer<Item, OutErr>,
  F: FnOnce(Err) -> OutErr,
{
  fn next(&mut self, value: Item) { self.observer.next(value); }

  fn error(self, err: Err) { self.observer.error((self.func)(err)); }

  fn complete(self) { self.observer.complete(); }

  fn is_closed(&self) -> bool { self.observer.is_closed() }
}

impl<S, F, OutErr> ObservableType for MapErr<S, F>
where
  S: ObservableType,
  F: FnOnce(S::Err) -> OutErr,
{
  type Item = S::Item;
  type Err = OutErr;
}

impl<S, F, O, OutErr> CoreObservable<O> for MapErr<S, F>
where
  S: CoreObservable<MapErrObserver<O, F>>,
  F: FnOnce(S::Err) -> OutErr,
  O: Observer<S::Item, OutErr>,
{
  type Unsub = S::Unsub;

  fn actual_subscribe(self, observer: O) -> Self::Unsub {
    let MapErr { source, func } = self;
    source.actual_subscribe(MapErrObserver { observer, func })
  }
}

#[cfg(test)]
mod tests {
  use std::{cell::RefCell, rc::Rc};

  use crate::prelude::*;

  #[rxkoans_macro::test]
  fn error_is_transformed() {
    let ctx = TestCtx::default();
    let errors = Rc::new(RefCell::new(vec![]));
    let e = errors.clone();

    ctx
      .throw_err::<i32, _>(404)
      .map_err(|code: i32| format!("status {code}"))
      .on_error(move |err| e.borrow_mut().push(err))
      .subscribe(|_| {});

    assert_eq!(*errors.borrow(), ["status 404"]);
  }

  #[rxkoans_macro::test]
  fn values_pass_through() {
    let ctx = TestCtx::default();
    let out = Rc::new(RefCell::new(vec![]));
    let o = out.clone();

    ctx
      .from_iter([1, 2])
      .map_err(|never| -> String { match never {} })
      .on_error(|_| {})
      .subscribe(move |v| o.borrow_mut().push(v));

    assert_eq!(*out.borrow(), [1, 2]);
  }
}
