//! `take_while`: forward values while a predicate holds, then complete.

use crate::{
  observable::{CoreObservable, ObservableType},
  observer::Observer,
};

/// Emits values while `predicate` returns true.
///
/// On the first value that fails the predicate the stream completes. With
/// `inclusive` set, that failing value is forwarded before completing. The
/// observer reports itself closed afterwards, which detaches it from the
/// source.
///
/// ```
/// use rxkoans::prelude::*;
///
/// let ctx = TestCtx::default();
/// let result = std::rc::Rc::new(std::cell::RefCell::new(Vec::new()));
/// let r = result.clone();
/// ctx
///   .from_iter([1, 2, 3, 4, 5])
///   .take_while(|v| *v < 4)
///   .subscribe(move |v| r.borrow_mut().push(v));
/// assert_eq!(*result.borrow(), vec![1, 2, 3]);
/// ```
#[derive(Clone)]
pub struct TakeWhile<S, P> {
  pub source: S,
  pub predicate: P,
  pub inclusive: bool,
}

impl<S: ObservableType, P> ObservableType for TakeWhile<S, P> {
  type Item = S::Item;
  type Err = S::Err;
}

pub struct TakeWhileObserver<O, P> {
  observer: Option<O>,
  predicate: P,
  inclusive: bool,
}

impl<O, P, Item, Err> Observer<Item, Err> for TakeWhileObserver<O, P>
where
  O: Observer<Item, Err>,
  P: FnMut(&Item) -> bool,
{
  fn next(&mut self, v: Item) {
    let Some(observer) = self.observer.as_mut() else {
      return;
    };
    if (self.predicate)(&v) {
      observer.next(v);
      return;
    }
    if self.inclusive {
      observer.next(v);
    }
    self.observer.take().complete();
  }

  fn error(self, e: Err) { self.observer.error(e) }

  fn complete(self) { self.observer.complete() }

  fn is_closed(&self) -> bool { self.observer.is_closed() }
}

impl<S, P, O> CoreObservable<O> for TakeWhile<S, P>
where
  S: CoreObservable<TakeWhileObserver<O, P>>,
  P: FnMut(&S::Item) -> bool,
  O: Observer<S::Item, S::Err>,
{
  type Unsub = S::Unsub;

  fn actual_subscribe(self, observer: O) -> Self::Unsub {
    let TakeWhile { source, predicate, inclusive } = self;
    source.actual_subscribe(TakeWhileObserver { observer: Some(observer), predicate, inclusive })
  }
}

#[cfg(test)]
mod tests {
  use std::{cell::RefCell, convert::Infallible, rc::Rc};

  use crate::prelude::*;

  #[rxkoans_macro::test]
  fn stops_at_first_failure() {
    let ctx = TestCtx::default();
    let out = Rc::new(RefCell::new(Vec::new()));
    let completed = Rc::new(RefCell::new(false));
    let (o, c) = (out.clone(), completed.clone());

    ctx
      .from_iter([1, 2, 5, 1, 2])
      .take_while(|v| *v < 3)
      .on_complete(move || *c.borrow_mut() = true)
      .subscribe(move |v| o.borrow_mut().push(v));

    assert_eq!(*out.borrow(), vec![1, 2]);
    assert!(*completed.borrow());
  }

  #[rxkoans_macro::test]
  fn inclusive_forwards_the_failing_value() {
    let ctx = TestCtx::default();
    let out = Rc::new(RefCell::new(Vec::new()));
    let o = out.clone();

    ctx
      .from_iter([1, 2, 5, 1])
      .take_while_inclusive(|v| *v < 3)
      .subscribe(move |v| o.borrow_mut().push(v));

    assert_eq!(*out.borrow(), vec![1, 2, 5]);
  }

  #[rxkoans_macro::test]
  fn detaches_from_subject() {
    let ctx = TestCtx::default();
    let mut subject = ctx.subject::<i32, Infallible>();
    let out = Rc::new(RefCell::new(Vec::new()));
    let o = out.clone();

    let subscription = subject
      .clone()
      .take_while(|v| *v != 0)
      .subscribe(move |v| o.borrow_mut().push(v));

    subject.next(1);
    subject.next(0);
    subject.next(2);

    assert_eq!(*out.borrow(), vec![1]);
    assert!(subscription.is_closed());
    assert_eq!(subject.subscriber_count(), 0);
  }
}
