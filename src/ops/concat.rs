use log::debug;

use crate::{
  observable::{CoreObservable, ObservableType},
  observer::Observer,
  rc::MutRc,
  subscription::{LocalSubscription, TupleSubscription},
};

/// Emits every value of `first`, then, once `first` completed, subscribes to
/// `second` and emits its values.
///
/// `second` is not subscribed before that moment, so nothing it produces
/// earlier is seen. An error from `first` ends the stream without ever
/// touching `second`.
#[derive(Clone)]
pub struct Concat<A, B> {
  pub first: A,
  pub second: B,
}

impl<A: ObservableType, B> ObservableType for Concat<A, B> {
  type Item = A::Item;
  type Err = A::Err;
}

pub struct ConcatObserver<O, B> {
  observer: MutRc<Option<O>>,
  second: B,
  slot: LocalSubscription,
}

impl<A, B, O> CoreObservable<O> for Concat<A, B>
where
  A: CoreObservable<ConcatObserver<O, B>>,
  B: CoreObservable<MutRc<Option<O>>> + ObservableType<Item = A::Item, Err = A::Err>,
  O: Observer<A::Item, A::Err>,
{
  type Unsub = TupleSubscription<A::Unsub, LocalSubscription>;

  fn actual_subscribe(self, observer: O) -> Self::Unsub {
    let slot = LocalSubscription::default();
    let observer = ConcatObserver {
      observer: MutRc::own(Some(observer)),
      second: self.second,
      slot: slot.clone(),
    };
    let first = self.first.actual_subscribe(observer);
    TupleSubscription::new(first, slot)
  }
}

impl<Item, Err, O, B> Observer<Item, Err> for ConcatObserver<O, B>
where
  O: Observer<Item, Err>,
  B: CoreObservable<MutRc<Option<O>>>,
{
  fn next(&mut self, value: Item) { self.observer.next(value) }

  fn error(self, err: Err) { self.observer.error(err) }

  fn complete(self) {
    if self.observer.rc_deref().is_closed() {
      return;
    }
    debug!("concat: first source completed, subscribing to the next");
    let unsub = self.second.actual_subscribe(self.observer);
    self.slot.add(unsub);
  }

  fn is_closed(&self) -> bool { self.observer.rc_deref().is_closed() }
}

#[cfg(test)]
mod tests {
  use std::{cell::RefCell, convert::Infallible, rc::Rc};

  use crate::prelude::*;

  #[rxkoans_macro::test]
  fn sequential_sources() {
    let ctx = TestCtx::default();
    let out = Rc::new(RefCell::new(vec![]));
    let completed = Rc::new(RefCell::new(false));
    let (o, c) = (out.clone(), completed.clone());

    ctx
      .from_iter([1, 2])
      .concat(ctx.from_iter([3, 4]))
      .concat(ctx.of(5))
      .on_complete(move || *c.borrow_mut() = true)
      .subscribe(move |v| o.borrow_mut().push(v));

    assert_eq!(*out.borrow(), [1, 2, 3, 4, 5]);
    assert!(*completed.borrow());
  }

  #[rxkoans_macro::test]
  fn later_source_is_ignored_until_earlier_completes() {
    let ctx = TestCtx::default();
    let mut s1 = ctx.subject::<i32, Infallible>();
    let mut s2 = ctx.subject::<i32, Infallible>();
    let out = Rc::new(RefCell::new(vec![]));
    let o = out.clone();

    s1.clone().concat(s2.clone()).subscribe(move |v| o.borrow_mut().push(v));

    s2.next(100);
    s1.next(1);
    assert_eq!(s2.subscriber_count(), 0);

    s1.clone().complete();
    s2.next(2);
    assert_eq!(*out.borrow(), [1, 2]);
  }

  #[rxkoans_macro::test]
  fn never_completing_first_hides_the_rest() {
    let ctx = TestCtx::default();
    let mut s2 = ctx.subject::<i32, Infallible>();
    let out = Rc::new(RefCell::new(vec![]));
    let o = out.clone();

    ctx
      .never::<i32, Infallible>()
      .concat(s2.clone())
      .subscribe(move |v| o.borrow_mut().push(v));

    s2.next(1);
    s2.clone().complete();
    assert!(out.borrow().is_empty());
  }

  #[rxkoans_macro::test]
  fn error_does_not_advance() {
    let ctx = TestCtx::default();
    let log = Rc::new(RefCell::new(vec![]));
    let (n, e) = (log.clone(), log.clone());

    ctx
      .throw_err::<i32, _>("boom")
      .concat(ctx.of(1).map_err(|never| -> &'static str { match never {} }))
      .subscribe_with(ObserverFn::new(
        move |v: i32| n.borrow_mut().push(v.to_string()),
        move |err: &'static str| e.borrow_mut().push(err.to_owned()),
        || {},
      ));

    assert_eq!(*log.borrow(), ["boom"]);
  }

  #[rxkoans_macro::test]
  fn unsubscribe_reaches_the_active_source() {
    let ctx = TestCtx::default();
    let s2 = ctx.subject::<i32, Infallible>();

    let subscription = ctx.empty::<i32, Infallible>().concat(s2.clone()).subscribe(|_| {});
    assert_eq!(s2.subscriber_count(), 1);

    subscription.unsubscribe();
    assert_eq!(s2.subscriber_count(), 0);
  }

  #[rxkoans_macro::test]
  fn delayed_letters() {
    let ctx = TestCtx::default();
    let out = Rc::new(RefCell::new(String::new()));
    let o = out.clone();

    ctx
      .of('R')
      .delay(Duration::from_millis(50))
      .concat(ctx.of('x').delay(Duration::from_millis(10)))
      .concat(ctx.of('J').delay(Duration::from_millis(30)))
      .concat(ctx.of('S'))
      .subscribe(move |c| o.borrow_mut().push(c));

    ctx.scheduler().flush();
    assert_eq!(*out.borrow(), "RxJS");
  }
}
