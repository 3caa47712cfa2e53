use crate::{
  observer::Observer,
  subscription::{LocalSubscription, Subscription},
};

/// Wraps the observer of one `subscribe` call.
///
/// A subscriber stops delivering as soon as its subscription is closed,
/// whether by a terminal notification or by `unsubscribe()`. A terminal
/// notification is delivered first, then the teardown attached to the
/// subscription runs.
pub struct Subscriber<O> {
  observer: O,
  subscription: LocalSubscription,
}

impl<O> Subscriber<O> {
  pub fn new(observer: O, subscription: LocalSubscription) -> Self {
    Subscriber { observer, subscription }
  }

  #[inline]
  pub fn subscription(&self) -> &LocalSubscription { &self.subscription }
}

impl<Item, Err, O> Observer<Item, Err> for Subscriber<O>
where
  O: Observer<Item, Err>,
{
  fn next(&mut self, value: Item) {
    if !self.subscription.is_closed() {
      self.observer.next(value)
    }
  }

  fn error(self, err: Err) {
    if !self.subscription.is_closed() {
      self.observer.error(err);
      self.subscription.unsubscribe();
    }
  }

  fn complete(self) {
    if !self.subscription.is_closed() {
      self.observer.complete();
      self.subscription.unsubscribe();
    }
  }

  fn is_closed(&self) -> bool { self.subscription.is_closed() || self.observer.is_closed() }
}

#[cfg(test)]
mod tests {
  use std::{cell::RefCell, rc::Rc};

  use super::*;
  use crate::{observer::ObserverFn, subscription::ClosureSubscription};

  type Log = Rc<RefCell<Vec<String>>>;

  fn recording(log: &Log) -> impl Observer<i32, &'static str> {
    let (n, e, c) = (log.clone(), log.clone(), log.clone());
    ObserverFn::new(
      move |v: i32| n.borrow_mut().push(format!("next {v}")),
      move |err: &'static str| e.borrow_mut().push(format!("error {err}")),
      move || c.borrow_mut().push("complete".to_owned()),
    )
  }

  #[rxkoans_macro::test]
  fn silent_after_unsubscribe() {
    let log = Log::default();
    let subscription = LocalSubscription::default();
    let mut subscriber = Subscriber::new(recording(&log), subscription.clone());

    subscriber.next(1);
    subscription.unsubscribe();
    subscriber.next(2);
    subscriber.complete();

    assert_eq!(*log.borrow(), vec!["next 1"]);
  }

  #[rxkoans_macro::test]
  fn terminal_then_teardown() {
    let log = Log::default();
    let subscription = LocalSubscription::default();
    let l = log.clone();
    subscription.add(ClosureSubscription(move || l.borrow_mut().push("teardown".to_owned())));

    let subscriber = Subscriber::new(recording(&log), subscription.clone());
    subscriber.error("boom");

    assert_eq!(*log.borrow(), vec!["error boom", "teardown"]);
    assert!(subscription.is_closed());
  }
}
