//! Subject: an observable that is also an observer.
//!
//! A subject keeps a registry of observers and multicasts every
//! notification it receives to all of them. It is hot: an observer only sees
//! what is emitted after it subscribed. Once the subject has terminated,
//! late subscribers get the terminal notification right away.
//!
//! ```rust
//! use std::{cell::RefCell, convert::Infallible, rc::Rc};
//!
//! use rxkoans::prelude::*;
//!
//! let ctx = TestCtx::default();
//! let mut subject = ctx.subject::<i32, Infallible>();
//! let first = Rc::new(RefCell::new(vec![]));
//! let second = Rc::new(RefCell::new(vec![]));
//!
//! let f = first.clone();
//! subject.clone().subscribe(move |v| f.borrow_mut().push(v));
//! subject.next(1);
//!
//! let s = second.clone();
//! subject.clone().subscribe(move |v| s.borrow_mut().push(v));
//! subject.next(2);
//!
//! assert_eq!(*first.borrow(), vec![1, 2]);
//! assert_eq!(*second.borrow(), vec![2]);
//! ```
//!
//! # Re-entrancy
//!
//! Delivery runs on a snapshot of the registry, so observers may subscribe
//! or unsubscribe from inside a callback: an observer removed mid-broadcast
//! is skipped, one added mid-broadcast waits for the next value. Emitting
//! into the subject from a callback of the same observer is not supported
//! and panics; put an asynchronous boundary such as `observe_on` or `delay`
//! in between.

mod subject_subscription;
mod subscribers;

use log::warn;
pub use subject_subscription::SubjectSubscription;
use subscribers::{replay, Subscribers, Terminal};

use crate::{
  context::LocalCtx,
  observable::{CoreObservable, ObservableType},
  observer::{BoxedObserver, Observer},
  rc::MutRc,
};

pub struct Subject<Item, Err> {
  subscribers: MutRc<Subscribers<Item, Err>>,
}

impl<Item, Err> Subject<Item, Err> {
  pub fn new() -> Self { Subject { subscribers: MutRc::default() } }

  /// Number of observers currently registered.
  pub fn subscriber_count(&self) -> usize { self.subscribers.rc_deref().observers.len() }
}

impl<Item, Err> Default for Subject<Item, Err> {
  fn default() -> Self { Self::new() }
}

impl<Item, Err> Clone for Subject<Item, Err> {
  fn clone(&self) -> Self { Subject { subscribers: self.subscribers.clone() } }
}

impl<Item, Err> ObservableType for Subject<Item, Err> {
  type Item = Item;
  type Err = Err;
}

impl<Item, Err, O> CoreObservable<O> for Subject<Item, Err>
where
  Item: 'static,
  Err: Clone + 'static,
  O: Observer<Item, Err> + 'static,
{
  type Unsub = SubjectSubscription<Item, Err>;

  fn actual_subscribe(self, observer: O) -> Self::Unsub {
    let terminal = self.subscribers.rc_deref().terminal.clone();
    if let Some(terminal) = terminal {
      replay(terminal, observer);
      return SubjectSubscription::closed();
    }
    let boxed: BoxedObserver<Item, Err> = Box::new(observer);
    let id = self
      .subscribers
      .rc_deref_mut()
      .observers
      .add(MutRc::own(Some(boxed)));
    SubjectSubscription { subscribers: Some(self.subscribers), id }
  }
}

impl<Item: Clone, Err: Clone> Observer<Item, Err> for Subject<Item, Err> {
  fn next(&mut self, value: Item) {
    let targets = {
      let subscribers = self.subscribers.rc_deref();
      if subscribers.terminal.is_some() {
        warn!("subject: value emitted after the subject terminated, ignored");
        return;
      }
      subscribers.snapshot()
    };

    let last = targets.len().saturating_sub(1);
    let mut value = Some(value);
    for (index, (id, observer)) in targets.into_iter().enumerate() {
      if !self.subscribers.rc_deref().observers.contains(id) {
        continue;
      }
      let v = if index == last { value.take() } else { value.clone() };
      if let Some(v) = v {
        let Some(mut slot) = observer.try_rc_deref_mut() else {
          panic!(
            "re-entrant subject emission: an observer emitted into the subject it is \
             subscribed to. Put an async boundary such as `delay` in between."
          );
        };
        slot.next(v);
      }
      if observer.is_closed() {
        let _closed = self.subscribers.rc_deref_mut().observers.remove(id);
      }
    }
  }

  fn error(self, err: Err) {
    let observers = self
      .subscribers
      .rc_deref_mut()
      .terminate(Terminal::Errored(err.clone()));
    for observer in observers.into_iter().flatten() {
      observer.error(err.clone());
    }
  }

  fn complete(self) {
    let observers = self.subscribers.rc_deref_mut().terminate(Terminal::Completed);
    for observer in observers.into_iter().flatten() {
      observer.complete();
    }
  }

  /// A subject is closed once it has terminated.
  fn is_closed(&self) -> bool { self.subscribers.rc_deref().terminal.is_some() }
}

impl<Item, Err, S> LocalCtx<Subject<Item, Err>, S> {
  /// Number of observers currently registered.
  pub fn subscriber_count(&self) -> usize { self.inner().subscriber_count() }
}

#[cfg(test)]
mod tests {
  use std::{cell::RefCell, convert::Infallible, rc::Rc};

  use crate::prelude::*;

  type Log = Rc<RefCell<Vec<String>>>;

  fn logging(log: &Log, name: &'static str) -> impl Observer<i32, String> {
    let (n, e, c) = (log.clone(), log.clone(), log.clone());
    ObserverFn::new(
      move |v: i32| n.borrow_mut().push(format!("{name} {v}")),
      move |err: String| e.borrow_mut().push(format!("{name} error {err}")),
      move || c.borrow_mut().push(format!("{name} complete")),
    )
  }

  #[rxkoans_macro::test]
  fn multicasts_to_every_observer() {
    let ctx = TestCtx::default();
    let log = Log::default();
    let mut subject = ctx.subject::<i32, String>();

    subject.clone().subscribe_with(logging(&log, "a"));
    subject.clone().subscribe_with(logging(&log, "b"));
    subject.next(1);
    subject.clone().complete();

    assert_eq!(*log.borrow(), ["a 1", "b 1", "a complete", "b complete"]);
    assert_eq!(subject.subscriber_count(), 0);
  }

  #[rxkoans_macro::test]
  fn unsubscribed_observer_gets_nothing() {
    let ctx = TestCtx::default();
    let log = Log::default();
    let mut subject = ctx.subject::<i32, String>();

    let a = subject.clone().subscribe_with(logging(&log, "a"));
    subject.clone().subscribe_with(logging(&log, "b"));
    subject.next(1);
    a.unsubscribe();
    subject.next(2);

    assert_eq!(*log.borrow(), ["a 1", "b 1", "b 2"]);
    assert_eq!(subject.subscriber_count(), 1);
  }

  #[rxkoans_macro::test]
  fn first_terminal_wins() {
    let ctx = TestCtx::default();
    let log = Log::default();
    let mut subject = ctx.subject::<i32, String>();

    subject.clone().subscribe_with(logging(&log, "a"));
    subject.clone().error("boom".to_owned());
    subject.clone().complete();
    subject.next(3);

    assert_eq!(*log.borrow(), ["a error boom"]);
    assert!(subject.is_closed());
  }

  #[rxkoans_macro::test]
  fn late_subscriber_sees_the_terminal() {
    let ctx = TestCtx::default();
    let log = Log::default();
    let subject = ctx.subject::<i32, String>();
    subject.clone().error("boom".to_owned());

    let subscription = subject.clone().subscribe_with(logging(&log, "late"));

    assert_eq!(*log.borrow(), ["late error boom"]);
    assert!(subscription.is_closed());
  }

  #[rxkoans_macro::test]
  fn unsubscribing_another_observer_mid_broadcast() {
    let ctx = TestCtx::default();
    let mut subject = ctx.subject::<i32, Infallible>();
    let seen = Rc::new(RefCell::new(vec![]));
    let victim: Rc<RefCell<Option<LocalSubscription>>> = Rc::default();

    let v = victim.clone();
    subject.clone().subscribe(move |_| {
      if let Some(s) = v.borrow_mut().take() {
        s.unsubscribe();
      }
    });
    let s = seen.clone();
    *victim.borrow_mut() = Some(subject.clone().subscribe(move |x| s.borrow_mut().push(x)));

    subject.next(1);
    subject.next(2);
    assert!(seen.borrow().is_empty());
    assert_eq!(subject.subscriber_count(), 1);
  }

  #[rxkoans_macro::test]
  fn subscribing_mid_broadcast_waits_for_next_value() {
    let ctx = TestCtx::default();
    let mut subject = ctx.subject::<i32, Infallible>();
    let seen = Rc::new(RefCell::new(vec![]));

    let (s, inner_subject) = (seen.clone(), subject.clone());
    let mut once = Some(());
    subject.clone().subscribe(move |_| {
      if once.take().is_some() {
        let s = s.clone();
        inner_subject.clone().subscribe(move |x| s.borrow_mut().push(x));
      }
    });

    subject.next(1);
    subject.next(2);
    assert_eq!(*seen.borrow(), [2]);
  }

  #[rxkoans_macro::test]
  #[should_panic(expected = "re-entrant subject emission")]
  fn emitting_into_the_subject_from_its_observer_panics() {
    let ctx = TestCtx::default();
    let mut subject = ctx.subject::<i32, Infallible>();

    let mut inner = subject.clone();
    subject.clone().subscribe(move |v| {
      if v == 1 {
        inner.next(2);
      }
    });
    subject.next(1);
  }

  #[rxkoans_macro::test]
  fn subject_as_observer_of_a_source() {
    let ctx = TestCtx::default();
    let subject = ctx.subject::<i32, Infallible>();
    let seen = Rc::new(RefCell::new(vec![]));
    let s = seen.clone();
    subject.clone().map(|v| v * 10).subscribe(move |v| s.borrow_mut().push(v));

    ctx.from_iter([1, 2, 3]).subscribe_with(subject.clone());

    assert_eq!(*seen.borrow(), [10, 20, 30]);
    assert!(subject.is_closed());
  }
}
