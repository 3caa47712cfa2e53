//! Named events.
//!
//! [`EventEmitter`] is a small single-threaded event hub: listeners register
//! for an event name and `emit` hands each of them a clone of the payload.
//! `from_event` turns one event name into an observable that never
//! completes; unsubscribing removes its listener.

use std::{cell::RefCell, convert::Infallible, rc::Rc};

use crate::{
  observable::{CoreObservable, ObservableType},
  observer::Observer,
  rc::MutRc,
  subscription::{DynamicSubscriptions, Subscription},
};

type Callback<T> = Rc<RefCell<dyn FnMut(T)>>;

struct Listener<T> {
  event: String,
  callback: Callback<T>,
}

/// Identifies a listener registered with [`EventEmitter::on`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ListenerId(usize);

/// A hub of named events. Clones share the same listeners.
pub struct EventEmitter<T> {
  listeners: MutRc<DynamicSubscriptions<Listener<T>>>,
}

impl<T> Clone for EventEmitter<T> {
  fn clone(&self) -> Self { Self { listeners: self.listeners.clone() } }
}

impl<T> Default for EventEmitter<T> {
  fn default() -> Self { Self { listeners: MutRc::own(DynamicSubscriptions::new()) } }
}

impl<T> EventEmitter<T> {
  pub fn new() -> Self { Self::default() }

  pub fn on(&self, event: &str, callback: impl FnMut(T) + 'static) -> ListenerId {
    let callback: Callback<T> = Rc::new(RefCell::new(callback));
    let listener = Listener { event: event.to_owned(), callback };
    ListenerId(self.listeners.rc_deref_mut().add(listener))
  }

  /// Removes a listener. Returns `false` if it was already gone.
  pub fn off(&self, id: ListenerId) -> bool {
    let removed = self.listeners.rc_deref_mut().remove(id.0);
    removed.is_some()
  }

  pub fn listener_count(&self, event: &str) -> usize {
    self
      .listeners
      .rc_deref()
      .entries()
      .filter(|(_, l)| l.event == event)
      .count()
  }

  fn is_listening(&self, id: ListenerId) -> bool { self.listeners.rc_deref().contains(id.0) }

  /// Calls every listener of `event` registered at the time of the call.
  ///
  /// Returns `true` if the event had listeners. A listener removed by an
  /// earlier listener during the same emit is skipped.
  pub fn emit(&self, event: &str, payload: T) -> bool
  where
    T: Clone,
  {
    let targets: Vec<(usize, Callback<T>)> = self
      .listeners
      .rc_deref()
      .entries()
      .filter(|(_, l)| l.event == event)
      .map(|(id, l)| (id, l.callback.clone()))
      .collect();
    let Some(((last_id, last), rest)) = targets.split_last() else {
      return false;
    };
    for (id, callback) in rest {
      if self.is_listening(ListenerId(*id)) {
        (callback.borrow_mut())(payload.clone());
      }
    }
    if self.is_listening(ListenerId(*last_id)) {
      (last.borrow_mut())(payload);
    }
    true
  }
}

/// The observable behind `from_event`.
pub struct FromEvent<T> {
  pub emitter: EventEmitter<T>,
  pub event: String,
}

impl<T> Clone for FromEvent<T> {
  fn clone(&self) -> Self { Self { emitter: self.emitter.clone(), event: self.event.clone() } }
}

impl<T> ObservableType for FromEvent<T> {
  type Item = T;
  type Err = Infallible;
}

/// Removes the listener of one `from_event` subscription.
pub struct EventSubscription<T> {
  emitter: EventEmitter<T>,
  id: ListenerId,
}

impl<T> Subscription for EventSubscription<T> {
  fn unsubscribe(self) { self.emitter.off(self.id); }

  fn is_closed(&self) -> bool { !self.emitter.is_listening(self.id) }
}

impl<T, O> CoreObservable<O> for FromEvent<T>
where
  T: 'static,
  O: Observer<T, Infallible> + 'static,
{
  type Unsub = EventSubscription<T>;

  fn actual_subscribe(self, observer: O) -> Self::Unsub {
    let mut observer = MutRc::own(Some(observer));
    let id = self.emitter.on(&self.event, move |v| observer.next(v));
    EventSubscription { emitter: self.emitter, id }
  }
}
