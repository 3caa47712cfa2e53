//! Subscription handles.
//!
//! A subscription is the cancel side of a `subscribe` call. Unsubscribing is
//! idempotent: the teardown behind a handle runs at most once no matter how
//! many clones of the handle call it.

use std::{
  cell::RefCell,
  fmt::{Debug, Formatter},
  mem,
  rc::Rc,
};

use smallvec::SmallVec;

use crate::rc::MutRc;

mod boxed;
mod dynamic;
mod tuple;

pub use boxed::*;
pub use dynamic::*;
pub use tuple::*;

pub trait Subscription {
  /// Cancel the link between producer and consumer and release everything
  /// the subscription owns.
  fn unsubscribe(self);

  fn is_closed(&self) -> bool;
}

/// The empty subscription, used by sources that finish synchronously.
impl Subscription for () {
  #[inline]
  fn unsubscribe(self) {}

  #[inline]
  fn is_closed(&self) -> bool { true }
}

impl<U: Subscription> Subscription for Option<U> {
  #[inline]
  fn unsubscribe(self) {
    if let Some(inner) = self {
      inner.unsubscribe()
    }
  }

  #[inline]
  fn is_closed(&self) -> bool { self.as_ref().is_none_or(Subscription::is_closed) }
}

/// A shared slot holding the current subscription, for operators that swap
/// what they are subscribed to.
impl<U: Subscription> Subscription for MutRc<Option<U>> {
  fn unsubscribe(self) {
    let inner = self.rc_deref_mut().take();
    inner.unsubscribe();
  }

  fn is_closed(&self) -> bool { self.rc_deref().is_closed() }
}

/// Runs a closure on unsubscribe. This is how a `create` producer returns
/// its teardown.
pub struct ClosureSubscription<F>(pub F);

impl<F: FnOnce()> Subscription for ClosureSubscription<F> {
  #[inline]
  fn unsubscribe(self) { (self.0)() }

  #[inline]
  fn is_closed(&self) -> bool { false }
}

// ==================== LocalSubscription ====================

/// The handle returned by `subscribe`.
///
/// It owns the teardown of one subscribe call. Clones share the same state.
/// Once closed, by `unsubscribe()` or by a terminal notification reaching the
/// observer, any teardown added later runs immediately.
#[derive(Clone, Default)]
pub struct LocalSubscription(Rc<RefCell<Inner>>);

#[derive(Default)]
struct Inner {
  closed: bool,
  teardown: SmallVec<[BoxedSubscription; 1]>,
}

impl LocalSubscription {
  /// Attach `subscription` to this handle.
  pub fn add<U: Subscription + 'static>(&self, subscription: U) {
    if self.is_same(&subscription) {
      return;
    }
    let mut inner = self.0.borrow_mut();
    if inner.closed {
      drop(inner);
      subscription.unsubscribe();
    } else if !subscription.is_closed() {
      inner.teardown.retain(|t| !t.is_closed());
      inner.teardown.push(BoxedSubscription::new(subscription));
    }
  }

  /// Number of teardown entries still attached.
  pub fn teardown_size(&self) -> usize { self.0.borrow().teardown.len() }

  /// Activates "RAII" behavior for this subscription: `unsubscribe()` is
  /// called when the returned guard goes out of scope.
  ///
  /// **Attention:** if the guard is not bound to a variable it is dropped,
  /// and the subscription cancelled, right away.
  pub fn unsubscribe_when_dropped(self) -> SubscriptionGuard<Self> { SubscriptionGuard(self) }

  fn is_same<U: 'static>(&self, other: &U) -> bool {
    (other as &dyn std::any::Any)
      .downcast_ref::<Self>()
      .is_some_and(|other| Rc::ptr_eq(&self.0, &other.0))
  }
}

impl Subscription for LocalSubscription {
  fn unsubscribe(self) {
    // The borrow is released before teardown runs: teardown may reach back
    // into this handle through a clone.
    let teardown = {
      let mut inner = self.0.borrow_mut();
      if inner.closed {
        return;
      }
      inner.closed = true;
      mem::take(&mut inner.teardown)
    };
    for t in teardown {
      t.unsubscribe();
    }
  }

  #[inline]
  fn is_closed(&self) -> bool { self.0.borrow().closed }
}

impl Debug for LocalSubscription {
  fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
    let inner = self.0.borrow();
    f.debug_struct("LocalSubscription")
      .field("closed", &inner.closed)
      .field("teardown_count", &inner.teardown.len())
      .finish()
  }
}

// ==================== SubscriptionGuard ====================

/// An RAII implementation of a "scoped subscribed" of a subscription.
/// When this structure is dropped (falls out of scope), the subscription will
/// be unsubscribed.
///
/// If you want to drop it immediately, wrap it in its own scope
#[derive(Debug)]
#[must_use]
pub struct SubscriptionGuard<U: Subscription + Clone>(U);

impl<U: Subscription + Clone> SubscriptionGuard<U> {
  /// Wraps an existing subscription with a guard to enable RAII behavior for
  /// it.
  pub fn new(subscription: U) -> Self { SubscriptionGuard(subscription) }
}

impl<U: Subscription + Clone> Drop for SubscriptionGuard<U> {
  #[inline]
  fn drop(&mut self) { self.0.clone().unsubscribe() }
}

#[cfg(test)]
mod tests {
  use std::cell::Cell;

  use super::*;

  fn counter() -> (Rc<Cell<u32>>, ClosureSubscription<impl FnOnce()>) {
    let count = Rc::new(Cell::new(0));
    let c = count.clone();
    (count, ClosureSubscription(move || c.set(c.get() + 1)))
  }

  #[rxkoans_macro::test]
  fn add_keeps_open_teardown() {
    let local = LocalSubscription::default();
    local.add(LocalSubscription::default());
    local.add(LocalSubscription::default());
    local.add(());
    assert_eq!(local.teardown_size(), 2);
  }

  #[rxkoans_macro::test]
  fn closed_subscription_is_not_attached() {
    let local = LocalSubscription::default();
    let finished = LocalSubscription::default();
    finished.clone().unsubscribe();

    local.add(finished);
    assert_eq!(local.teardown_size(), 0);

    local.add(LocalSubscription::default());
    assert_eq!(local.teardown_size(), 1);
  }

  #[rxkoans_macro::test]
  fn unsubscribe_is_idempotent() {
    let (count, teardown) = counter();
    let local = LocalSubscription::default();
    local.add(teardown);

    local.clone().unsubscribe();
    local.clone().unsubscribe();
    local.unsubscribe();

    assert_eq!(count.get(), 1);
  }

  #[rxkoans_macro::test]
  fn add_after_close_runs_immediately() {
    let local = LocalSubscription::default();
    local.clone().unsubscribe();

    let (count, teardown) = counter();
    local.add(teardown);
    assert_eq!(count.get(), 1);
    assert_eq!(local.teardown_size(), 0);
  }

  #[rxkoans_macro::test]
  fn adding_itself_is_ignored() {
    let local = LocalSubscription::default();
    local.add(local.clone());
    assert_eq!(local.teardown_size(), 0);
  }

  #[rxkoans_macro::test]
  fn guard_unsubscribes_on_drop() {
    let (count, teardown) = counter();
    let local = LocalSubscription::default();
    local.add(teardown);
    {
      let _guard = local.clone().unsubscribe_when_dropped();
      assert_eq!(count.get(), 0);
    }
    assert_eq!(count.get(), 1);
    assert!(local.is_closed());
  }
}
