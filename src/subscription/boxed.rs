use super::Subscription;

/// Helper trait for calling unsubscribe on boxed trait objects
///
/// `Subscription::unsubscribe(self)` requires `Sized`, so a boxed
/// subscription goes through `self: Box<Self>` instead.
pub trait BoxedSubscriptionInner {
  fn boxed_unsubscribe(self: Box<Self>);
  fn boxed_is_closed(&self) -> bool;
}

impl<T: Subscription> BoxedSubscriptionInner for T {
  #[inline]
  fn boxed_unsubscribe(self: Box<Self>) { (*self).unsubscribe() }

  #[inline]
  fn boxed_is_closed(&self) -> bool { self.is_closed() }
}

/// A type-erased subscription.
///
/// Subscriptions are control handles that get stored and called later, so
/// the boxed form is `'static`.
///
/// ```rust
/// use rxkoans::{prelude::*, subscription::BoxedSubscription};
///
/// let subs = vec![
///   BoxedSubscription::new(()),
///   BoxedSubscription::new(LocalSubscription::default()),
/// ];
/// for sub in subs {
///   sub.unsubscribe();
/// }
/// ```
pub struct BoxedSubscription(Box<dyn BoxedSubscriptionInner>);

impl BoxedSubscription {
  #[inline]
  pub fn new(subscription: impl Subscription + 'static) -> Self { Self(Box::new(subscription)) }
}

impl Subscription for BoxedSubscription {
  #[inline]
  fn unsubscribe(self) { self.0.boxed_unsubscribe() }

  #[inline]
  fn is_closed(&self) -> bool { self.0.boxed_is_closed() }
}

#[cfg(test)]
mod tests {
  use std::{cell::RefCell, rc::Rc};

  use super::*;

  struct MockSubscription {
    closed: Rc<RefCell<bool>>,
  }

  impl MockSubscription {
    fn new() -> (Self, Rc<RefCell<bool>>) {
      let closed = Rc::new(RefCell::new(false));
      (Self { closed: closed.clone() }, closed)
    }
  }

  impl Subscription for MockSubscription {
    fn unsubscribe(self) { *self.closed.borrow_mut() = true; }

    fn is_closed(&self) -> bool { *self.closed.borrow() }
  }

  #[rxkoans_macro::test]
  fn boxed_forwards_to_inner() {
    let (mock, closed) = MockSubscription::new();
    let boxed = BoxedSubscription::new(mock);

    assert!(!boxed.is_closed());
    boxed.unsubscribe();
    assert!(*closed.borrow());
  }

  #[rxkoans_macro::test]
  fn unit_is_always_closed() {
    let boxed = BoxedSubscription::new(());
    assert!(boxed.is_closed());
    boxed.unsubscribe();
  }
}
