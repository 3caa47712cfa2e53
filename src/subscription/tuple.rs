use super::Subscription;

/// Two subscriptions cancelled together, for operators with two inputs.
pub struct TupleSubscription<U1, U2> {
  unsub1: U1,
  unsub2: U2,
}

impl<U1, U2> TupleSubscription<U1, U2> {
  pub fn new(unsub1: U1, unsub2: U2) -> Self { TupleSubscription { unsub1, unsub2 } }
}

impl<U1, U2> Subscription for TupleSubscription<U1, U2>
where
  U1: Subscription,
  U2: Subscription,
{
  fn unsubscribe(self) {
    self.unsub1.unsubscribe();
    self.unsub2.unsubscribe();
  }

  fn is_closed(&self) -> bool { self.unsub1.is_closed() && self.unsub2.is_closed() }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::subscription::LocalSubscription;

  #[rxkoans_macro::test]
  fn closes_both() {
    let a = LocalSubscription::default();
    let b = LocalSubscription::default();
    let tuple = TupleSubscription::new(a.clone(), b.clone());

    assert!(!tuple.is_closed());
    tuple.unsubscribe();
    assert!(a.is_closed() && b.is_closed());
  }
}
