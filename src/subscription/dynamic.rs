use smallvec::SmallVec;

use super::Subscription;

/// A list of items keyed by a generated id.
///
/// Subjects keep their observers here and time-based operators keep their
/// pending task handles here. Ids are never reused, so a stale id held by a
/// subscription can not remove a newer entry.
pub struct DynamicSubscriptions<U> {
  next_id: usize,
  items: SmallVec<[(usize, U); 2]>,
}

impl<U> Default for DynamicSubscriptions<U> {
  fn default() -> Self { Self { next_id: 0, items: SmallVec::new() } }
}

impl<U> DynamicSubscriptions<U> {
  #[inline]
  pub fn new() -> Self { Self::default() }

  /// Add an item and return its id.
  #[inline]
  pub fn add(&mut self, item: U) -> usize {
    let id = self.next_id;
    self.next_id += 1;
    self.items.push((id, item));
    id
  }

  pub fn remove(&mut self, id: usize) -> Option<U> {
    self
      .items
      .iter()
      .position(|(i, _)| *i == id)
      .map(|pos| self.items.remove(pos).1)
  }

  #[inline]
  pub fn contains(&self, id: usize) -> bool { self.items.iter().any(|(i, _)| *i == id) }

  #[inline]
  pub fn len(&self) -> usize { self.items.len() }

  #[inline]
  pub fn is_empty(&self) -> bool { self.items.is_empty() }

  #[inline]
  pub fn drain(&mut self) -> impl Iterator<Item = U> + '_ {
    self.items.drain(..).map(|(_, item)| item)
  }

  /// Iterate over `(id, item)` pairs in insertion order.
  #[inline]
  pub fn entries(&self) -> impl Iterator<Item = (usize, &U)> {
    self.items.iter().map(|(id, item)| (*id, item))
  }
}

impl<U: Subscription> DynamicSubscriptions<U> {
  /// Add a subscription, dropping entries that already closed.
  pub fn push_open(&mut self, item: U) -> usize {
    self.items.retain(|(_, item)| !item.is_closed());
    self.add(item)
  }

  /// Unsubscribe all items and clear the container.
  #[inline]
  pub fn unsubscribe_all(&mut self) {
    for item in self.drain() {
      item.unsubscribe();
    }
  }

  #[inline]
  pub fn all_closed(&self) -> bool { self.items.iter().all(|(_, item)| item.is_closed()) }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::subscription::LocalSubscription;

  #[rxkoans_macro::test]
  fn ids_are_not_reused() {
    let mut subs = DynamicSubscriptions::new();
    let a = subs.add('a');
    assert_eq!(subs.remove(a), Some('a'));
    let b = subs.add('b');

    assert_ne!(a, b);
    assert!(!subs.contains(a));
    assert_eq!(subs.entries().collect::<Vec<_>>(), vec![(b, &'b')]);
  }

  #[rxkoans_macro::test]
  fn push_open_prunes_closed() {
    let mut subs = DynamicSubscriptions::new();
    let closed = LocalSubscription::default();
    subs.add(closed.clone());
    closed.unsubscribe();

    subs.push_open(LocalSubscription::default());
    assert_eq!(subs.len(), 1);
    assert!(!subs.all_closed());

    subs.unsubscribe_all();
    assert!(subs.is_empty());
  }
}
