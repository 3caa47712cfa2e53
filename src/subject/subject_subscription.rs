use super::subscribers::Subscribers;
use crate::{rc::MutRc, subscription::Subscription};

/// Subscription handle of one observer of a subject.
///
/// Unsubscribing removes the observer from the registry. A handle given out
/// after the subject terminated starts closed.
pub struct SubjectSubscription<Item, Err> {
  pub(crate) subscribers: Option<MutRc<Subscribers<Item, Err>>>,
  pub(crate) id: usize,
}

impl<Item, Err> SubjectSubscription<Item, Err> {
  pub(crate) fn closed() -> Self { Self { subscribers: None, id: 0 } }
}

impl<Item, Err> Subscription for SubjectSubscription<Item, Err> {
  fn unsubscribe(self) {
    if let Some(subscribers) = self.subscribers {
      // Dropped once the registry borrow is released.
      let _observer = subscribers.rc_deref_mut().observers.remove(self.id);
    }
  }

  fn is_closed(&self) -> bool {
    self
      .subscribers
      .as_ref()
      .is_none_or(|s| !s.rc_deref().observers.contains(self.id))
  }
}
