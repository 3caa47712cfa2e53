use crate::{
  observer::{BoxedObserver, Observer},
  rc::MutRc,
  subscription::DynamicSubscriptions,
};

/// One registered observer. The slot empties itself on a terminal
/// notification.
pub(crate) type ObserverCell<Item, Err> = MutRc<Option<BoxedObserver<Item, Err>>>;

/// How a subject ended, replayed to observers that subscribe afterwards.
#[derive(Clone)]
pub(crate) enum Terminal<Err> {
  Completed,
  Errored(Err),
}

/// Registry behind a subject: the observers keyed by subscription id, and
/// the terminal notification once there is one.
pub(crate) struct Subscribers<Item, Err> {
  pub(crate) observers: DynamicSubscriptions<ObserverCell<Item, Err>>,
  pub(crate) terminal: Option<Terminal<Err>>,
}

impl<Item, Err> Default for Subscribers<Item, Err> {
  fn default() -> Self { Self { observers: DynamicSubscriptions::default(), terminal: None } }
}

impl<Item, Err> Subscribers<Item, Err> {
  /// The current observers, so delivery can run without holding a borrow
  /// of the registry.
  pub(crate) fn snapshot(&self) -> Vec<(usize, ObserverCell<Item, Err>)> {
    self
      .observers
      .entries()
      .map(|(id, observer)| (id, observer.clone()))
      .collect()
  }

  /// Record `terminal` and hand out every observer. `None` if the subject
  /// already terminated.
  pub(crate) fn terminate(
    &mut self, terminal: Terminal<Err>,
  ) -> Option<Vec<ObserverCell<Item, Err>>> {
    if self.terminal.is_some() {
      return None;
    }
    self.terminal = Some(terminal);
    Some(self.observers.drain().collect())
  }
}

/// Replay a terminal notification to a late observer.
pub(crate) fn replay<Item, Err, O>(terminal: Terminal<Err>, observer: O)
where
  O: Observer<Item, Err>,
{
  match terminal {
    Terminal::Completed => observer.complete(),
    Terminal::Errored(err) => observer.error(err),
  }
}
