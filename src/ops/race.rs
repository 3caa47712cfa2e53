use log::debug;

use crate::{
  observable::{CoreObservable, ObservableType},
  observer::Observer,
  rc::MutRc,
  subscription::{BoxedSubscription, Subscription},
};

/// Mirrors whichever source signals first.
///
/// The first notification of any kind, value or terminal, picks the
/// winner. The other source is unsubscribed right then and its signals are
/// ignored from that point on.
#[derive(Clone)]
pub struct Race<A, B> {
  pub source1: A,
  pub source2: B,
}

impl<A: ObservableType, B> ObservableType for Race<A, B> {
  type Item = A::Item;
  type Err = A::Err;
}

#[derive(Default)]
struct RaceControl {
  winner: Option<usize>,
  subscriptions: [Option<BoxedSubscription>; 2],
}

type Control = MutRc<RaceControl>;

pub struct RaceObserver<O> {
  index: usize,
  observer: MutRc<Option<O>>,
  control: Control,
}

impl<O> RaceObserver<O> {
  /// Whether this source may deliver, picking it as the winner if nobody
  /// won yet.
  fn claim(&self) -> bool {
    let loser = {
      let mut control = self.control.rc_deref_mut();
      match control.winner {
        Some(winner) => return winner == self.index,
        None => {
          control.winner = Some(self.index);
          control.subscriptions[1 - self.index].take()
        }
      }
    };
    debug!("race: source {} won", self.index);
    loser.unsubscribe();
    true
  }
}

impl<Item, Err, O> Observer<Item, Err> for RaceObserver<O>
where
  O: Observer<Item, Err>,
{
  fn next(&mut self, value: Item) {
    if self.claim() {
      self.observer.next(value);
    }
  }

  fn error(self, err: Err) {
    if self.claim() {
      self.observer.error(err);
    }
  }

  fn complete(self) {
    if self.claim() {
      self.observer.complete();
    }
  }

  fn is_closed(&self) -> bool {
    let lost = self.control.rc_deref().winner.is_some_and(|w| w != self.index);
    lost || self.observer.rc_deref().is_closed()
  }
}

/// Cancels whichever of the two sources is still attached.
pub struct RaceSubscription(Control);

impl Subscription for RaceSubscription {
  fn unsubscribe(self) {
    let subscriptions = std::mem::take(&mut self.0.rc_deref_mut().subscriptions);
    for subscription in subscriptions {
      subscription.unsubscribe();
    }
  }

  fn is_closed(&self) -> bool { self.0.rc_deref().subscriptions.iter().all(|s| s.is_closed()) }
}

impl<A, B, O> CoreObservable<O> for Race<A, B>
where
  A: CoreObservable<RaceObserver<O>>,
  B: CoreObservable<RaceObserver<O>> + ObservableType<Item = A::Item, Err = A::Err>,
  O: Observer<A::Item, A::Err>,
{
  type Unsub = RaceSubscription;

  fn actual_subscribe(self, observer: O) -> Self::Unsub {
    let observer = MutRc::own(Some(observer));
    let control = Control::default();
    let racer = |index| RaceObserver {
      index,
      observer: observer.clone(),
      control: control.clone(),
    };

    let unsub1 = self.source1.actual_subscribe(racer(0));
    control.rc_deref_mut().subscriptions[0] = Some(BoxedSubscription::new(unsub1));

    // A first source that won synchronously keeps the second from ever
    // being subscribed.
    if control.rc_deref().winner != Some(0) {
      let unsub2 = self.source2.actual_subscribe(racer(1));
      control.rc_deref_mut().subscriptions[1] = Some(BoxedSubscription::new(unsub2));
    }
    RaceSubscription(control)
  }
}
