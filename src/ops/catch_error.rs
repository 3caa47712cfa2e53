use crate::{
  observable::{CoreObservable, Observable, ObservableType},
  observer::Observer,
  rc::MutRc,
  subscription::{LocalSubscription, TupleSubscription},
};

/// Recovers from an error by switching to a replacement observable.
///
/// `handler` gets the error and returns the observable to continue with.
/// Values emitted before the error stay delivered. The replacement decides
/// how the stream ends from then on, including its error type.
#[derive(Clone)]
pub struct CatchError<S, F> {
  pub source: S,
  pub handler: F,
}

impl<S, F, R> ObservableType for CatchError<S, F>
where
  S: ObservableType,
  F: FnOnce(S::Err) -> R,
  R: Observable<Item = S::Item>,
{
  type Item = S::Item;
  type Err = R::Err;
}

pub struct CatchErrorObserver<O, F> {
  observer: MutRc<Option<O>>,
  handler: F,
  slot: LocalSubscription,
}

impl<S, F, R, O> CoreObservable<O> for CatchError<S, F>
where
  S: CoreObservable<CatchErrorObserver<O, F>>,
  F: FnOnce(S::Err) -> R,
  R: Observable<Item = S::Item>,
  R::Inner: CoreObservable<MutRc<Option<O>>>,
  O: Observer<S::Item, R::Err>,
{
  type Unsub = TupleSubscription<S::Unsub, LocalSubscription>;

  fn actual_subscribe(self, observer: O) -> Self::Unsub {
    let slot = LocalSubscription::default();
    let observer = CatchErrorObserver {
      observer: MutRc::own(Some(observer)),
      handler: self.handler,
      slot: slot.clone(),
    };
    TupleSubscription::new(self.source.actual_subscribe(observer), slot)
  }
}

impl<O, F, R, Item, Err> Observer<Item, Err> for CatchErrorObserver<O, F>
where
  F: FnOnce(Err) -> R,
  R: Observable<Item = Item>,
  R::Inner: CoreObservable<MutRc<Option<O>>>,
  O: Observer<Item, R::Err>,
{
  fn next(&mut self, value: Item) { self.observer.next(value) }

  fn error(self, err: Err) {
    if self.observer.rc_deref().is_closed() {
      return;
    }
    let (replacement, _) = (self.handler)(err).into_parts();
    self.slot.add(replacement.actual_subscribe(self.observer));
  }

  fn complete(self) { self.observer.complete() }

  fn is_closed(&self) -> bool { self.observer.rc_deref().is_closed() }
}
