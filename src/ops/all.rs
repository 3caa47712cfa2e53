use crate::{
  observable::{CoreObservable, ObservableType},
  observer::Observer,
};

/// Emits whether every value satisfies the predicate.
///
/// The answer is `false` as soon as one value fails, and the stream
/// completes right then. Otherwise `true` is emitted on completion.
#[derive(Clone)]
pub struct All<S, F> {
  pub source: S,
  pub predicate: F,
}

pub struct AllObserver<O, F> {
  observer: Option<O>,
  predicate: F,
}

impl<S: ObservableType, F> ObservableType for All<S, F> {
  type Item = bool;
  type Err = S::Err;
}

impl<S, F, O> CoreObservable<O> for All<S, F>
where
  S: CoreObservable<AllObserver<O, F>>,
  F: FnMut(&S::Item) -> bool,
  O: Observer<bool, S::Err>,
{
  type Unsub = S::Unsub;

  fn actual_subscribe(self, observer: O) -> Self::Unsub {
    self
      .source
      .actual_subscribe(AllObserver { observer: Some(observer), predicate: self.predicate })
  }
}

impl<O, F, Item, Err> Observer<Item, Err> for AllObserver<O, F>
where
  O: Observer<bool, Err>,
  F: FnMut(&Item) -> bool,
{
  fn next(&mut self, value: Item) {
    if self.observer.is_some() && !(self.predicate)(&value) {
      if let Some(mut observer) = self.observer.take() {
        observer.next(false);
        observer.complete();
      }
    }
  }

  fn error(self, err: Err) { self.observer.error(err) }

  fn complete(self) {
    if let Some(mut observer) = self.observer {
      observer.next(true);
      observer.complete();
    }
  }

  fn is_closed(&self) -> bool { self.observer.is_closed() }
}
