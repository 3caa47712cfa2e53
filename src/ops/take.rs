use crate::{
  observable::{CoreObservable, ObservableType},
  observer::Observer,
};

/// Emits the first `count` values, then completes.
#[derive(Clone)]
pub struct Take<S> {
  pub source: S,
  pub count: usize,
}

pub struct TakeObserver<O> {
  observer: Option<O>,
  remaining: usize,
}

impl<S: ObservableType> ObservableType for Take<S> {
  type Item = S::Item;
  type Err = S::Err;
}

impl<S, O> CoreObservable<O> for Take<S>
where
  S: CoreObservable<TakeObserver<O>>,
  O: Observer<S::Item, S::Err>,
{
  type Unsub = S::Unsub;

  fn actual_subscribe(self, observer: O) -> Self::Unsub {
    // `take(0)` completes before the source gets a chance to emit.
    let observer = if self.count == 0 {
      observer.complete();
      None
    } else {
      Some(observer)
    };
    self
      .source
      .actual_subscribe(TakeObserver { observer, remaining: self.count })
  }
}

impl<O, Item, Err> Observer<Item, Err> for TakeObserver<O>
where
  O: Observer<Item, Err>,
{
  fn next(&mut self, value: Item) {
    let Some(observer) = self.observer.as_mut() else {
      return;
    };
    observer.next(value);
    self.remaining -= 1;
    if self.remaining == 0 {
      self.observer.take().complete();
    }
  }

  fn error(self, err: Err) { self.observer.error(err) }

  fn complete(self) { self.observer.complete() }

  fn is_closed(&self) -> bool { self.observer.is_closed() }
}
