use crate::{
  observable::{CoreObservable, ObservableType},
  observer::Observer,
};

/// Applies a function to every value.
#[derive(Clone)]
pub struct Map<S, F> {
  pub source: S,
  pub func: F,
}

pub struct MapObserver<O, F> {
  observer: O,
  func: F,
}

impl<S, F, B> ObservableType for Map<S, F>
where
  S: ObservableType,
  F: FnMut(S::Item) -> B,
{
  type Item = B;
  type Err = S::Err;
}

impl<S, F, B, O> CoreObservable<O> for Map<S, F>
where
  S: CoreObservable<MapObserver<O, F>>,
  F: FnMut(S::Item) -> B,
  O: Observer<B, S::Err>,
{
  type Unsub = S::Unsub;

  fn actual_subscribe(self, observer: O) -> Self::Unsub {
    self
      .source
      .actual_subscribe(MapObserver { observer, func: self.func })
  }
}

impl<O, F, Item, B, Err> Observer<Item, Err> for MapObserver<O, F>
where
  O: Observer<B, Err>,
  F: FnMut(Item) -> B,
{
  #[inline]
  fn next(&mut self, value: Item) { self.observer.next((self.func)(value)) }

  #[inline]
  fn error(self, err: Err) { self.observer.error(err) }

  #[inline]
  fn complete(self) { self.observer.complete() }

  #[inline]
  fn is_closed(&self) -> bool { self.observer.is_closed() }
}

/// Like [`Map`], but the function may fail. The first `Err` becomes the
/// stream's error and nothing after it is delivered.
#[derive(Clone)]
pub struct TryMap<S, F> {
  pub source: S,
  pub func: F,
}

pub struct TryMapObserver<O, F> {
  observer: Option<O>,
  func: F,
}

impl<S, F, B> ObservableType for TryMap<S, F>
where
  S: ObservableType,
  F: FnMut(S::Item) -> Result<B, S::Err>,
{
  type Item = B;
  type Err = S::Err;
}

impl<S, F, B, O> CoreObservable<O> for TryMap<S, F>
where
  S: CoreObservable<TryMapObserver<O, F>>,
  F: FnMut(S::Item) -> Result<B, S::Err>,
  O: Observer<B, S::Err>,
{
  type Unsub = S::Unsub;

  fn actual_subscribe(self, observer: O) -> Self::Unsub {
    self
      .source
      .actual_subscribe(TryMapObserver { observer: Some(observer), func: self.func })
  }
}

impl<O, F, Item, B, Err> Observer<Item, Err> for TryMapObserver<O, F>
where
  O: Observer<B, Err>,
  F: FnMut(Item) -> Result<B, Err>,
{
  fn next(&mut self, value: Item) {
    if self.observer.is_none() {
      return;
    }
    match (self.func)(value) {
      Ok(v) => self.observer.next(v),
      Err(e) => self.observer.take().error(e),
    }
  }

  fn error(self, err: Err) { self.observer.error(err) }

  fn complete(self) { self.observer.complete() }

  fn is_closed(&self) -> bool { self.observer.is_closed() }
}
