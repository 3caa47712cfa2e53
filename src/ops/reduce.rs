//! Accumulating operators: `scan` emits every intermediate accumulator,
//! `reduce` only the final one.

use crate::{
  observable::{CoreObservable, ObservableType},
  observer::Observer,
};

/// How a new value folds into the accumulator.
pub trait AccumulateStrategy<Acc, Item> {
  /// `acc` is `None` only before the first value of an unseeded fold.
  fn apply(&mut self, acc: Option<Acc>, value: Item) -> Option<Acc>;
}

/// Unseeded: the first value becomes the accumulator as-is.
#[derive(Clone)]
pub struct ReduceFn<F>(pub F);

impl<F, Item> AccumulateStrategy<Item, Item> for ReduceFn<F>
where
  F: FnMut(Item, Item) -> Item,
{
  fn apply(&mut self, acc: Option<Item>, value: Item) -> Option<Item> {
    match acc {
      Some(acc) => Some((self.0)(acc, value)),
      None => Some(value),
    }
  }
}

/// Seeded: the accumulator starts from an explicit value.
#[derive(Clone)]
pub struct ReduceInitialFn<F>(pub F);

impl<F, Acc, Item> AccumulateStrategy<Acc, Item> for ReduceInitialFn<F>
where
  F: FnMut(Acc, Item) -> Acc,
{
  fn apply(&mut self, acc: Option<Acc>, value: Item) -> Option<Acc> {
    acc.map(|a| (self.0)(a, value))
  }
}

// ==================== Scan ====================

#[derive(Clone)]
pub struct Scan<S, Strategy, Acc> {
  pub source: S,
  pub strategy: Strategy,
  pub initial: Option<Acc>,
}

pub struct ScanObserver<O, Strategy, Acc> {
  observer: O,
  strategy: Strategy,
  acc: Option<Acc>,
}

impl<S, Strategy, Acc> ObservableType for Scan<S, Strategy, Acc>
where
  S: ObservableType,
{
  type Item = Acc;
  type Err = S::Err;
}

impl<S, Strategy, Acc, O> CoreObservable<O> for Scan<S, Strategy, Acc>
where
  S: CoreObservable<ScanObserver<O, Strategy, Acc>>,
  Strategy: AccumulateStrategy<Acc, S::Item>,
  Acc: Clone,
  O: Observer<Acc, S::Err>,
{
  type Unsub = S::Unsub;

  fn actual_subscribe(self, observer: O) -> Self::Unsub {
    let Scan { source, strategy, initial } = self;
    source.actual_subscribe(ScanObserver { observer, strategy, acc: initial })
  }
}

impl<O, Strategy, Acc, Item, Err> Observer<Item, Err> for ScanObserver<O, Strategy, Acc>
where
  O: Observer<Acc, Err>,
  Strategy: AccumulateStrategy<Acc, Item>,
  Acc: Clone,
{
  fn next(&mut self, value: Item) {
    self.acc = self.strategy.apply(self.acc.take(), value);
    if let Some(acc) = &self.acc {
      self.observer.next(acc.clone());
    }
  }

  fn error(self, err: Err) { self.observer.error(err) }

  fn complete(self) { self.observer.complete() }

  fn is_closed(&self) -> bool { self.observer.is_closed() }
}

// ==================== Reduce ====================

/// Emits the final accumulator when the source completes.
///
/// A seeded reduce over an empty source emits the seed; an unseeded one
/// completes without a value.
#[derive(Clone)]
pub struct Reduce<S, Strategy, Acc> {
  pub source: S,
  pub strategy: Strategy,
  pub initial: Option<Acc>,
}

pub struct ReduceObserver<O, Strategy, Acc> {
  observer: O,
  strategy: Strategy,
  acc: Option<Acc>,
}

impl<S, Strategy, Acc> ObservableType for Reduce<S, Strategy, Acc>
where
  S: ObservableType,
{
  type Item = Acc;
  type Err = S::Err;
}

impl<S, Strategy, Acc, O> CoreObservable<O> for Reduce<S, Strategy, Acc>
where
  S: CoreObservable<ReduceObserver<O, Strategy, Acc>>,
  Strategy: AccumulateStrategy<Acc, S::Item>,
  O: Observer<Acc, S::Err>,
{
  type Unsub = S::Unsub;

  fn actual_subscribe(self, observer: O) -> Self::Unsub {
    let Reduce { source, strategy, initial } = self;
    source.actual_subscribe(ReduceObserver { observer, strategy, acc: initial })
  }
}

impl<O, Strategy, Acc, Item, Err> Observer<Item, Err> for ReduceObserver<O, Strategy, Acc>
where
  O: Observer<Acc, Err>,
  Strategy: AccumulateStrategy<Acc, Item>,
{
  fn next(&mut self, value: Item) { self.acc = self.strategy.apply(self.acc.take(), value); }

  fn error(self, err: Err) { self.observer.error(err) }

  fn complete(mut self) {
    if let Some(acc) = self.acc.take() {
      self.observer.next(acc);
    }
    self.observer.complete()
  }

  fn is_closed(&self) -> bool { self.observer.is_closed() }
}
