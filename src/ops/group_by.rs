use std::{collections::HashMap, hash::Hash};

use crate::{
  context::LocalCtx,
  observable::{CoreObservable, ObservableType},
  observer::Observer,
  scheduler::Scheduler,
  subject::Subject,
};

/// One group of a `group_by`: the values that share `key`.
///
/// It is hot, like the subject behind it, so it should be subscribed to
/// when it is received.
#[derive(Clone)]
pub struct GroupedObservable<Key, Item, Err> {
  pub key: Key,
  subject: Subject<Item, Err>,
}

impl<Key, Item, Err> ObservableType for GroupedObservable<Key, Item, Err> {
  type Item = Item;
  type Err = Err;
}

impl<Key, Item, Err, O> CoreObservable<O> for GroupedObservable<Key, Item, Err>
where
  Subject<Item, Err>: CoreObservable<O>,
{
  type Unsub = <Subject<Item, Err> as CoreObservable<O>>::Unsub;

  fn actual_subscribe(self, observer: O) -> Self::Unsub { self.subject.actual_subscribe(observer) }
}

impl<Key, Item, Err, S> LocalCtx<GroupedObservable<Key, Item, Err>, S> {
  pub fn key(&self) -> &Key { &self.inner().key }
}

/// Splits a stream into one group per key.
///
/// A group is emitted the first time its key shows up, before it receives
/// that value. Completion and errors reach every group before the outer
/// stream.
#[derive(Clone)]
pub struct GroupBy<S, F, Sch> {
  pub source: S,
  pub key_fn: F,
  pub scheduler: Sch,
}

impl<S, F, Key, Sch> ObservableType for GroupBy<S, F, Sch>
where
  S: ObservableType,
  F: FnMut(&S::Item) -> Key,
{
  type Item = LocalCtx<GroupedObservable<Key, S::Item, S::Err>, Sch>;
  type Err = S::Err;
}

pub struct GroupByObserver<O, F, Key, Item, Err, Sch> {
  observer: O,
  key_fn: F,
  groups: HashMap<Key, Subject<Item, Err>>,
  scheduler: Sch,
}

impl<S, F, Key, Sch, O> CoreObservable<O> for GroupBy<S, F, Sch>
where
  S: CoreObservable<
    GroupByObserver<O, F, Key, <S as ObservableType>::Item, <S as ObservableType>::Err, Sch>,
  >,
  F: FnMut(&S::Item) -> Key,
  Key: Hash + Eq + Clone,
  S::Item: Clone,
  S::Err: Clone,
  Sch: Scheduler,
  O: Observer<LocalCtx<GroupedObservable<Key, S::Item, S::Err>, Sch>, S::Err>,
{
  type Unsub = S::Unsub;

  fn actual_subscribe(self, observer: O) -> Self::Unsub {
    let GroupBy { source, key_fn, scheduler } = self;
    source.actual_subscribe(GroupByObserver { observer, key_fn, groups: HashMap::new(), scheduler })
  }
}

impl<O, F, Key, Item, Err, Sch> Observer<Item, Err> for GroupByObserver<O, F, Key, Item, Err, Sch>
where
  O: Observer<LocalCtx<GroupedObservable<Key, Item, Err>, Sch>, Err>,
  F: FnMut(&Item) -> Key,
  Key: Hash + Eq + Clone,
  Item: Clone,
  Err: Clone,
  Sch: Scheduler,
{
  fn next(&mut self, value: Item) {
    let key = (self.key_fn)(&value);
    let subject = self.groups.entry(key.clone()).or_insert_with(|| {
      let subject = Subject::new();
      let group = GroupedObservable { key, subject: subject.clone() };
      self
        .observer
        .next(LocalCtx::from_parts(group, self.scheduler.clone()));
      subject
    });
    subject.next(value);
  }

  fn error(mut self, err: Err) {
    for (_, subject) in self.groups.drain() {
      subject.error(err.clone());
    }
    self.observer.error(err)
  }

  fn complete(mut self) {
    for (_, subject) in self.groups.drain() {
      subject.complete();
    }
    self.observer.complete()
  }

  fn is_closed(&self) -> bool { self.observer.is_closed() }
}
