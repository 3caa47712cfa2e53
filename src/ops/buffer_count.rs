//! BufferCount operator implementation.

use std::{collections::VecDeque, mem};

use crate::{
  observable::{CoreObservable, ObservableType},
  observer::Observer,
};

/// Collects values into windows of `size` values.
///
/// A new window opens every `skip` values, so `skip < size` gives
/// overlapping windows and `skip > size` drops the values in between. A
/// window is emitted as soon as it is full. When the source completes the
/// open non-empty windows are emitted oldest first.
#[derive(Clone)]
pub struct BufferCount<S> {
  pub source: S,
  pub size: usize,
  pub skip: usize,
}

impl<S: ObservableType> ObservableType for BufferCount<S> {
  type Item = Vec<S::Item>;
  type Err = S::Err;
}

pub struct BufferCountObserver<O, Item> {
  observer: Option<O>,
  windows: VecDeque<Vec<Item>>,
  size: usize,
  skip: usize,
  seen: usize,
}

impl<O, Item, Err> Observer<Item, Err> for BufferCountObserver<O, Item>
where
  O: Observer<Vec<Item>, Err>,
  Item: Clone,
{
  fn next(&mut self, v: Item) {
    let Some(observer) = self.observer.as_mut() else {
      return;
    };
    if self.seen % self.skip == 0 {
      self.windows.push_back(Vec::with_capacity(self.size));
    }
    self.seen += 1;

    if let Some((last, rest)) = self.windows.make_contiguous().split_last_mut() {
      for window in rest {
        window.push(v.clone());
      }
      last.push(v);
    }

    // Windows open in order, so only the oldest one can be full.
    if self.windows.front().is_some_and(|w| w.len() >= self.size) {
      if let Some(full) = self.windows.pop_front() {
        observer.next(full);
      }
    }
  }

  fn error(self, e: Err) { self.observer.error(e) }

  fn complete(mut self) {
    if let Some(mut observer) = self.observer.take() {
      for window in mem::take(&mut self.windows) {
        if !window.is_empty() {
          observer.next(window);
        }
      }
      observer.complete();
    }
  }

  fn is_closed(&self) -> bool { self.observer.is_closed() }
}

impl<S, O> CoreObservable<O> for BufferCount<S>
where
  S: CoreObservable<BufferCountObserver<O, <S as ObservableType>::Item>>,
  S::Item: Clone,
  O: Observer<Vec<S::Item>, S::Err>,
{
  type Unsub = S::Unsub;

  fn actual_subscribe(self, observer: O) -> Self::Unsub {
    let BufferCount { source, size, skip } = self;
    source.actual_subscribe(BufferCountObserver {
      observer: Some(observer),
      windows: VecDeque::new(),
      size: size.max(1),
      skip: skip.max(1),
      seen: 0,
    })
  }
}

#[cfg(test)]
mod tests {
  use std::{cell::RefCell, rc::Rc};

  use crate::prelude::*;

  fn buffered(values: Vec<i32>, size: usize, skip: usize) -> Vec<Vec<i32>> {
    let ctx = TestCtx::default();
    let result = Rc::new(RefCell::new(Vec::new()));
    let result_clone = result.clone();
    ctx
      .from_iter(values)
      .buffer_count(size, skip)
      .subscribe(move |v| result_clone.borrow_mut().push(v));
    result.take()
  }

  #[rxkoans_macro::test]
  fn fixed_windows() {
    assert_eq!(buffered(vec![1, 2, 3, 4, 5], 2, 2), vec![vec![1, 2], vec![3, 4], vec![5]]);
  }

  #[rxkoans_macro::test]
  fn exact_multiple() {
    assert_eq!(buffered(vec![1, 2, 3, 4], 2, 2), vec![vec![1, 2], vec![3, 4]]);
  }

  #[rxkoans_macro::test]
  fn window_count_is_rounded_up() {
    for k in 0..12 {
      let windows = buffered((0..k).collect(), 3, 3);
      assert_eq!(windows.len(), (k as usize).div_ceil(3));
      assert!(windows.iter().rev().skip(1).all(|w| w.len() == 3));
    }
  }

  #[rxkoans_macro::test]
  fn overlapping_windows() {
    assert_eq!(
      buffered(vec![1, 2, 3, 4, 5], 3, 1),
      vec![vec![1, 2, 3], vec![2, 3, 4], vec![3, 4, 5], vec![4, 5], vec![5]]
    );
  }

  #[rxkoans_macro::test]
  fn gapped_windows() {
    assert_eq!(buffered(vec![1, 2, 3, 4, 5, 6, 7], 2, 3), vec![vec![1, 2], vec![4, 5], vec![7]]);
  }

  #[rxkoans_macro::test]
  fn empty_source() {
    assert!(buffered(vec![], 2, 2).is_empty());
  }

  #[rxkoans_macro::test]
  fn error_drops_open_window() {
    let ctx = TestCtx::default();
    let log = Rc::new(RefCell::new(Vec::new()));
    let (n, e) = (log.clone(), log.clone());
    let mut subject = ctx.subject::<i32, &'static str>();

    subject
      .clone()
      .buffer_count(2, 2)
      .subscribe_with(ObserverFn::new(
        move |v: Vec<i32>| n.borrow_mut().push(format!("{v:?}")),
        move |err: &'static str| e.borrow_mut().push(err.to_owned()),
        || {},
      ));

    subject.next(1);
    subject.next(2);
    subject.next(3);
    subject.error("boom");

    assert_eq!(*log.borrow(), vec!["[1, 2]", "boom"]);
  }
}
