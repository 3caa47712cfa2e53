use crate::{
  observable::{CoreObservable, ObservableType},
  observer::Observer,
  rc::MutRc,
  subscription::TupleSubscription,
};

/// Combines two observables into one by merging their emissions.
///
/// Values are forwarded in the order they arrive. The merged stream
/// completes once both sources completed and errors as soon as either
/// errors. Chain `merge` for more than two sources.
///
/// ```
/// use rxkoans::prelude::*;
///
/// let ctx = TestCtx::default();
/// let numbers = ctx.subject::<i32, std::convert::Infallible>();
/// let even = numbers.clone().filter(|v| *v % 2 == 0);
/// let odd = numbers.clone().filter(|v| *v % 2 != 0);
///
/// even.merge(odd).subscribe(|v| println!("{v} "));
/// ```
#[derive(Clone)]
pub struct Merge<A, B> {
  pub source1: A,
  pub source2: B,
}

impl<A: ObservableType, B> ObservableType for Merge<A, B> {
  type Item = A::Item;
  type Err = A::Err;
}

/// Observer shared by both sources of a merge.
pub struct MergeObserver<O> {
  observer: MutRc<Option<O>>,
  remaining: MutRc<usize>,
}

impl<O> Clone for MergeObserver<O> {
  fn clone(&self) -> Self {
    MergeObserver { observer: self.observer.clone(), remaining: self.remaining.clone() }
  }
}

impl<A, B, O> CoreObservable<O> for Merge<A, B>
where
  A: CoreObservable<MergeObserver<O>>,
  B: CoreObservable<MergeObserver<O>> + ObservableType<Item = A::Item, Err = A::Err>,
  O: Observer<A::Item, A::Err>,
{
  type Unsub = TupleSubscription<A::Unsub, Option<B::Unsub>>;

  fn actual_subscribe(self, observer: O) -> Self::Unsub {
    let observer = MergeObserver { observer: MutRc::own(Some(observer)), remaining: MutRc::own(2) };
    let unsub1 = self.source1.actual_subscribe(observer.clone());
    // The first source may already have failed synchronously.
    let unsub2 = if observer.observer.rc_deref().is_none() {
      None
    } else {
      Some(self.source2.actual_subscribe(observer))
    };
    TupleSubscription::new(unsub1, unsub2)
  }
}

impl<Item, Err, O> Observer<Item, Err> for MergeObserver<O>
where
  O: Observer<Item, Err>,
{
  fn next(&mut self, value: Item) { self.observer.next(value) }

  fn error(self, err: Err) { self.observer.error(err) }

  fn complete(self) {
    let done = {
      let mut remaining = self.remaining.rc_deref_mut();
      *remaining = remaining.saturating_sub(1);
      *remaining == 0
    };
    if done {
      self.observer.complete();
    }
  }

  fn is_closed(&self) -> bool { self.observer.rc_deref().is_closed() }
}
