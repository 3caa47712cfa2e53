use std::convert::Infallible;

use crate::{
  observable::{CoreObservable, ObservableType},
  observer::Observer,
};

/// Emits every item of an iterator synchronously, then completes.
///
/// The observer is asked whether it is closed before each item, so an
/// infinite iterator is fine as long as something downstream (`take`,
/// `take_while`) closes the subscription.
#[derive(Clone)]
pub struct FromIter<I>(pub I);

impl<I: IntoIterator> ObservableType for FromIter<I> {
  type Item = I::Item;
  type Err = Infallible;
}

impl<I, O> CoreObservable<O> for FromIter<I>
where
  I: IntoIterator,
  O: Observer<I::Item, Infallible>,
{
  type Unsub = ();

  fn actual_subscribe(self, mut observer: O) -> Self::Unsub {
    for v in self.0 {
      if observer.is_closed() {
        return;
      }
      observer.next(v);
    }
    observer.complete();
  }
}
