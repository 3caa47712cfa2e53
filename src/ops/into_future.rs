//! Awaiting an observable.
//!
//! `into_future()` subscribes right away and returns a future that
//! resolves once the stream terminates:
//!
//! - completion after values resolves with `Ok(Some(last))`,
//! - completion without values resolves with `Ok(None)`,
//! - an error resolves with `Err(error)`.
//!
//! Dropping the future before it resolved unsubscribes from the source.
//!
//! ```rust
//! use rxkoans::prelude::*;
//!
//! # #[tokio::main(flavor = "current_thread", start_paused = true)]
//! # async fn main() {
//! tokio::task::LocalSet::new()
//!   .run_until(async {
//!     let ctx = Local::default();
//!     let last = ctx
//!       .from_iter([1, 2, 3])
//!       .delay(Duration::from_millis(10))
//!       .into_future()
//!       .await;
//!     assert_eq!(last, Ok(Some(3)));
//!   })
//!   .await;
//! # }
//! ```

use std::{
  future::Future,
  mem,
  pin::Pin,
  task::{Context, Poll, Waker},
};

use crate::{
  observer::Observer,
  rc::MutRc,
  subscription::{LocalSubscription, Subscription},
};

enum State<Item, Err> {
  Running(Option<Item>),
  Done(Result<Option<Item>, Err>),
  Taken,
}

struct SharedState<Item, Err> {
  state: State<Item, Err>,
  waker: Option<Waker>,
}

/// A future that resolves when an observable terminates.
pub struct ObservableFuture<Item, Err> {
  shared: MutRc<SharedState<Item, Err>>,
  subscription: LocalSubscription,
}

impl<Item, Err> Future for ObservableFuture<Item, Err> {
  type Output = Result<Option<Item>, Err>;

  fn poll(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Self::Output> {
    let mut shared = self.shared.rc_deref_mut();
    match mem::replace(&mut shared.state, State::Taken) {
      State::Done(result) => Poll::Ready(result),
      running @ State::Running(_) => {
        shared.state = running;
        shared.waker = Some(cx.waker().clone());
        Poll::Pending
      }
      State::Taken => panic!("ObservableFuture polled after completion"),
    }
  }
}

impl<Item, Err> Drop for ObservableFuture<Item, Err> {
  fn drop(&mut self) {
    if matches!(self.shared.rc_deref().state, State::Running(_)) {
      self.subscription.clone().unsubscribe();
    }
  }
}

/// Observer feeding an [`ObservableFuture`].
pub struct IntoFutureObserver<Item, Err> {
  shared: MutRc<SharedState<Item, Err>>,
}

impl<Item, Err> IntoFutureObserver<Item, Err> {
  fn finish(self, result: impl FnOnce(Option<Item>) -> Result<Option<Item>, Err>) {
    let waker = {
      let mut shared = self.shared.rc_deref_mut();
      if let State::Running(last) = mem::replace(&mut shared.state, State::Taken) {
        shared.state = State::Done(result(last));
      }
      shared.waker.take()
    };
    if let Some(waker) = waker {
      waker.wake();
    }
  }
}

impl<Item, Err> Observer<Item, Err> for IntoFutureObserver<Item, Err> {
  fn next(&mut self, value: Item) {
    if let State::Running(last) = &mut self.shared.rc_deref_mut().state {
      *last = Some(value);
    }
  }

  fn error(self, err: Err) { self.finish(|_| Err(err)) }

  fn complete(self) { self.finish(Ok) }

  fn is_closed(&self) -> bool { !matches!(self.shared.rc_deref().state, State::Running(_)) }
}

/// Builds the future around a subscribe call.
pub fn observable_into_future<Item, Err, F>(subscribe: F) -> ObservableFuture<Item, Err>
where
  F: FnOnce(IntoFutureObserver<Item, Err>) -> LocalSubscription,
{
  let shared = MutRc::own(SharedState { state: State::Running(None), waker: None });
  let subscription = subscribe(IntoFutureObserver { shared: shared.clone() });
  ObservableFuture { shared, subscription }
}
