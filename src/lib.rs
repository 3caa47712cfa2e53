//! # rxkoans: reactive streams on one thread
//!
//! A small push-based observable runtime: observables, observers,
//! subscriptions, subjects, composable operators and schedulers with a
//! deterministic virtual clock.
//!
//! ```rust
//! use rxkoans::prelude::*;
//!
//! let ctx = TestCtx::default();
//! ctx
//!   .from_iter(0..10)
//!   .filter(|v| v % 2 == 0)
//!   .map(|v| v * 2)
//!   .subscribe(|v| println!("value: {v}"));
//! ```
//!
//! ## Key Concepts
//!
//! | Type | Description |
//! |------|-------------|
//! | [`LocalCtx`] | A value paired with the scheduler it runs on |
//! | [`Observable`] | Every operator, plus `subscribe` |
//! | [`Observer`] | Consumes `next`, `error` and `complete` |
//! | [`Subscription`] | Handle to cancel an active subscription |
//! | [`Subject`] | Multicast hub, both observer and observable |
//! | [`TestScheduler`] | Virtual time, advanced by hand |
//!
//! ## Feature Flags
//!
//! - **`scheduler`** (default): the tokio backed [`LocalScheduler`] and the
//!   `Local<T>` context alias.
//!
//! [`LocalCtx`]: context::LocalCtx
//! [`Observable`]: observable::Observable
//! [`Observer`]: observer::Observer
//! [`Subscription`]: subscription::Subscription
//! [`Subject`]: subject::Subject
//! [`TestScheduler`]: scheduler::TestScheduler
//! [`LocalScheduler`]: scheduler::LocalScheduler

pub mod context;
pub mod factory;
pub mod observable;
pub mod observer;
pub mod ops;
pub mod prelude;
pub mod rc;
pub mod scheduler;
pub mod subject;
pub mod subscriber;
pub mod subscription;

pub use prelude::*;
