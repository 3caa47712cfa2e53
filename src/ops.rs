//! Operators.
//!
//! Each module holds the core observable built by one method of
//! [`Observable`](crate::observable::Observable), together with the observer
//! it subscribes its source with.

pub mod all;
pub mod buffer_count;
pub mod buffer_time;
pub mod catch_error;
pub mod collect;
pub mod concat;
pub mod debounce;
pub mod delay;
pub mod filter;
pub mod group_by;
pub mod into_future;
pub mod lifecycle;
pub mod map;
pub mod map_err;
pub mod merge;
pub mod observe_on;
pub mod race;
pub mod reduce;
pub mod take;
pub mod take_while;
pub mod tap;
pub mod time_interval;
pub mod timeout;
