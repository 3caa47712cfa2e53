//! Shared mutable cells used by operator state.
//!
//! Everything in this crate runs on one thread, so shared state is an
//! `Rc<RefCell<_>>`. A borrow is never held across a call into user code or
//! into another observer unless the observer itself lives in the cell.

use std::{
  cell::{Ref, RefCell, RefMut},
  rc::Rc,
};

#[derive(Default)]
pub struct MutRc<T>(Rc<RefCell<T>>);

impl<T> MutRc<T> {
  pub fn own(t: T) -> Self { Self(Rc::new(RefCell::new(t))) }

  #[inline]
  pub fn rc_deref(&self) -> Ref<'_, T> { self.0.borrow() }

  #[inline]
  pub fn rc_deref_mut(&self) -> RefMut<'_, T> { self.0.borrow_mut() }

  /// Mutable access, or `None` while the cell is already borrowed.
  #[inline]
  pub fn try_rc_deref_mut(&self) -> Option<RefMut<'_, T>> { self.0.try_borrow_mut().ok() }

  /// Returns `true` if both handles point to the same cell.
  #[inline]
  pub fn ptr_eq(&self, other: &Self) -> bool { Rc::ptr_eq(&self.0, &other.0) }
}

impl<T> From<T> for MutRc<T> {
  #[inline]
  fn from(t: T) -> Self { Self::own(t) }
}

impl<T> Clone for MutRc<T> {
  #[inline]
  fn clone(&self) -> Self { Self(self.0.clone()) }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[rxkoans_macro::test]
  fn clones_share_one_cell() {
    let a = MutRc::own(1);
    let b = a.clone();
    *b.rc_deref_mut() += 1;

    assert_eq!(*a.rc_deref(), 2);
    assert!(a.ptr_eq(&b));
    assert!(!a.ptr_eq(&MutRc::own(2)));
  }

  #[rxkoans_macro::test]
  fn try_borrow_fails_while_borrowed() {
    let cell = MutRc::own(1);
    let guard = cell.rc_deref_mut();
    assert!(cell.try_rc_deref_mut().is_none());
    drop(guard);
    assert!(cell.try_rc_deref_mut().is_some());
  }
}
