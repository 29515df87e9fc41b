//! # Shared-ownership handles.
//!
//! [`Handle<T>`] is the only way a managed object is ever held. It is a thin
//! wrapper over [`Arc`] that deliberately exposes no way to get the object back
//! by value (no `into_inner`, no `try_unwrap`, no conversion into `Arc<T>`).
//! Cloning a handle shares the same object; it never duplicates it.
//!
//! [`WeakHandle<T>`] is the matching non-owning observer. It can be upgraded to
//! a temporary [`Handle<T>`] while the object is alive and yields `None` after.

use std::fmt;
use std::ops::Deref;
use std::sync::{Arc, Weak};

/// Owning, reference-counted handle to a managed object.
///
/// The object is destroyed when the last `Handle` is dropped.
pub struct Handle<T> {
    inner: Arc<T>,
}

impl<T> Handle<T> {
    /// Wraps a freshly constructed object. Only the factory calls this.
    pub(crate) fn wrap(value: T) -> Self {
        Self {
            inner: Arc::new(value),
        }
    }

    /// Creates a non-owning observer of the same object.
    pub fn downgrade(&self) -> WeakHandle<T> {
        WeakHandle {
            inner: Arc::downgrade(&self.inner),
        }
    }

    /// Number of live owning handles (including this one).
    pub fn strong_count(&self) -> usize {
        Arc::strong_count(&self.inner)
    }

    /// True if both handles point at the same object.
    pub fn ptr_eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.inner, &other.inner)
    }
}

impl<T> Clone for Handle<T> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<T> Deref for Handle<T> {
    type Target = T;

    fn deref(&self) -> &T {
        &self.inner
    }
}

impl<T> AsRef<T> for Handle<T> {
    fn as_ref(&self) -> &T {
        &self.inner
    }
}

impl<T: fmt::Debug> fmt::Debug for Handle<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("Handle").field(&*self.inner).finish()
    }
}

/// Non-owning observer of a managed object.
pub struct WeakHandle<T> {
    inner: Weak<T>,
}

impl<T> WeakHandle<T> {
    /// Attempts to take temporary ownership.
    ///
    /// Returns `None` if the object has already been destroyed.
    pub fn upgrade(&self) -> Option<Handle<T>> {
        self.inner.upgrade().map(|inner| Handle { inner })
    }

    /// True while at least one owning handle exists.
    pub fn is_alive(&self) -> bool {
        self.inner.strong_count() > 0
    }
}

impl<T> Clone for WeakHandle<T> {
    fn clone(&self) -> Self {
        Self {
            inner: Weak::clone(&self.inner),
        }
    }
}

impl<T> Default for WeakHandle<T> {
    /// A handle that never upgrades.
    fn default() -> Self {
        Self { inner: Weak::new() }
    }
}

impl<T> fmt::Debug for WeakHandle<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("WeakHandle")
            .field("alive", &self.is_alive())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn clone_shares_the_object() {
        let a = Handle::wrap(5u32);
        let b = a.clone();
        assert!(a.ptr_eq(&b));
        assert_eq!(a.strong_count(), 2);
        assert_eq!(*b, 5);
    }

    #[test]
    fn weak_upgrade_follows_lifetime() {
        let a = Handle::wrap(String::from("x"));
        let weak = a.downgrade();
        assert!(weak.is_alive());
        {
            let tmp = weak.upgrade().expect("object is alive");
            assert_eq!(tmp.strong_count(), 2);
        }
        drop(a);
        assert!(!weak.is_alive());
        assert!(weak.upgrade().is_none());
    }

    #[test]
    fn default_weak_never_upgrades() {
        let weak: WeakHandle<u8> = WeakHandle::default();
        assert!(weak.upgrade().is_none());
    }
}
