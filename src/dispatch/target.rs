//! # Dispatch targets: strong vs weak binding.
//!
//! A [`Target`] is what a bound task holds until it runs. At execution time it
//! is turned into a temporary [`Handle`], or into nothing if the object is gone.
//!
//! | Target          | Between post and run         | At run time                   |
//! |-----------------|------------------------------|-------------------------------|
//! | `Handle<T>`     | keeps the object alive       | always yields the object      |
//! | `WeakHandle<T>` | does not keep it alive       | upgrade, or skip if destroyed |

use crate::lifecycle::{Handle, WeakHandle};

/// Reference a bound task carries to its object.
pub trait Target: Send + 'static {
    /// Type of the object the method is called on.
    type Object: Send + Sync + 'static;

    /// Takes temporary ownership of the object, if it still exists.
    fn acquire(self) -> Option<Handle<Self::Object>>;
}

impl<T: Send + Sync + 'static> Target for Handle<T> {
    type Object = T;

    fn acquire(self) -> Option<Handle<T>> {
        Some(self)
    }
}

impl<T: Send + Sync + 'static> Target for WeakHandle<T> {
    type Object = T;

    fn acquire(self) -> Option<Handle<T>> {
        self.upgrade()
    }
}
