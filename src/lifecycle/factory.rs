//! # Shared-only construction.
//!
//! A type opts in by implementing [`SharedOnly`]. From then on [`create`] is the
//! single entry point that produces an instance, and it always hands back a
//! [`Handle`].
//!
//! ## Construction gate
//! [`SharedOnly::construct`] takes a [`CreateKey<Self>`]. The key has a private
//! field and no public constructor: only [`create`] can mint one. The key is
//! then consumed by [`CreateKey::into_token`] to obtain the [`LeakToken`] that
//! the type stores, and a value of the type cannot be written down without that
//! token. Together this rejects any other construction path at compile time:
//!
//! ```compile_fail
//! use sharedloop::{CreateKey, LeakToken};
//!
//! struct Widget {
//!     token: LeakToken<Widget>,
//! }
//!
//! // There is no way to mint a key outside the factory.
//! let key: CreateKey<Widget> = CreateKey { _type: std::marker::PhantomData };
//! let _w = Widget { token: key.into_token() };
//! ```
//!
//! ```compile_fail
//! use sharedloop::LeakToken;
//!
//! struct Widget {
//!     token: LeakToken<Widget>,
//! }
//!
//! // Tokens cannot be created directly either.
//! let _w = Widget { token: LeakToken::acquire() };
//! ```
//!
//! The token is not optional. [`SharedOnly::leak_token`] has no default, so a
//! type without a [`LeakToken`] field (and therefore constructible by a plain
//! struct literal) cannot implement the trait:
//!
//! ```compile_fail
//! use sharedloop::{CreateKey, SharedOnly};
//!
//! struct Bare {
//!     n: u32,
//! }
//!
//! impl SharedOnly for Bare {
//!     type Args = u32;
//!
//!     fn construct(_key: CreateKey<Self>, n: u32) -> Self {
//!         Bare { n }
//!     }
//! }
//!
//! // Would otherwise be possible outside the factory:
//! let on_stack = Bare { n: 2 };
//! let _moved = on_stack;
//! ```
//!
//! [`create`] also checks that the returned token lives inside the object
//! itself, so it cannot be borrowed from somewhere else.
//!
//! ## Sequence
//! ```text
//! create::<T>(args)
//!   ├─► key = CreateKey::<T>::new()          (private)
//!   ├─► value = T::construct(key, args)      (key.into_token() → live += 1)
//!   ├─► check value.leak_token() is inside value
//!   ├─► handle = Handle::wrap(value)         (no window without an owner)
//!   ├─► T::after_construct(&handle)          (handle exists now)
//!   └─► handle
//! ```

use std::fmt;
use std::marker::PhantomData;
use std::mem;

use super::handle::Handle;
use super::leak::LeakToken;

/// Single-use proof that construction goes through [`create`].
pub struct CreateKey<T: 'static> {
    _type: PhantomData<fn() -> T>,
}

impl<T: 'static> CreateKey<T> {
    fn new() -> Self {
        Self { _type: PhantomData }
    }

    /// Consumes the key, registering one live instance of `T`.
    pub fn into_token(self) -> LeakToken<T> {
        LeakToken::acquire()
    }
}

impl<T: 'static> fmt::Debug for CreateKey<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CreateKey")
            .field("type", &std::any::type_name::<T>())
            .finish()
    }
}

/// A type that can only live behind a [`Handle`].
///
/// # Example
/// ```
/// use sharedloop::{create, CreateKey, Handle, LeakToken, SharedOnly};
///
/// struct Counter {
///     start: u32,
///     _token: LeakToken<Counter>,
/// }
///
/// impl SharedOnly for Counter {
///     type Args = u32;
///
///     fn construct(key: CreateKey<Self>, start: u32) -> Self {
///         Counter { start, _token: key.into_token() }
///     }
///
///     fn leak_token(&self) -> &LeakToken<Self> {
///         &self._token
///     }
/// }
///
/// let c: Handle<Counter> = create(7);
/// assert_eq!(c.start, 7);
/// ```
pub trait SharedOnly: Send + Sync + Sized + 'static {
    /// Everything [`construct`](SharedOnly::construct) needs. Use a tuple for
    /// several values and `()` for none.
    type Args;

    /// Builds the value. Must store `key.into_token()`.
    fn construct(key: CreateKey<Self>, args: Self::Args) -> Self;

    /// The token stored by [`construct`](SharedOnly::construct). Must be a
    /// field of `self`.
    fn leak_token(&self) -> &LeakToken<Self>;

    /// Runs once the handle exists, e.g. to hand a [`WeakHandle`](crate::WeakHandle)
    /// of itself to a listener list. Never called from inside `construct`.
    fn after_construct(this: &Handle<Self>) {
        let _ = this;
    }
}

/// Creates a managed object. The only way to obtain one.
///
/// # Panics
/// If `T::leak_token` returns a token that is not part of the object.
pub fn create<T: SharedOnly>(args: T::Args) -> Handle<T> {
    let value = T::construct(CreateKey::new(), args);
    assert!(
        owns_token(&value),
        "{}::leak_token must return a field of the object",
        std::any::type_name::<T>()
    );
    let handle = Handle::wrap(value);
    T::after_construct(&handle);
    handle
}

fn owns_token<T: SharedOnly>(value: &T) -> bool {
    let start = value as *const T as usize;
    let end = start + mem::size_of::<T>();
    let token = value.leak_token() as *const LeakToken<T> as usize;
    token >= start && token + mem::size_of::<LeakToken<T>>() <= end
}

impl<T: SharedOnly> Handle<T> {
    /// Same as [`create`].
    pub fn new(args: T::Args) -> Self {
        create(args)
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};

    use parking_lot::Mutex;

    use super::*;
    use crate::lifecycle::handle::WeakHandle;

    struct Probe {
        id: u32,
        _token: LeakToken<Probe>,
    }

    impl SharedOnly for Probe {
        type Args = u32;

        fn construct(key: CreateKey<Self>, id: u32) -> Self {
            Probe {
                id,
                _token: key.into_token(),
            }
        }

        fn leak_token(&self) -> &LeakToken<Self> {
            &self._token
        }
    }

    static HOOK_CALLS: AtomicUsize = AtomicUsize::new(0);

    struct SelfAware {
        me: Mutex<WeakHandle<SelfAware>>,
        _token: LeakToken<SelfAware>,
    }

    impl SharedOnly for SelfAware {
        type Args = ();

        fn construct(key: CreateKey<Self>, _: ()) -> Self {
            SelfAware {
                me: Mutex::new(WeakHandle::default()),
                _token: key.into_token(),
            }
        }

        fn leak_token(&self) -> &LeakToken<Self> {
            &self._token
        }

        fn after_construct(this: &Handle<Self>) {
            HOOK_CALLS.fetch_add(1, Ordering::Relaxed);
            *this.me.lock() = this.downgrade();
        }
    }

    #[test]
    fn create_returns_handle_with_args() {
        let p = create::<Probe>(42);
        assert_eq!(p.id, 42);
        assert_eq!(p.strong_count(), 1);
    }

    #[cfg(feature = "leak-check")]
    #[test]
    fn count_returns_to_zero_after_all_handles_drop() {
        struct Tally {
            _token: LeakToken<Tally>,
        }

        impl SharedOnly for Tally {
            type Args = ();

            fn construct(key: CreateKey<Self>, _: ()) -> Self {
                Tally {
                    _token: key.into_token(),
                }
            }

            fn leak_token(&self) -> &LeakToken<Self> {
                &self._token
            }
        }

        let reg = crate::lifecycle::registry::LeakRegistry::global();
        let handles: Vec<Handle<Tally>> = (0..16).map(|_| Handle::new(())).collect();
        let clones: Vec<Handle<Tally>> = handles.iter().cloned().collect();
        assert_eq!(reg.live_count::<Tally>(), 16);

        drop(handles);
        assert_eq!(reg.live_count::<Tally>(), 16, "clones keep objects alive");
        drop(clones);
        assert_eq!(reg.live_count::<Tally>(), 0);
    }

    struct Borrowed {
        _n: u32,
    }

    static STRAY: std::sync::OnceLock<LeakToken<Borrowed>> = std::sync::OnceLock::new();

    impl SharedOnly for Borrowed {
        type Args = u32;

        fn construct(key: CreateKey<Self>, n: u32) -> Self {
            drop(key.into_token());
            Borrowed { _n: n }
        }

        fn leak_token(&self) -> &LeakToken<Self> {
            STRAY.get_or_init(LeakToken::acquire)
        }
    }

    #[test]
    #[should_panic(expected = "leak_token must return a field of the object")]
    fn token_from_outside_the_object_is_rejected() {
        let _ = create::<Borrowed>(1);
    }

    #[test]
    fn token_is_a_field_of_the_object() {
        let p = create::<Probe>(3);
        assert!(owns_token(&*p));
    }

    #[test]
    fn after_construct_sees_the_handle() {
        let before = HOOK_CALLS.load(Ordering::Relaxed);
        let h = create::<SelfAware>(());
        assert_eq!(HOOK_CALLS.load(Ordering::Relaxed), before + 1);

        let me = h.me.lock().upgrade().expect("hook stored a live weak ref");
        assert!(me.ptr_eq(&h));
    }
}
