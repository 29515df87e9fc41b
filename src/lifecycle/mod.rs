//! Object lifecycle: shared-only construction and leak accounting.
//!
//! ## Contents
//! - [`SharedOnly`], [`create`], [`CreateKey`] construction gate and factory
//! - [`Handle`], [`WeakHandle`] owning / observing handles
//! - [`LeakToken`], [`LeakEntry`] per-instance and per-type counters
//! - [`LeakRegistry`], [`LeakCheck`], [`Leak`] process-wide registry and teardown check
//!
//! ## Wiring
//! ```text
//! create::<T>() ──► T::construct(key) ──► key.into_token() ──► LeakRegistry::entry::<T>()
//!       │                                                            (live += 1)
//!       └──► Handle<T> ── clone / downgrade ──► WeakHandle<T>
//!                 │
//!         last drop ──► LeakToken<T>::drop() (live -= 1)
//! ```

mod factory;
mod handle;
mod leak;
mod registry;

pub use factory::{create, CreateKey, SharedOnly};
pub use handle::{Handle, WeakHandle};
pub use leak::{LeakEntry, LeakToken};
pub use registry::{Leak, LeakCheck, LeakRegistry};
