//! # Per-instance leak accounting.
//!
//! Every managed object embeds one [`LeakToken`]. Creating the token bumps the
//! live count of its type's [`LeakEntry`]; dropping it (when the object is
//! destroyed) brings the count back down.
//!
//! ## Rules
//! - A token can only be obtained from a [`CreateKey`](crate::CreateKey), and a
//!   key yields exactly one token, so counts move 1:1 with constructions.
//! - Tokens are neither `Clone` nor `Default`.
//! - Counters use `Relaxed` ordering: they are a liveness tally, not a
//!   synchronization point for other data.
//! - Without the `leak-check` feature the token is a zero-sized marker.

use std::fmt;
use std::marker::PhantomData;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

#[cfg(feature = "leak-check")]
use std::sync::Arc;

/// Live-instance counter shared by all instances of one managed type.
#[derive(Debug)]
pub struct LeakEntry {
    type_name: &'static str,
    live: AtomicUsize,
    exempt: AtomicBool,
}

impl LeakEntry {
    pub(crate) fn new(type_name: &'static str) -> Self {
        Self {
            type_name,
            live: AtomicUsize::new(0),
            exempt: AtomicBool::new(false),
        }
    }

    /// Fully qualified name of the tracked type.
    pub fn type_name(&self) -> &'static str {
        self.type_name
    }

    /// Current number of live instances.
    pub fn live(&self) -> usize {
        self.live.load(Ordering::Relaxed)
    }

    /// True if this type is skipped by the teardown check.
    pub fn is_exempt(&self) -> bool {
        self.exempt.load(Ordering::Relaxed)
    }

    pub(crate) fn set_exempt(&self) {
        self.exempt.store(true, Ordering::Relaxed);
    }

    #[cfg(feature = "leak-check")]
    pub(super) fn inc(&self) {
        self.live.fetch_add(1, Ordering::Relaxed);
    }

    #[cfg(feature = "leak-check")]
    pub(super) fn dec(&self) {
        self.live.fetch_sub(1, Ordering::Relaxed);
    }
}

/// Counts one live instance of `T` for as long as it exists.
///
/// Embed it as a field of the managed type; get it from
/// [`CreateKey::into_token`](crate::CreateKey::into_token).
pub struct LeakToken<T: 'static> {
    #[cfg(feature = "leak-check")]
    entry: Arc<LeakEntry>,
    _type: PhantomData<fn() -> T>,
}

impl<T: 'static> LeakToken<T> {
    #[cfg(feature = "leak-check")]
    pub(crate) fn acquire() -> Self {
        let entry = super::registry::LeakRegistry::global().entry::<T>();
        entry.inc();
        Self {
            entry,
            _type: PhantomData,
        }
    }

    #[cfg(not(feature = "leak-check"))]
    pub(crate) fn acquire() -> Self {
        Self { _type: PhantomData }
    }
}

#[cfg(feature = "leak-check")]
impl<T: 'static> Drop for LeakToken<T> {
    fn drop(&mut self) {
        self.entry.dec();
    }
}

impl<T: 'static> fmt::Debug for LeakToken<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LeakToken")
            .field("type", &std::any::type_name::<T>())
            .finish()
    }
}
