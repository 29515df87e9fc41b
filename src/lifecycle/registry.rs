//! # Leak registry - process-wide live-instance accounting.
//!
//! One [`LeakEntry`] per managed type, keyed by [`TypeId`], created lazily the
//! first time an instance of that type is constructed.
//!
//! ## Lifecycle
//! ```text
//! create::<T>() ──► CreateKey::into_token() ──► entry::<T>().live += 1
//! last Handle<T> dropped ──► LeakToken<T>::drop() ──► entry::<T>().live -= 1
//!
//! end of main ──► LeakCheck::drop() ──► teardown()
//!                                         ├─ no leaks → debug!, return
//!                                         └─ leaks    → error! per type, abort()
//! ```
//!
//! ## Rules
//! - The map lock is only taken to create or look up entries; counting itself
//!   is lock-free.
//! - Entries are never removed; the registry lives for the whole process.
//! - A leak at teardown is fatal. There is no recoverable path.
//! - Teardown inspects once. Repeated calls are no-ops.
//! - Types marked with [`LeakRegistry::exempt`] are still counted but never
//!   reported (intentionally long-lived instances).

use std::any::{type_name, TypeId};
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, OnceLock};

use parking_lot::RwLock;

use super::leak::LeakEntry;

static GLOBAL: OnceLock<LeakRegistry> = OnceLock::new();

/// A managed type that still had live instances when checked.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Leak {
    /// Fully qualified type name.
    pub type_name: &'static str,
    /// Number of instances still alive.
    pub count: usize,
}

/// Process-wide registry of per-type live counters.
pub struct LeakRegistry {
    entries: RwLock<HashMap<TypeId, Arc<LeakEntry>>>,
    torn_down: AtomicBool,
}

impl LeakRegistry {
    fn new() -> Self {
        Self {
            entries: RwLock::new(HashMap::new()),
            torn_down: AtomicBool::new(false),
        }
    }

    /// Returns the process-wide registry, creating it on first use.
    pub fn global() -> &'static LeakRegistry {
        GLOBAL.get_or_init(LeakRegistry::new)
    }

    /// Returns the entry for `T`, creating it if needed.
    pub fn entry<T: 'static>(&self) -> Arc<LeakEntry> {
        let id = TypeId::of::<T>();
        if let Some(entry) = self.entries.read().get(&id) {
            return Arc::clone(entry);
        }

        let mut entries = self.entries.write();
        Arc::clone(
            entries
                .entry(id)
                .or_insert_with(|| Arc::new(LeakEntry::new(type_name::<T>()))),
        )
    }

    /// Current number of live instances of `T` (0 if never constructed).
    pub fn live_count<T: 'static>(&self) -> usize {
        self.entries
            .read()
            .get(&TypeId::of::<T>())
            .map(|e| e.live())
            .unwrap_or(0)
    }

    /// Excludes `T` from teardown reporting.
    ///
    /// Use for instances that are meant to outlive `main` (process-long
    /// singletons). Counting still happens.
    pub fn exempt<T: 'static>(&self) {
        self.entry::<T>().set_exempt();
    }

    /// Returns every non-exempt type with live instances, sorted by name.
    pub fn leaks(&self) -> Vec<Leak> {
        let entries = self.entries.read();
        let mut leaks: Vec<Leak> = entries
            .values()
            .filter(|e| !e.is_exempt())
            .filter_map(|e| match e.live() {
                0 => None,
                count => Some(Leak {
                    type_name: e.type_name(),
                    count,
                }),
            })
            .collect();
        leaks.sort_unstable_by(|a, b| a.type_name.cmp(b.type_name));
        leaks
    }

    /// True once [`teardown`](LeakRegistry::teardown) has run.
    pub fn is_torn_down(&self) -> bool {
        self.torn_down.load(Ordering::Acquire)
    }

    /// Number of types that have ever been registered.
    pub fn len(&self) -> usize {
        self.entries.read().len()
    }

    /// True if no managed type has been constructed yet.
    pub fn is_empty(&self) -> bool {
        self.entries.read().is_empty()
    }

    /// Final shutdown check: reports every leak, then aborts the process.
    ///
    /// Returns normally only when nothing leaked. Only the first call checks;
    /// later calls (a second [`LeakCheck`], say) return without inspecting.
    pub fn teardown(&self) {
        if self.torn_down.swap(true, Ordering::AcqRel) {
            tracing::trace!("leak check already ran");
            return;
        }

        let leaks = self.leaks();
        if leaks.is_empty() {
            tracing::debug!(types = self.len(), "leak check passed");
            return;
        }

        for leak in &leaks {
            tracing::error!(
                type_name = leak.type_name,
                count = leak.count,
                "MEMORY LEAK: {} {} objects remaining",
                leak.count,
                leak.type_name
            );
        }
        std::process::abort();
    }
}

/// Runs [`LeakRegistry::teardown`] when dropped.
///
/// Hold one for the duration of `main`:
/// ```no_run
/// fn main() {
///     let _leak_check = sharedloop::LeakCheck::at_exit();
///     // ... application ...
/// } // teardown runs here
/// ```
#[must_use = "the check runs when this guard is dropped"]
#[derive(Debug)]
pub struct LeakCheck {
    _private: (),
}

impl LeakCheck {
    /// Creates the guard.
    pub fn at_exit() -> Self {
        Self { _private: () }
    }
}

impl Drop for LeakCheck {
    fn drop(&mut self) {
        LeakRegistry::global().teardown();
    }
}

#[cfg(all(test, feature = "leak-check"))]
mod tests {
    use super::*;
    use crate::lifecycle::leak::LeakToken;

    struct Leaky;
    struct LongLived;
    struct Untouched;

    #[test]
    fn leaks_report_live_types() {
        let reg = LeakRegistry::global();
        let token = LeakToken::<Leaky>::acquire();

        let leak = reg
            .leaks()
            .into_iter()
            .find(|l| l.type_name.ends_with("Leaky"))
            .expect("Leaky is reported");
        assert_eq!(leak.count, 1);

        drop(token);
        assert!(!reg.leaks().iter().any(|l| l.type_name.ends_with("Leaky")));
    }

    #[test]
    fn exempt_types_are_counted_but_not_reported() {
        let reg = LeakRegistry::global();
        reg.exempt::<LongLived>();
        let _token = LeakToken::<LongLived>::acquire();

        assert_eq!(reg.live_count::<LongLived>(), 1);
        assert!(!reg.leaks().iter().any(|l| l.type_name.ends_with("LongLived")));
    }

    #[test]
    fn unknown_type_counts_zero() {
        assert_eq!(LeakRegistry::global().live_count::<Untouched>(), 0);
    }

    #[test]
    fn only_first_teardown_inspects() {
        let reg = LeakRegistry::new();
        assert!(!reg.is_torn_down());

        reg.teardown();
        assert!(reg.is_torn_down());

        // A leak appearing afterwards is not inspected again, so this returns.
        reg.entry::<Leaky>().inc();
        reg.teardown();
        assert_eq!(reg.leaks().len(), 1);
    }

    #[test]
    fn entry_is_shared_per_type() {
        let reg = LeakRegistry::global();
        let a = reg.entry::<Leaky>();
        let b = reg.entry::<Leaky>();
        assert!(Arc::ptr_eq(&a, &b));
    }
}
