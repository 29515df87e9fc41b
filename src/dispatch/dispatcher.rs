//! # Dispatcher: post work onto the designated event loop.
//!
//! [`Dispatcher`] is a cheap, cloneable front end to one [`EventLoop`]. It offers
//! the base operation ([`Dispatcher::post`]) and two bound forms:
//!
//! - [`Dispatcher::post_strong`] captures a [`Handle`]; the object stays alive
//!   until the call has run.
//! - [`Dispatcher::post_weak`] captures a [`WeakHandle`]; at run time it is
//!   upgraded, the method runs once, and the temporary handle is released right
//!   after. If the object was destroyed first, the task does nothing.
//!
//! A process-wide dispatcher can be installed with [`install`]; the free
//! functions ([`post_task`], [`post_strong`], [`post_weak`]) go through it.
//!
//! ## Flow
//! ```text
//! any thread:  post_weak(weak, Widget::ping, ())
//!                 └─► Task(move || if let Some(w) = weak.upgrade() { ping(&w, ()) })
//!                        └─► EventLoop::enqueue(task)   (returns immediately)
//! loop thread: task.run()
//!                 ├─ alive → ping(&w, ()); drop(w)
//!                 └─ gone  → no-op
//! ```
//!
//! ## Failure
//! Posting with no installed loop, or to a closed one, returns an error and drops
//! the task (which also releases a strong target). Nothing runs later.

use std::sync::Arc;

use parking_lot::RwLock;

use super::event_loop::EventLoop;
use super::target::Target;
use super::task::Task;
use crate::error::DispatchError;
use crate::lifecycle::{Handle, WeakHandle};

/// Handle for posting tasks to one event loop.
#[derive(Clone)]
pub struct Dispatcher {
    target: Arc<dyn EventLoop>,
}

impl Dispatcher {
    /// Wraps an event loop.
    pub fn new<L: EventLoop>(event_loop: L) -> Self {
        Self {
            target: Arc::new(event_loop),
        }
    }

    /// Wraps an already shared event loop.
    pub fn from_arc(event_loop: Arc<dyn EventLoop>) -> Self {
        Self { target: event_loop }
    }

    /// True if both dispatchers feed the same loop instance.
    pub fn same_loop(&self, other: &Dispatcher) -> bool {
        Arc::ptr_eq(&self.target, &other.target)
    }

    /// Enqueues a prepared task.
    pub fn post_task(&self, task: Task) -> Result<(), DispatchError> {
        self.target.enqueue(task).inspect_err(|err| {
            tracing::warn!(
                event_loop = self.target.name(),
                reason = err.as_label(),
                "task dropped: event loop rejected it"
            );
        })
    }

    /// Schedules `f` to run later on the loop thread.
    pub fn post<F>(&self, f: F) -> Result<(), DispatchError>
    where
        F: FnOnce() + Send + 'static,
    {
        self.post_task(Task::new(f))
    }

    /// Schedules `method(&object, args)` against a strong or weak target.
    ///
    /// `method` can be a plain method path (`Widget::resize`) taking the
    /// arguments as one value, or any closure of that shape.
    pub fn post_to<R, A, M>(&self, target: R, method: M, args: A) -> Result<(), DispatchError>
    where
        R: Target,
        A: Send + 'static,
        M: FnOnce(&R::Object, A) + Send + 'static,
    {
        self.post(move || match target.acquire() {
            Some(object) => method(&*object, args),
            None => tracing::trace!(
                object = std::any::type_name::<R::Object>(),
                "dispatch target gone; skipping task"
            ),
        })
    }

    /// Schedules a call that keeps `target` alive until it has run.
    pub fn post_strong<T, A, M>(
        &self,
        target: Handle<T>,
        method: M,
        args: A,
    ) -> Result<(), DispatchError>
    where
        T: Send + Sync + 'static,
        A: Send + 'static,
        M: FnOnce(&T, A) + Send + 'static,
    {
        self.post_to(target, method, args)
    }

    /// Schedules a call that runs only if `target` is still alive at run time.
    pub fn post_weak<T, A, M>(
        &self,
        target: WeakHandle<T>,
        method: M,
        args: A,
    ) -> Result<(), DispatchError>
    where
        T: Send + Sync + 'static,
        A: Send + 'static,
        M: FnOnce(&T, A) + Send + 'static,
    {
        self.post_to(target, method, args)
    }
}

impl std::fmt::Debug for Dispatcher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Dispatcher")
            .field("event_loop", &self.target.name())
            .finish()
    }
}

// ---------------------------
// Process-wide dispatcher
// ---------------------------

static INSTALLED: RwLock<Option<Dispatcher>> = parking_lot::const_rwlock(None);

/// Makes `dispatcher` the process-wide target of the free posting functions.
pub fn install(dispatcher: Dispatcher) -> Result<(), DispatchError> {
    let mut slot = INSTALLED.write();
    if slot.is_some() {
        return Err(DispatchError::AlreadyInstalled);
    }
    *slot = Some(dispatcher);
    Ok(())
}

/// Removes and returns the process-wide dispatcher, if any.
pub fn uninstall() -> Option<Dispatcher> {
    INSTALLED.write().take()
}

/// Returns a clone of the process-wide dispatcher, if installed.
pub fn installed() -> Option<Dispatcher> {
    INSTALLED.read().clone()
}

fn current() -> Result<Dispatcher, DispatchError> {
    installed().ok_or_else(|| {
        tracing::warn!("task dropped: no event loop installed");
        DispatchError::NotInstalled
    })
}

/// Schedules `f` on the process-wide loop. Callable from any thread.
pub fn post_task<F>(f: F) -> Result<(), DispatchError>
where
    F: FnOnce() + Send + 'static,
{
    current()?.post(f)
}

/// [`Dispatcher::post_to`] on the process-wide loop.
pub fn post_to<R, A, M>(target: R, method: M, args: A) -> Result<(), DispatchError>
where
    R: Target,
    A: Send + 'static,
    M: FnOnce(&R::Object, A) + Send + 'static,
{
    current()?.post_to(target, method, args)
}

/// [`Dispatcher::post_strong`] on the process-wide loop.
pub fn post_strong<T, A, M>(target: Handle<T>, method: M, args: A) -> Result<(), DispatchError>
where
    T: Send + Sync + 'static,
    A: Send + 'static,
    M: FnOnce(&T, A) + Send + 'static,
{
    current()?.post_strong(target, method, args)
}

/// [`Dispatcher::post_weak`] on the process-wide loop.
pub fn post_weak<T, A, M>(target: WeakHandle<T>, method: M, args: A) -> Result<(), DispatchError>
where
    T: Send + Sync + 'static,
    A: Send + 'static,
    M: FnOnce(&T, A) + Send + 'static,
{
    current()?.post_weak(target, method, args)
}
