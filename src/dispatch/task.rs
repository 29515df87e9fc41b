//! # Deferred unit of work.
//!
//! A [`Task`] is a boxed `FnOnce` that owns everything it needs. It has no
//! identity and cannot be cancelled once enqueued; dropping it unrun releases
//! whatever it captured.

use std::fmt;

/// Zero-argument closure scheduled onto the event loop.
pub struct Task {
    f: Box<dyn FnOnce() + Send + 'static>,
}

impl Task {
    /// Boxes a closure into a task.
    pub fn new<F>(f: F) -> Self
    where
        F: FnOnce() + Send + 'static,
    {
        Self { f: Box::new(f) }
    }

    /// Runs the task, consuming it.
    pub fn run(self) {
        (self.f)()
    }
}

impl fmt::Debug for Task {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Task { .. }")
    }
}
