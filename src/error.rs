//! Error types used by the sharedloop runtime.
//!
//! This module defines two error enums:
//!
//! - [`DispatchError`]: failures to hand a task to the designated event loop.
//! - [`RuntimeError`]: failures of the runtime pieces around it (loop thread, temp dirs).
//!
//! Both provide `as_label` for logs/metrics. Lifetime violations are not here:
//! constructing a managed object outside its factory is a compile error, and a
//! leak at teardown aborts the process instead of returning.

use std::io;
use std::path::PathBuf;

use thiserror::Error;

/// # Errors produced when posting a task.
///
/// Posting never blocks and never runs the task; these only say that the task
/// could not be enqueued. The task (and anything it captured) has already been
/// dropped by the time the caller sees the error.
#[non_exhaustive]
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum DispatchError {
    /// No process-wide event loop is installed.
    #[error("no event loop installed")]
    NotInstalled,

    /// A process-wide event loop is already installed.
    #[error("an event loop is already installed")]
    AlreadyInstalled,

    /// The event loop stopped accepting tasks (shutdown in progress or done).
    #[error("event loop closed")]
    LoopClosed,
}

impl DispatchError {
    /// Returns a short stable label (snake_case) for use in logs/metrics.
    ///
    /// # Example
    /// ```
    /// use sharedloop::DispatchError;
    ///
    /// assert_eq!(DispatchError::LoopClosed.as_label(), "dispatch_loop_closed");
    /// ```
    pub fn as_label(&self) -> &'static str {
        match self {
            DispatchError::NotInstalled => "dispatch_not_installed",
            DispatchError::AlreadyInstalled => "dispatch_already_installed",
            DispatchError::LoopClosed => "dispatch_loop_closed",
        }
    }
}

/// # Errors produced by the runtime pieces.
#[non_exhaustive]
#[derive(Error, Debug)]
pub enum RuntimeError {
    /// The loop thread (or its tokio runtime) could not be started.
    #[error("failed to start event loop thread: {source}")]
    LoopSpawn {
        /// Underlying OS / runtime error.
        #[source]
        source: io::Error,
    },

    /// The loop thread panicked outside of a task.
    #[error("event loop thread panicked")]
    LoopPanicked,

    /// A temporary directory could not be created.
    #[error("failed to create temporary directory under {path:?}: {source}")]
    TempDir {
        /// Root the directory was requested under.
        path: PathBuf,
        /// Underlying filesystem error.
        #[source]
        source: io::Error,
    },
}

impl RuntimeError {
    /// Returns a short stable label (snake_case) for use in logs/metrics.
    ///
    /// # Example
    /// ```
    /// use sharedloop::RuntimeError;
    ///
    /// assert_eq!(RuntimeError::LoopPanicked.as_label(), "runtime_loop_panicked");
    /// ```
    pub fn as_label(&self) -> &'static str {
        match self {
            RuntimeError::LoopSpawn { .. } => "runtime_loop_spawn",
            RuntimeError::LoopPanicked => "runtime_loop_panicked",
            RuntimeError::TempDir { .. } => "runtime_temp_dir",
        }
    }

    /// Returns a human-readable message with details about the error.
    pub fn as_message(&self) -> String {
        match self {
            RuntimeError::LoopSpawn { source } => format!("loop spawn failed: {source}"),
            RuntimeError::LoopPanicked => "loop thread panicked".to_string(),
            RuntimeError::TempDir { path, source } => {
                format!("temp dir under {} failed: {source}", path.display())
            }
        }
    }
}
