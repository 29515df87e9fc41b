//! # LoopThread: the reference event loop on its own OS thread.
//!
//! Spawns a named thread running a tokio current-thread runtime that drives a
//! [`TaskLoop`](super::TaskLoop) until shutdown.
//!
//! ## Lifecycle
//! ```text
//! LoopThread::spawn(cfg)
//!   ├─► channel() → (TaskQueue, TaskLoop)
//!   ├─► build current-thread runtime
//!   └─► thread "cfg.thread_name": runtime.block_on(TaskLoop::run(token))
//!
//! install()  ──► dispatch::install(dispatcher)      (optional)
//!
//! shutdown()
//!   ├─► dispatch::uninstall() if we installed it
//!   ├─► token.cancel()  → loop closes intake, drains or drops queued tasks
//!   └─► join thread     → Err(LoopPanicked) if it died
//!                         (skipped when called on the loop thread)
//! ```

use std::thread::{self, JoinHandle, ThreadId};

use tokio_util::sync::CancellationToken;

use super::dispatcher::{self, Dispatcher};
use super::event_loop;
use crate::config::Config;
use crate::error::{DispatchError, RuntimeError};

/// Owner of the event-loop thread.
///
/// Dropping it without calling [`shutdown`](LoopThread::shutdown) performs the
/// same shutdown and logs (instead of returning) a failure.
#[derive(Debug)]
pub struct LoopThread {
    dispatcher: Dispatcher,
    token: CancellationToken,
    join: Option<JoinHandle<usize>>,
    thread_id: ThreadId,
    installed: bool,
}

impl LoopThread {
    /// Starts the loop thread.
    pub fn spawn(cfg: &Config) -> Result<Self, RuntimeError> {
        let (queue, task_loop) = event_loop::channel();
        let task_loop = task_loop.with_drain_on_shutdown(cfg.drain_on_shutdown);

        let runtime = tokio::runtime::Builder::new_current_thread()
            .build()
            .map_err(|source| RuntimeError::LoopSpawn { source })?;

        let token = CancellationToken::new();
        let loop_token = token.clone();
        let join = thread::Builder::new()
            .name(cfg.thread_name.clone())
            .spawn(move || {
                tracing::debug!("event loop started");
                let ran = runtime.block_on(task_loop.run(loop_token));
                tracing::debug!(tasks = ran, "event loop stopped");
                ran
            })
            .map_err(|source| RuntimeError::LoopSpawn { source })?;

        Ok(Self {
            dispatcher: Dispatcher::new(queue),
            token,
            thread_id: join.thread().id(),
            join: Some(join),
            installed: false,
        })
    }

    /// Returns a dispatcher feeding this loop.
    pub fn dispatcher(&self) -> Dispatcher {
        self.dispatcher.clone()
    }

    /// Makes this loop the process-wide target of [`post_task`](crate::post_task) and friends.
    pub fn install(&mut self) -> Result<(), DispatchError> {
        dispatcher::install(self.dispatcher.clone())?;
        self.installed = true;
        Ok(())
    }

    /// True when called from the loop thread itself.
    pub fn is_current(&self) -> bool {
        thread::current().id() == self.thread_id
    }

    /// Stops the loop and waits for the thread to exit.
    ///
    /// Tasks already queued are run or dropped per [`Config::drain_on_shutdown`];
    /// posts made after this call fail with [`DispatchError::LoopClosed`].
    ///
    /// Called from a task on the loop thread itself, it only requests the stop:
    /// the loop finishes after that task returns and the thread is not joined.
    pub fn shutdown(mut self) -> Result<(), RuntimeError> {
        self.stop()
    }

    fn stop(&mut self) -> Result<(), RuntimeError> {
        if self.installed {
            if let Some(current) = dispatcher::installed() {
                if current.same_loop(&self.dispatcher) {
                    dispatcher::uninstall();
                }
            }
            self.installed = false;
        }

        self.token.cancel();
        let Some(join) = self.join.take() else {
            return Ok(());
        };
        if self.is_current() {
            // Joining ourselves would deadlock. The loop exits once this task returns.
            tracing::debug!("event loop stop requested from its own thread; not joining");
            return Ok(());
        }
        join.join().map(|_| ()).map_err(|_| RuntimeError::LoopPanicked)
    }
}

impl Drop for LoopThread {
    fn drop(&mut self) {
        if self.join.is_none() {
            return;
        }
        if let Err(err) = self.stop() {
            tracing::error!(reason = err.as_label(), "event loop thread failed");
        }
    }
}
