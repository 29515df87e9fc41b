//! # Event-loop seam and the reference single-threaded loop.
//!
//! [`EventLoop`] is the one primitive the dispatcher needs: "accept this task
//! and run it later on your thread". Anything that can honor that contract
//! (a GUI toolkit's UI queue, a game loop) can sit behind it.
//!
//! [`channel`] builds the reference implementation: a [`TaskQueue`] producer
//! side over an unbounded tokio MPSC channel, and the single [`TaskLoop`]
//! consumer that drains it.
//!
//! ## Diagram
//! ```text
//!  thread A ─┐
//!  thread B ─┼─ TaskQueue::enqueue(Task) ──► [unbounded mpsc] ──► TaskLoop::run()
//!  loop thr ─┘        (never blocks)             (FIFO)            └─ task.run() one at a time
//! ```
//!
//! ## Rules
//! - `enqueue` never runs the task inline, even from the loop thread.
//! - Per-producer FIFO (a single channel gives a total order as well).
//! - A panicking task is caught and logged; the loop keeps going.
//! - After shutdown `enqueue` returns [`DispatchError::LoopClosed`] and drops the task.

use std::any::Any;
use std::panic::{self, AssertUnwindSafe};

use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;

use super::task::Task;
use crate::error::DispatchError;

/// Contract for the designated single-threaded event loop.
pub trait EventLoop: Send + Sync + 'static {
    /// Hands `task` to the loop for later execution on the loop thread.
    ///
    /// Callable from any thread. Must not run `task` synchronously.
    fn enqueue(&self, task: Task) -> Result<(), DispatchError>;

    /// Human-readable name (for logs).
    fn name(&self) -> &'static str {
        std::any::type_name::<Self>()
    }
}

/// Producer side of the reference loop.
#[derive(Clone, Debug)]
pub struct TaskQueue {
    tx: mpsc::UnboundedSender<Task>,
}

impl TaskQueue {
    /// True once the consuming [`TaskLoop`] stopped accepting tasks.
    pub fn is_closed(&self) -> bool {
        self.tx.is_closed()
    }
}

impl EventLoop for TaskQueue {
    fn enqueue(&self, task: Task) -> Result<(), DispatchError> {
        self.tx.send(task).map_err(|_| DispatchError::LoopClosed)
    }

    fn name(&self) -> &'static str {
        "TaskQueue"
    }
}

/// Consumer side of the reference loop. Owned by exactly one thread.
#[derive(Debug)]
pub struct TaskLoop {
    rx: mpsc::UnboundedReceiver<Task>,
    drain_on_shutdown: bool,
}

/// Creates a connected producer/consumer pair.
///
/// The loop drains queued tasks on shutdown; see [`TaskLoop::with_drain_on_shutdown`].
pub fn channel() -> (TaskQueue, TaskLoop) {
    let (tx, rx) = mpsc::unbounded_channel();
    (
        TaskQueue { tx },
        TaskLoop {
            rx,
            drain_on_shutdown: true,
        },
    )
}

impl TaskLoop {
    /// Sets whether tasks still queued at shutdown are run (`true`) or dropped.
    pub fn with_drain_on_shutdown(mut self, drain: bool) -> Self {
        self.drain_on_shutdown = drain;
        self
    }

    /// Runs every task currently queued, including ones enqueued by those
    /// tasks, and returns how many ran. Does not wait for new tasks.
    pub fn run_pending(&mut self) -> usize {
        let mut ran = 0;
        while let Ok(task) = self.rx.try_recv() {
            run_isolated(task);
            ran += 1;
        }
        ran
    }

    /// Stops accepting new tasks. Already queued tasks can still be drained.
    pub fn close(&mut self) {
        self.rx.close();
    }

    /// Drives the loop until `token` is cancelled or every producer is gone.
    ///
    /// On exit the queue is closed and remaining tasks are either run or
    /// dropped, per `drain_on_shutdown`. Returns the number of tasks run.
    pub async fn run(mut self, token: CancellationToken) -> usize {
        let mut ran = 0;

        loop {
            tokio::select! {
                biased;
                _ = token.cancelled() => break,
                msg = self.rx.recv() => match msg {
                    Some(task) => {
                        run_isolated(task);
                        ran += 1;
                    }
                    None => break,
                }
            }
        }

        self.close();
        if self.drain_on_shutdown {
            ran += self.run_pending();
        } else {
            let mut dropped = 0usize;
            while self.rx.try_recv().is_ok() {
                dropped += 1;
            }
            if dropped > 0 {
                tracing::debug!(dropped, "event loop dropped queued tasks on shutdown");
            }
        }
        ran
    }
}

/// Runs one task, containing a panic to that task.
fn run_isolated(task: Task) {
    if let Err(payload) = panic::catch_unwind(AssertUnwindSafe(|| task.run())) {
        tracing::error!(panic = %panic_message(payload.as_ref()), "task panicked on event loop");
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> &str {
    if let Some(s) = payload.downcast_ref::<&'static str>() {
        s
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.as_str()
    } else {
        "unknown panic payload"
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use parking_lot::Mutex;

    use super::*;

    #[test]
    fn tasks_run_in_enqueue_order() {
        let (queue, mut lp) = channel();
        let seen = Arc::new(Mutex::new(Vec::new()));

        for i in 0..5 {
            let seen = Arc::clone(&seen);
            queue
                .enqueue(Task::new(move || seen.lock().push(i)))
                .expect("loop open");
        }
        assert!(seen.lock().is_empty(), "enqueue never runs inline");

        assert_eq!(lp.run_pending(), 5);
        assert_eq!(*seen.lock(), vec![0, 1, 2, 3, 4]);
    }

    #[test]
    fn task_posted_from_a_task_runs_later_not_inline() {
        let (queue, mut lp) = channel();
        let seen = Arc::new(Mutex::new(Vec::new()));

        let (q2, s2) = (queue.clone(), Arc::clone(&seen));
        queue
            .enqueue(Task::new(move || {
                let inner = Arc::clone(&s2);
                q2.enqueue(Task::new(move || inner.lock().push("inner")))
                    .expect("loop open");
                s2.lock().push("outer");
            }))
            .expect("loop open");

        assert_eq!(lp.run_pending(), 2);
        assert_eq!(*seen.lock(), vec!["outer", "inner"]);
    }

    #[test]
    fn panicking_task_does_not_stop_the_loop() {
        let (queue, mut lp) = channel();
        let seen = Arc::new(Mutex::new(0));

        queue.enqueue(Task::new(|| panic!("boom"))).expect("loop open");
        let s = Arc::clone(&seen);
        queue
            .enqueue(Task::new(move || *s.lock() += 1))
            .expect("loop open");

        assert_eq!(lp.run_pending(), 2);
        assert_eq!(*seen.lock(), 1);
    }

    #[test]
    fn enqueue_after_close_fails_and_drops_task() {
        let (queue, mut lp) = channel();
        lp.close();

        let marker = Arc::new(());
        let held = Arc::clone(&marker);
        let err = queue
            .enqueue(Task::new(move || drop(held)))
            .expect_err("loop closed");
        assert_eq!(err, DispatchError::LoopClosed);
        assert_eq!(Arc::strong_count(&marker), 1, "rejected task was dropped");
        assert!(queue.is_closed());
    }

    #[tokio::test]
    async fn run_drains_queue_after_cancel() {
        let (queue, lp) = channel();
        let seen = Arc::new(Mutex::new(0));
        for _ in 0..3 {
            let s = Arc::clone(&seen);
            queue
                .enqueue(Task::new(move || *s.lock() += 1))
                .expect("loop open");
        }

        let token = CancellationToken::new();
        token.cancel();
        assert_eq!(lp.run(token).await, 3);
        assert_eq!(*seen.lock(), 3);
        assert!(queue.enqueue(Task::new(|| {})).is_err());
    }

    #[tokio::test]
    async fn run_can_drop_queue_on_shutdown() {
        let (queue, lp) = channel();
        let seen = Arc::new(Mutex::new(0));
        let s = Arc::clone(&seen);
        queue
            .enqueue(Task::new(move || *s.lock() += 1))
            .expect("loop open");

        let token = CancellationToken::new();
        token.cancel();
        assert_eq!(lp.with_drain_on_shutdown(false).run(token).await, 0);
        assert_eq!(*seen.lock(), 0);
        assert_eq!(Arc::strong_count(&seen), 1, "dropped task released its capture");
    }

    #[tokio::test]
    async fn run_exits_when_all_producers_are_gone() {
        let (queue, lp) = channel();
        queue.enqueue(Task::new(|| {})).expect("loop open");
        drop(queue);
        assert_eq!(lp.run(CancellationToken::new()).await, 1);
    }
}
