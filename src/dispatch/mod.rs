//! Cross-thread dispatch onto a single designated event loop.
//!
//! ## Contents
//! - [`Task`] boxed deferred closure
//! - [`EventLoop`] the enqueue seam the dispatcher depends on
//! - [`TaskQueue`], [`TaskLoop`], [`channel`] reference MPSC-backed loop
//! - [`Target`] strong (`Handle`) vs weak (`WeakHandle`) binding
//! - [`Dispatcher`] and the process-wide [`install`] / [`post_task`] family
//! - [`LoopThread`] the reference loop on its own named thread
//!
//! ## Quick wiring
//! ```text
//! LoopThread::spawn(cfg) ──► install() ──► post_weak(widget.downgrade(), Widget::ping, ())
//!                                             └─► TaskQueue ─► TaskLoop (loop thread)
//! ```

mod dispatcher;
mod event_loop;
mod target;
mod task;
mod thread;

pub use dispatcher::{
    install, installed, post_strong, post_task, post_to, post_weak, uninstall, Dispatcher,
};
pub use event_loop::{channel, EventLoop, TaskLoop, TaskQueue};
pub use target::Target;
pub use task::Task;
pub use thread::LoopThread;
