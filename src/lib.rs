//! # sharedloop
//!
//! **sharedloop** is a small object-lifecycle and cross-thread dispatch layer
//! for event-driven applications built around one single-threaded event loop.
//!
//! It provides three cooperating pieces:
//! - types that can only ever live behind a shared [`Handle`] and can only be
//!   built through their factory ([`SharedOnly`], [`create`]);
//! - a per-type live-instance registry that turns any object still alive at
//!   shutdown into a fatal, reported leak ([`LeakRegistry`], [`LeakCheck`]);
//! - a dispatcher that lets any thread schedule a call onto the loop thread,
//!   bound either strongly (keep the object alive) or weakly (skip it if it is
//!   gone by then) ([`Dispatcher`], [`post_strong`], [`post_weak`]).
//!
//! ## Architecture
//! ```text
//!   worker threads                                     loop thread
//!   ──────────────                                     ───────────
//!   create::<Widget>(args) ──► Handle<Widget>
//!        │                        │  (LeakRegistry: Widget live += 1)
//!        │                        │
//!        │        post_weak(h.downgrade(), Widget::ping, ())
//!        │                        │
//!        │                        ▼
//!        │                ┌───────────────┐   enqueue   ┌──────────────┐
//!        │                │  Dispatcher   │ ──────────► │  EventLoop   │
//!        │                └───────────────┘   (Task)    │ (TaskQueue)  │
//!        │                                              └──────┬───────┘
//!        ▼                                                     ▼
//!   drop(h) ──► Widget::drop (live -= 1)                TaskLoop::run()
//!                                                        upgrade? ─► ping() / no-op
//!
//!   end of main ──► LeakCheck::drop ──► teardown(): error! + abort() on any leak
//! ```
//!
//! ## Features
//! | Area            | Description                                                  | Key types / functions                       |
//! |-----------------|--------------------------------------------------------------|---------------------------------------------|
//! | **Lifecycle**   | Shared-only construction with a compile-time gate.           | [`SharedOnly`], [`create`], [`Handle`]      |
//! | **Leak check**  | Per-type atomic live counts, fatal teardown check.           | [`LeakRegistry`], [`LeakCheck`]             |
//! | **Dispatch**    | Strong/weak bound calls onto the designated loop.            | [`Dispatcher`], [`post_task`], [`Target`]   |
//! | **Event loop**  | Reference MPSC-backed loop and its dedicated thread.         | [`EventLoop`], [`TaskLoop`], [`LoopThread`] |
//! | **Utilities**   | Scoped temp directory, text parse/format.                    | [`TempDir`], [`parse_string`]               |
//! | **Errors**      | Typed errors with stable labels.                             | [`DispatchError`], [`RuntimeError`]         |
//! | **Config**      | Loop thread and temp-dir settings.                           | [`Config`]                                  |
//!
//! ## Optional features
//! - `leak-check` (default): live-instance counting and the teardown check.
//!   Without it tokens are zero-sized and `teardown()` always passes.
//!
//! ## Example
//! ```rust
//! use sharedloop::{create, Config, CreateKey, Handle, LeakToken, LoopThread, SharedOnly};
//! use std::sync::atomic::{AtomicU32, Ordering};
//!
//! struct Widget {
//!     pings: AtomicU32,
//!     _token: LeakToken<Widget>,
//! }
//!
//! impl SharedOnly for Widget {
//!     type Args = ();
//!     fn construct(key: CreateKey<Self>, _: ()) -> Self {
//!         Widget { pings: AtomicU32::new(0), _token: key.into_token() }
//!     }
//!
//!     fn leak_token(&self) -> &LeakToken<Self> {
//!         &self._token
//!     }
//! }
//!
//! impl Widget {
//!     fn ping(&self, _: ()) {
//!         self.pings.fetch_add(1, Ordering::Relaxed);
//!     }
//! }
//!
//! fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let ui = LoopThread::spawn(&Config::default())?;
//!     let widget: Handle<Widget> = create(());
//!
//!     // From any thread: runs later on the loop thread, only if widget is still alive.
//!     ui.dispatcher().post_weak(widget.downgrade(), Widget::ping, ())?;
//!
//!     ui.shutdown()?; // drains queued tasks
//!     assert_eq!(widget.pings.load(Ordering::Relaxed), 1);
//!     Ok(())
//! }
//! ```
mod config;
mod dispatch;
mod error;
mod lifecycle;
mod util;

// ---- Public re-exports ----

pub use config::{Config, DEFAULT_TEMP_PREFIX, DEFAULT_THREAD_NAME};
pub use dispatch::{
    channel, install, installed, post_strong, post_task, post_to, post_weak, uninstall,
    Dispatcher, EventLoop, LoopThread, Target, Task, TaskLoop, TaskQueue,
};
pub use error::{DispatchError, RuntimeError};
pub use lifecycle::{
    create, CreateKey, Handle, Leak, LeakCheck, LeakEntry, LeakRegistry, LeakToken, SharedOnly,
    WeakHandle,
};
pub use util::{parse_string, to_string, CreatedDir, TempDir};
