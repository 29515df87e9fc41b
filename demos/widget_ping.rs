//! # Example: widget_ping
//!
//! A widget registers itself with a listener list right after construction,
//! worker threads ping it through weak bindings, and the widget is closed while
//! pings are still queued.
//!
//! Demonstrates how to:
//! - Define a shared-only type with [`SharedOnly`] and an `after_construct` hook.
//! - Post strong and weak bound calls onto the loop thread.
//! - Guard `main` with [`LeakCheck`] so leftovers abort the process.
//!
//! ## Flow
//! ```text
//! create::<Widget>()
//!     └─► after_construct ─► LISTENERS.push(weak self)
//! worker threads ─► post_weak(listener, Widget::ping, n)
//! main ─► drop(widget)            (queued pings become no-ops)
//! LoopThread::shutdown()          (drains queue)
//! LeakCheck::drop                 (Widget live = 0 → passes)
//! ```
//!
//! ## Run
//! ```bash
//! RUST_LOG=trace cargo run --example widget_ping
//! ```

use std::sync::atomic::{AtomicU32, Ordering};
use std::thread;

use parking_lot::Mutex;
use sharedloop::{
    create, post_strong, post_weak, Config, CreateKey, Handle, LeakCheck, LeakToken,
    LoopThread, SharedOnly, WeakHandle,
};
use tracing_subscriber::EnvFilter;

static LISTENERS: Mutex<Vec<WeakHandle<Widget>>> = parking_lot::const_mutex(Vec::new());

struct Widget {
    name: String,
    pings: AtomicU32,
    _token: LeakToken<Widget>,
}

impl SharedOnly for Widget {
    type Args = String;

    fn construct(key: CreateKey<Self>, name: String) -> Self {
        Widget {
            name,
            pings: AtomicU32::new(0),
            _token: key.into_token(),
        }
    }

    fn leak_token(&self) -> &LeakToken<Self> {
        &self._token
    }

    fn after_construct(this: &Handle<Self>) {
        LISTENERS.lock().push(this.downgrade());
    }
}

impl Widget {
    fn ping(&self, n: u32) {
        let total = self.pings.fetch_add(1, Ordering::Relaxed) + 1;
        tracing::info!(widget = %self.name, n, total, "ping");
    }

    fn rename_notice(&self, to: &'static str) {
        tracing::info!(widget = %self.name, to, "rename requested");
    }
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();
    let _leak_check = LeakCheck::at_exit();

    let mut ui = LoopThread::spawn(&Config::default())?;
    ui.install()?;

    let widget = create::<Widget>("status-bar".to_string());
    post_strong(widget.clone(), Widget::rename_notice, "toolbar")?;

    let workers: Vec<_> = (0..3)
        .map(|t| {
            thread::spawn(move || -> anyhow::Result<()> {
                let listeners = LISTENERS.lock().clone();
                for listener in listeners {
                    for n in 0..5 {
                        post_weak(listener.clone(), Widget::ping, t * 10 + n)?;
                    }
                }
                Ok(())
            })
        })
        .collect();
    for w in workers {
        w.join().map_err(|_| anyhow::anyhow!("worker panicked"))??;
    }

    // Close the widget; any ping still queued is skipped.
    drop(widget);
    LISTENERS.lock().clear();

    ui.shutdown()?;
    Ok(())
}
