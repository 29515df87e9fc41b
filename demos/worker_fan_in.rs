//! # Example: worker_fan_in
//!
//! Worker threads compute results and hand them back to a single-threaded
//! aggregator, which only ever runs on the loop thread. Each worker gets its
//! own scoped temporary directory for scratch files.
//!
//! ## Flow
//! ```text
//! worker i ─► TempDir::create_with(cfg) ─► write scratch ─► post_strong(agg, Aggregator::add, (i, sum))
//!          └─► drop(TempDir)  (directory removed, warning if not empty)
//! loop thread ─► Aggregator::add
//! main ─► oneshot result back from the loop
//! ```
//!
//! ## Run
//! ```bash
//! cargo run --example worker_fan_in
//! ```

use std::fs;
use std::thread;

use sharedloop::{
    create, parse_string, to_string, Config, CreateKey, LeakCheck, LeakToken, LoopThread,
    SharedOnly, TempDir,
};
use tokio::sync::oneshot;

struct Aggregator {
    // Only locked from the loop thread.
    totals: parking_lot::Mutex<Vec<(usize, u64)>>,
    _token: LeakToken<Aggregator>,
}

impl SharedOnly for Aggregator {
    type Args = ();

    fn construct(key: CreateKey<Self>, _: ()) -> Self {
        Aggregator {
            totals: parking_lot::Mutex::new(Vec::new()),
            _token: key.into_token(),
        }
    }

    fn leak_token(&self) -> &LeakToken<Self> {
        &self._token
    }
}

impl Aggregator {
    fn add(&self, (worker, sum): (usize, u64)) {
        self.totals.lock().push((worker, sum));
    }

    fn report(&self, reply: oneshot::Sender<Vec<(usize, u64)>>) {
        let mut totals = self.totals.lock().clone();
        totals.sort_unstable();
        let _ = reply.send(totals);
    }
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt().init();
    let _leak_check = LeakCheck::at_exit();

    let cfg = Config {
        temp_prefix: "fanin_".to_string(),
        ..Config::default()
    };
    let ui = LoopThread::spawn(&cfg)?;
    let aggregator = create::<Aggregator>(());

    let workers: Vec<_> = (0..4usize)
        .map(|i| {
            let d = ui.dispatcher();
            let agg = aggregator.clone();
            let cfg = cfg.clone();
            thread::spawn(move || -> anyhow::Result<()> {
                let scratch = TempDir::create_with(&cfg)?;
                let file = scratch.path().join("partial");
                let sum: u64 = (1..=100u64).map(|n| n * (i as u64 + 1)).sum();
                fs::write(&file, to_string(&sum))?;

                let read_back = fs::read_to_string(&file)?;
                let sum = parse_string::<u64>(&read_back)
                    .ok_or_else(|| anyhow::anyhow!("corrupt partial in {}", file.display()))?;
                fs::remove_file(&file)?;

                d.post_strong(agg, Aggregator::add, (i, sum))?;
                Ok(())
            })
        })
        .collect();
    for w in workers {
        w.join().map_err(|_| anyhow::anyhow!("worker panicked"))??;
    }

    let (tx, rx) = oneshot::channel();
    ui.dispatcher()
        .post_strong(aggregator.clone(), Aggregator::report, tx)?;
    let totals = rx.blocking_recv()?;
    for (worker, sum) in &totals {
        println!("worker {worker}: {sum}");
    }

    drop(aggregator);
    ui.shutdown()?;
    Ok(())
}
