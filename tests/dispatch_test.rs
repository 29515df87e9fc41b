use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Barrier};
use std::thread;

use parking_lot::Mutex;
use sharedloop::{
    channel, create, Config, CreateKey, DispatchError, Dispatcher, EventLoop, Handle,
    LeakToken, LoopThread, SharedOnly, Task,
};

type Ledger = Arc<Mutex<Vec<String>>>;

struct Account {
    ledger: Ledger,
    _token: LeakToken<Account>,
}

impl SharedOnly for Account {
    type Args = Ledger;

    fn construct(key: CreateKey<Self>, ledger: Ledger) -> Self {
        Account {
            ledger,
            _token: key.into_token(),
        }
    }

    fn leak_token(&self) -> &LeakToken<Self> {
        &self._token
    }
}

impl Account {
    fn deposit(&self, (who, amount): (&'static str, u32)) {
        self.ledger.lock().push(format!("{who}:{amount}"));
    }
}

#[test]
fn strong_post_outlives_every_other_reference() {
    let (queue, mut event_loop) = channel();
    let d = Dispatcher::new(queue);
    let ledger = Ledger::default();

    let observer = {
        let account = create::<Account>(Arc::clone(&ledger));
        let weak = account.downgrade();
        let d = d.clone();
        // Producer thread schedules, then drops its only handle.
        thread::spawn(move || {
            d.post_strong(account, Account::deposit, ("alice", 10))
                .expect("loop open");
        })
        .join()
        .expect("producer");
        weak
    };

    assert!(observer.is_alive(), "task keeps the account alive");
    assert!(ledger.lock().is_empty());

    assert_eq!(event_loop.run_pending(), 1);
    assert_eq!(*ledger.lock(), vec!["alice:10".to_string()]);
    assert!(!observer.is_alive(), "released once the task ran");
}

#[test]
fn fifo_per_producer_with_many_producers() {
    const PRODUCERS: usize = 4;
    const PER_PRODUCER: usize = 250;

    let lt = LoopThread::spawn(&Config::default()).expect("spawn loop");
    let order = Arc::new(Mutex::new(Vec::with_capacity(PRODUCERS * PER_PRODUCER)));
    let start = Arc::new(Barrier::new(PRODUCERS));

    let producers: Vec<_> = (0..PRODUCERS)
        .map(|p| {
            let d = lt.dispatcher();
            let order = Arc::clone(&order);
            let start = Arc::clone(&start);
            thread::spawn(move || {
                start.wait();
                for i in 0..PER_PRODUCER {
                    let order = Arc::clone(&order);
                    d.post(move || order.lock().push((p, i))).expect("loop open");
                }
            })
        })
        .collect();
    for p in producers {
        p.join().expect("producer");
    }
    lt.shutdown().expect("clean shutdown");

    let order = order.lock();
    assert_eq!(order.len(), PRODUCERS * PER_PRODUCER);
    for p in 0..PRODUCERS {
        let seq: Vec<usize> = order
            .iter()
            .filter(|(who, _)| *who == p)
            .map(|(_, i)| *i)
            .collect();
        assert_eq!(seq, (0..PER_PRODUCER).collect::<Vec<_>>(), "producer {p}");
    }
}

#[test]
fn t1_t2_t3_run_in_order() {
    let (queue, mut event_loop) = channel();
    let d = Dispatcher::new(queue);
    let order = Arc::new(Mutex::new(Vec::new()));

    for name in ["t1", "t2", "t3"] {
        let order = Arc::clone(&order);
        d.post(move || order.lock().push(name)).expect("loop open");
    }
    event_loop.run_pending();
    assert_eq!(*order.lock(), vec!["t1", "t2", "t3"]);
}

#[test]
fn weak_post_runs_exactly_once_with_captured_args() {
    let lt = LoopThread::spawn(&Config::default()).expect("spawn loop");
    let ledger = Ledger::default();
    let account: Handle<Account> = create(Arc::clone(&ledger));

    lt.dispatcher()
        .post_weak(account.downgrade(), Account::deposit, ("bob", 3))
        .expect("loop open");
    lt.shutdown().expect("clean shutdown");

    assert_eq!(*ledger.lock(), vec!["bob:3".to_string()]);
    assert_eq!(account.strong_count(), 1);
}

/// An event loop that records instead of running, to check the seam.
#[derive(Default)]
struct Recording {
    queued: Mutex<Vec<Task>>,
    closed: AtomicUsize,
}

impl EventLoop for Recording {
    fn enqueue(&self, task: Task) -> Result<(), DispatchError> {
        if self.closed.load(Ordering::SeqCst) > 0 {
            return Err(DispatchError::LoopClosed);
        }
        self.queued.lock().push(task);
        Ok(())
    }
}

#[test]
fn dispatcher_works_over_any_event_loop() {
    let rec = Arc::new(Recording::default());
    let d = Dispatcher::from_arc(rec.clone());
    let hits = Arc::new(AtomicUsize::new(0));

    let h = Arc::clone(&hits);
    d.post(move || {
        h.fetch_add(1, Ordering::SeqCst);
    })
    .expect("accepted");
    assert_eq!(hits.load(Ordering::SeqCst), 0, "posting never runs the task");

    let tasks: Vec<Task> = std::mem::take(&mut *rec.queued.lock());
    tasks.into_iter().for_each(Task::run);
    assert_eq!(hits.load(Ordering::SeqCst), 1);

    rec.closed.store(1, Ordering::SeqCst);
    assert_eq!(d.post(|| {}), Err(DispatchError::LoopClosed));
}
