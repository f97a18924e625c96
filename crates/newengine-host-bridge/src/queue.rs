use crate::command::{CommandRecord, Payload};
use crate::config::PoolConfig;

use crossbeam_channel::{Receiver, Sender};
use parking_lot::Mutex;
use std::sync::atomic::{AtomicU64, Ordering};

/// Host -> engine command queue with a recycled record pool.
///
/// Producer side: any host callback may `enqueue`; it never blocks on the
/// consumer and never fails.
/// Consumer side: only the engine thread drains. The first thread to drain
/// claims the queue; a drain from any other thread is a bug (panic in debug,
/// `error!` in release).
pub struct CommandQueue {
    tx: Sender<Box<CommandRecord>>,
    rx: Receiver<Box<CommandRecord>>,
    pool: Mutex<Vec<Box<CommandRecord>>>,
    max_retained: usize,
    consumer_guard: ConsumerGuard,
    stats: QueueCounters,
}

#[derive(Default)]
struct QueueCounters {
    enqueued: AtomicU64,
    dispatched: AtomicU64,
    fresh_allocations: AtomicU64,
}

/// Snapshot of queue counters.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct QueueStats {
    pub enqueued: u64,
    pub dispatched: u64,
    pub fresh_allocations: u64,
    pub pending: usize,
    pub pooled: usize,
}

impl CommandQueue {
    pub fn new(cfg: &PoolConfig) -> Self {
        let (tx, rx) = crossbeam_channel::unbounded();
        let max_retained = cfg.max_retained.max(cfg.preallocate);
        let mut pool = Vec::with_capacity(cfg.preallocate);
        pool.extend((0..cfg.preallocate).map(|_| Box::<CommandRecord>::default()));

        Self {
            tx,
            rx,
            pool: Mutex::new(pool),
            max_retained,
            consumer_guard: ConsumerGuard::new(),
            stats: QueueCounters::default(),
        }
    }

    /// Take a record from the pool (or allocate), fill it and append it.
    #[inline]
    pub fn enqueue(&self, code: u16, payload: Payload) {
        let mut rec = self.acquire();
        rec.fill(code, payload);
        self.stats.enqueued.fetch_add(1, Ordering::Relaxed);

        // The queue owns its receiver, so the channel can't be disconnected.
        if let Err(e) = self.tx.send(rec) {
            log::error!(target: "bridge", "command queue disconnected, dropping code {}", e.0.code());
        }
    }

    /// Pop records until the queue is empty, handing each to `f`.
    ///
    /// Each record is reset and recycled right after `f` returns. Never waits
    /// for new commands.
    pub fn drain<F: FnMut(&CommandRecord)>(&self, mut f: F) -> usize {
        self.consumer_guard.assert_or_claim();

        let mut n = 0usize;
        while let Ok(mut rec) = self.rx.try_recv() {
            f(&rec);
            rec.reset();
            self.recycle(rec);
            n += 1;
        }

        if n > 0 {
            self.stats.dispatched.fetch_add(n as u64, Ordering::Relaxed);
        }
        n
    }

    #[inline]
    pub fn pending_len(&self) -> usize {
        self.rx.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.rx.is_empty()
    }

    #[inline]
    pub fn pooled_len(&self) -> usize {
        self.pool.lock().len()
    }

    pub fn stats(&self) -> QueueStats {
        QueueStats {
            enqueued: self.stats.enqueued.load(Ordering::Relaxed),
            dispatched: self.stats.dispatched.load(Ordering::Relaxed),
            fresh_allocations: self.stats.fresh_allocations.load(Ordering::Relaxed),
            pending: self.pending_len(),
            pooled: self.pooled_len(),
        }
    }

    #[inline]
    fn acquire(&self) -> Box<CommandRecord> {
        if let Some(rec) = self.pool.lock().pop() {
            return rec;
        }

        let n = self.stats.fresh_allocations.fetch_add(1, Ordering::Relaxed) + 1;
        if n.is_power_of_two() {
            log::debug!(target: "bridge", "record pool empty, fresh allocations so far: {n}");
        }
        Box::default()
    }

    #[inline]
    fn recycle(&self, rec: Box<CommandRecord>) {
        let mut pool = self.pool.lock();
        if pool.len() < self.max_retained {
            pool.push(rec);
        }
    }
}

struct ConsumerGuard {
    owner: AtomicU64,
}

impl ConsumerGuard {
    #[inline]
    fn new() -> Self {
        Self { owner: AtomicU64::new(0) }
    }

    #[inline]
    fn assert_or_claim(&self) {
        let id = consumer_id();
        let cur = self.owner.load(Ordering::Acquire);

        if cur == 0 {
            if let Err(prev) = self.owner.compare_exchange(0, id, Ordering::AcqRel, Ordering::Acquire) {
                Self::check(prev, id);
            }
            return;
        }

        Self::check(cur, id);
    }

    #[inline]
    fn check(owner: u64, id: u64) {
        if owner == id {
            return;
        }
        if cfg!(debug_assertions) {
            panic!("CommandQueue single-consumer violation: drained from a second thread");
        }
        log::error!(target: "bridge", "CommandQueue drained from a second thread");
    }
}

#[inline]
fn consumer_id() -> u64 {
    // Stable per-thread id, only used to detect a second consumer.
    use std::hash::{Hash, Hasher};
    let tid = std::thread::current().id();
    let mut h = std::collections::hash_map::DefaultHasher::new();
    tid.hash(&mut h);
    let v = h.finish();
    if v == 0 { 1 } else { v }
}
