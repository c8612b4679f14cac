use std::cmp::Ordering;
use std::collections::BinaryHeap;
use std::thread;
use std::time::{Duration, Instant};

use crossbeam_channel::{unbounded, Receiver, RecvTimeoutError, Sender};

type Job = Box<dyn FnOnce() + Send + 'static>;

enum Command {
    Run(Job),
    RunAfter(Instant, Job),
    Shutdown,
}

/// A serial dispatch queue backed by one named worker thread.
///
/// Immediate jobs run in submission order. Delayed jobs run no earlier than
/// their deadline, ordered by deadline then submission. Jobs on the same
/// queue never run concurrently, which is what lets queue-confined state go
/// unlocked.
pub struct SerialQueue {
    tx: Sender<Command>,
    handle: Option<thread::JoinHandle<()>>,
}

impl SerialQueue {
    pub fn new(name: &str) -> Self {
        let (tx, rx) = unbounded();
        let handle = thread::Builder::new()
            .name(name.into())
            .spawn(move || worker_loop(rx))
            .expect("failed to spawn dispatch thread");
        Self {
            tx,
            handle: Some(handle),
        }
    }

    /// Enqueue a job to run as soon as the worker is free.
    pub fn dispatch(&self, job: impl FnOnce() + Send + 'static) {
        let _ = self.tx.send(Command::Run(Box::new(job)));
    }

    /// Enqueue a job to run no earlier than `delay` from now.
    pub fn dispatch_after(&self, delay: Duration, job: impl FnOnce() + Send + 'static) {
        let deadline = Instant::now() + delay;
        let _ = self.tx.send(Command::RunAfter(deadline, Box::new(job)));
    }
}

impl Drop for SerialQueue {
    fn drop(&mut self) {
        let _ = self.tx.send(Command::Shutdown);
        if let Some(handle) = self.handle.take() {
            // A queue can be dropped from its own worker when the last job
            // releases the owner; joining there would deadlock.
            if handle.thread().id() != thread::current().id() {
                let _ = handle.join();
            }
        }
    }
}

struct Delayed {
    at: Instant,
    seq: u64,
    job: Job,
}

impl PartialEq for Delayed {
    fn eq(&self, other: &Self) -> bool {
        self.at == other.at && self.seq == other.seq
    }
}

impl Eq for Delayed {}

impl PartialOrd for Delayed {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Delayed {
    // Reversed so the earliest deadline sits at the top of the max-heap.
    fn cmp(&self, other: &Self) -> Ordering {
        other
            .at
            .cmp(&self.at)
            .then_with(|| other.seq.cmp(&self.seq))
    }
}

fn worker_loop(rx: Receiver<Command>) {
    let mut pending: BinaryHeap<Delayed> = BinaryHeap::new();
    let mut seq: u64 = 0;

    loop {
        let now = Instant::now();
        while pending.peek().is_some_and(|d| d.at <= now) {
            if let Some(due) = pending.pop() {
                (due.job)();
            }
        }

        let timeout = pending
            .peek()
            .map(|d| d.at.saturating_duration_since(Instant::now()));

        let command = match timeout {
            Some(t) => match rx.recv_timeout(t) {
                Ok(c) => Some(c),
                Err(RecvTimeoutError::Timeout) => None,
                Err(RecvTimeoutError::Disconnected) => break,
            },
            None => match rx.recv() {
                Ok(c) => Some(c),
                Err(_) => break,
            },
        };

        match command {
            Some(Command::Run(job)) => job(),
            Some(Command::RunAfter(at, job)) => {
                pending.push(Delayed { at, seq, job });
                seq += 1;
            }
            Some(Command::Shutdown) => break,
            // Timed out waiting: due jobs run at the top of the loop.
            None => {}
        }
    }
}
