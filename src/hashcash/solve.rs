use std::fmt::Write as _;
use std::sync::Arc;
use std::thread;

use flume::{Receiver, Sender};
use sha2::{Digest, Sha256};

use super::{prefix_leading_zeros, Hashcash};
use crate::error::HashcashError;
use crate::stream::{NonceSource, StopFlag};

impl Hashcash {
    /// Brute-force the counter until the stamp is solved and return the canonical string.
    ///
    /// Starts from the current counter, so an already-solved stamp is returned unchanged.
    /// Expected work doubles with each extra bit of difficulty; run this off any
    /// latency-sensitive thread.
    pub fn solve(&mut self) -> Result<String, HashcashError> {
        self.ensure_solvable()?;
        let base = prefix_hasher(&self.prefix());
        let mut buf = String::with_capacity(16);
        let mut counter = self.counter;
        while !counter_meets(&base, &mut buf, counter, self.difficulty) {
            counter = counter
                .checked_add(1)
                .ok_or(HashcashError::CounterOverflow)?;
        }
        self.counter = counter;
        Ok(self.encode())
    }

    /// Solve with `threads` workers pulling counters from a shared source.
    ///
    /// Any hit found first wins, so the resulting counter is not necessarily the
    /// smallest solving one.
    pub fn solve_parallel(&mut self, threads: usize) -> Result<String, HashcashError> {
        self.ensure_solvable()?;
        if threads <= 1 {
            return self.solve();
        }

        let base = Arc::new(prefix_hasher(&self.prefix()));
        let nonce_source = Arc::new(NonceSource::new(self.counter));
        let stop = Arc::new(StopFlag::new());
        let (tx, rx): (Sender<u64>, Receiver<u64>) = flume::bounded(threads);
        let mut joins = Vec::with_capacity(threads);

        for _ in 0..threads {
            let worker_base = base.clone();
            let worker_nonce = nonce_source.clone();
            let worker_stop = stop.clone();
            let worker_tx = tx.clone();
            let difficulty = self.difficulty;
            let join = thread::spawn(move || {
                worker_loop(&worker_base, difficulty, &worker_nonce, &worker_stop, &worker_tx);
            });
            joins.push(join);
        }
        drop(tx);

        let hit = rx.recv();
        stop.force_stop();
        let panicked = join_handles(joins);

        match hit {
            Ok(counter) => {
                self.counter = counter;
                Ok(self.encode())
            }
            Err(_) if panicked > 0 => Err(HashcashError::SolverFailed(format!(
                "{panicked} worker(s) panicked"
            ))),
            Err(_) => Err(HashcashError::CounterOverflow),
        }
    }

    fn ensure_solvable(&self) -> Result<(), HashcashError> {
        if self.resource.is_empty() || self.salt.is_empty() {
            return Err(HashcashError::EmptyHashcash);
        }
        Ok(())
    }
}

fn worker_loop(
    base: &Sha256,
    difficulty: u32,
    nonce_source: &NonceSource,
    stop: &StopFlag,
    tx: &Sender<u64>,
) {
    let mut buf = String::with_capacity(16);
    while !stop.should_stop() {
        let Some(counter) = nonce_source.fetch() else {
            break;
        };
        if counter_meets(base, &mut buf, counter, difficulty) {
            let _ = tx.send(counter);
            stop.force_stop();
            break;
        }
    }
}

/// Join every worker and return how many panicked.
fn join_handles(joins: Vec<thread::JoinHandle<()>>) -> usize {
    joins
        .into_iter()
        .map(|handle| handle.join())
        .filter(Result::is_err)
        .count()
}

fn prefix_hasher(prefix: &str) -> Sha256 {
    let mut hasher = Sha256::new();
    hasher.update(prefix.as_bytes());
    hasher
}

/// Hash `prefix || hex(counter)` by resuming a hasher that has already absorbed the prefix.
#[inline]
fn counter_meets(base: &Sha256, buf: &mut String, counter: u64, difficulty: u32) -> bool {
    buf.clear();
    let _ = write!(buf, "{counter:x}");
    let mut hasher = base.clone();
    hasher.update(buf.as_bytes());
    let digest: [u8; 32] = hasher.finalize().into();
    prefix_leading_zeros(&digest) >= difficulty
}
