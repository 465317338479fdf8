// src/watchdog.rs

//! Per-slot liveness monitoring.
//!
//! A [`Watchdog`] owns a monotonically increasing buffer counter and a
//! background supervision task. The counter is incremented through a
//! cloneable [`SignalCounter`] handle from wherever buffers arrive (any
//! thread, any rate); the supervision task compares two counter snapshots
//! taken one window apart and reports "stalled" or "alive" to the handler
//! once per window.
//!
//! The report is a level signal, not an edge signal: the handler fires for
//! *every* window while the loop runs, so consumers must tolerate repeated
//! identical verdicts. Detection latency for a real stall is between one
//! and two windows, depending on where in the window the feed died.

use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

use thiserror::Error;
use tokio::task::JoinHandle;
use tokio::time::sleep;
use tracing::{debug, trace, warn};

#[derive(Error, Debug)]
pub enum WatchdogError {
    #[error("supervision loop is already running")]
    AlreadyRunning,
}

/// Cloneable handle used to report buffer arrivals.
///
/// `notify` is a single relaxed atomic increment with no other side
/// effects; it never blocks and is safe to call from a high-frequency
/// producer thread.
#[derive(Debug, Clone, Default)]
pub struct SignalCounter(Arc<AtomicU64>);

impl SignalCounter {
    /// Record that one buffer arrived.
    pub fn notify(&self) {
        self.0.fetch_add(1, Ordering::Relaxed);
    }

    /// Total number of buffers seen so far. Diagnostics only; liveness is
    /// always inferred from the difference between two snapshots, never
    /// from the absolute value.
    pub fn total(&self) -> u64 {
        self.0.load(Ordering::Relaxed)
    }

    fn snapshot(&self) -> u64 {
        self.0.load(Ordering::Relaxed)
    }
}

/// Handler invoked once per window with `(stalled, generation)`.
pub type LivenessHandler = Arc<dyn Fn(bool, u64) + Send + Sync>;

/// Liveness monitor for a single media feed.
///
/// Created once per slot and reused across pipeline rebuilds: `stop` /
/// `start` cycle the supervision task, the counter and handler stay.
pub struct Watchdog {
    counter: SignalCounter,
    timeout: Duration,
    handler: LivenessHandler,
    generation: u64,
    worker: Option<Worker>,
}

struct Worker {
    run: Arc<AtomicBool>,
    handle: JoinHandle<()>,
}

impl Watchdog {
    pub fn new(timeout: Duration, handler: impl Fn(bool, u64) + Send + Sync + 'static) -> Self {
        Self {
            counter: SignalCounter::default(),
            timeout,
            handler: Arc::new(handler),
            generation: 0,
            worker: None,
        }
    }

    /// Handle for the buffer producer.
    pub fn counter(&self) -> SignalCounter {
        self.counter.clone()
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    pub fn is_running(&self) -> bool {
        self.worker.is_some()
    }

    /// Generation of the most recent `start`. Reports carry the generation
    /// they were produced under, so consumers can discard reports queued
    /// before a restart.
    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// Start the supervision loop on a background task and return the new
    /// generation.
    ///
    /// Starting an already-running watchdog is refused: a second loop would
    /// share the counter and handler and double every report.
    pub fn start(&mut self) -> Result<u64, WatchdogError> {
        if self.worker.is_some() {
            return Err(WatchdogError::AlreadyRunning);
        }

        self.generation += 1;
        let run = Arc::new(AtomicBool::new(true));
        let handle = tokio::spawn(supervise(
            self.counter.clone(),
            self.timeout,
            Arc::clone(&self.handler),
            self.generation,
            Arc::clone(&run),
        ));

        self.worker = Some(Worker { run, handle });
        Ok(self.generation)
    }

    /// Request termination and wait until the supervision task has fully
    /// exited. No-op when already stopped; safe to call repeatedly.
    ///
    /// The loop's sleep is not pre-empted, so this can take up to one full
    /// window to return.
    pub async fn stop(&mut self) {
        let Some(worker) = self.worker.take() else {
            return;
        };

        worker.run.store(false, Ordering::Release);
        if let Err(err) = worker.handle.await {
            // Only reachable if the task panicked; the loop itself has no
            // cancellation path besides the run flag.
            warn!(error = %err, "supervision task ended abnormally");
        }
    }
}

async fn supervise(
    counter: SignalCounter,
    timeout: Duration,
    handler: LivenessHandler,
    generation: u64,
    run: Arc<AtomicBool>,
) {
    debug!(generation, "supervision loop started");

    while run.load(Ordering::Acquire) {
        let before = counter.snapshot();
        sleep(timeout).await;

        // A stop requested mid-sleep means the slot is being rebuilt; any
        // verdict for this window would be stale on arrival.
        if !run.load(Ordering::Acquire) {
            break;
        }

        let after = counter.snapshot();
        let stalled = after == before;
        trace!(generation, before, after, stalled, "liveness window evaluated");
        handler(stalled, generation);
    }

    debug!(generation, "supervision loop exited");
}
