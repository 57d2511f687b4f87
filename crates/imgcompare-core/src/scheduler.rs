//! Single background worker with "latest request wins" semantics.
//!
//! The scheduler holds at most one pending job. Every dispatch bumps a
//! generation counter; the worker skips or abandons any job whose generation
//! is no longer the latest, and completions carrying a stale generation are
//! dropped before the caller sees them. Nothing running on the worker mutates
//! caller state: jobs carry their own copies of the surfaces and return new
//! ones.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::mpsc;
use std::sync::{Arc, Condvar, Mutex, MutexGuard, PoisonError};
use std::thread::JoinHandle;
use std::time::{Duration, Instant};

use tracing::{debug, warn};

use crate::compare::compare_surfaces;
use crate::consts::WORKER_THREAD_NAME;
use crate::error::{CompareError, Result};
use crate::geometry::ViewParams;
use crate::operation::{MatchState, OperationKind, Side};
use crate::surface::ImageSurface;

/// Callback run on the worker after a completion is queued, e.g. to request a repaint.
pub type WakeFn = Arc<dyn Fn() + Send + Sync>;

/// Input of one operation: the view snapshot and both surfaces as of dispatch time.
#[derive(Clone, Debug)]
pub struct Job {
    pub generation: u64,
    pub kind: OperationKind,
    pub params: ViewParams,
    pub left: ImageSurface,
    pub right: ImageSurface,
}

/// Result of one operation.
#[derive(Clone, Debug)]
pub enum Outcome {
    /// New surfaces after a scale or rect update.
    Geometry {
        left: ImageSurface,
        right: ImageSurface,
    },
    Compared(MatchState),
    Nothing,
    /// The worker was lost before the operation completed.
    Failed(String),
}

/// A finished operation, delivered to the caller by [`OperationScheduler::try_completion`].
#[derive(Clone, Debug)]
pub struct Completion {
    pub generation: u64,
    pub kind: OperationKind,
    pub outcome: Outcome,
}

#[derive(Clone, Copy, Debug)]
struct Outstanding {
    generation: u64,
    kind: OperationKind,
    dispatched_at: Instant,
}

#[derive(Default)]
struct Slot {
    pending: Option<Job>,
    shutdown: bool,
}

struct Shared {
    slot: Mutex<Slot>,
    ready: Condvar,
    latest: AtomicU64,
}

impl Shared {
    fn lock(&self) -> MutexGuard<'_, Slot> {
        self.slot.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn is_stale(&self, generation: u64) -> bool {
        self.latest.load(Ordering::Acquire) != generation
    }
}

pub struct OperationScheduler {
    shared: Arc<Shared>,
    result_tx: mpsc::Sender<Completion>,
    result_rx: mpsc::Receiver<Completion>,
    worker: Option<JoinHandle<()>>,
    wake: Option<WakeFn>,
    generation: u64,
    outstanding: Option<Outstanding>,
}

impl Default for OperationScheduler {
    fn default() -> Self {
        Self::new()
    }
}

impl OperationScheduler {
    /// Create a scheduler. The worker thread starts on the first dispatch.
    pub fn new() -> Self {
        let (result_tx, result_rx) = mpsc::channel();
        Self {
            shared: Arc::new(Shared {
                slot: Mutex::new(Slot::default()),
                ready: Condvar::new(),
                latest: AtomicU64::new(0),
            }),
            result_tx,
            result_rx,
            worker: None,
            wake: None,
            generation: 0,
            outstanding: None,
        }
    }

    /// Install a callback the worker runs after queuing each completion.
    ///
    /// Takes effect the next time the worker is started.
    pub fn set_wake(&mut self, wake: WakeFn) {
        self.wake = Some(wake);
    }

    /// Queue `kind` for execution and return its generation.
    ///
    /// Never blocks: a job still waiting in the slot is replaced, and a job
    /// already running is abandoned at its next cancellation check.
    pub fn dispatch(
        &mut self,
        kind: OperationKind,
        params: ViewParams,
        left: ImageSurface,
        right: ImageSurface,
    ) -> Result<u64> {
        self.ensure_worker()?;

        self.generation += 1;
        let generation = self.generation;
        self.shared.latest.store(generation, Ordering::Release);

        {
            let mut slot = self.shared.lock();
            if let Some(replaced) = slot.pending.replace(Job {
                generation,
                kind,
                params,
                left,
                right,
            }) {
                debug!(kind = %replaced.kind, generation = replaced.generation, "Dropped queued operation");
            }
        }
        self.shared.ready.notify_one();

        self.outstanding = Some(Outstanding {
            generation,
            kind,
            dispatched_at: Instant::now(),
        });
        debug!(%kind, generation, "Dispatched operation");
        Ok(generation)
    }

    /// Abandon the outstanding operation, if any. Its completion will be dropped.
    pub fn cancel(&mut self) {
        self.generation += 1;
        self.shared.latest.store(self.generation, Ordering::Release);
        self.shared.lock().pending = None;
        self.outstanding = None;
    }

    /// Next completion of the outstanding operation, without blocking.
    ///
    /// Stale completions are discarded. If the worker died while an operation
    /// was outstanding, a [`Outcome::Failed`] completion is synthesised and the
    /// worker is restarted by the next dispatch.
    pub fn try_completion(&mut self) -> Option<Completion> {
        while let Ok(completion) = self.result_rx.try_recv() {
            if let Some(current) = self.accept(completion) {
                return Some(current);
            }
        }
        self.check_worker_alive()
    }

    /// Block up to `timeout` for the outstanding operation's completion.
    pub fn wait_completion(&mut self, timeout: Duration) -> Option<Completion> {
        let deadline = Instant::now() + timeout;
        loop {
            if let Some(completion) = self.try_completion() {
                return Some(completion);
            }
            self.outstanding?;
            let remaining = deadline.saturating_duration_since(Instant::now());
            if remaining.is_zero() {
                return None;
            }
            // Wake periodically to notice a dead worker.
            match self
                .result_rx
                .recv_timeout(remaining.min(Duration::from_millis(50)))
            {
                Ok(completion) => {
                    if let Some(current) = self.accept(completion) {
                        return Some(current);
                    }
                }
                Err(mpsc::RecvTimeoutError::Timeout) => {}
                Err(mpsc::RecvTimeoutError::Disconnected) => return None,
            }
        }
    }

    /// Kind and age of the outstanding operation.
    pub fn outstanding(&self) -> Option<(OperationKind, Duration)> {
        self.outstanding
            .map(|o| (o.kind, o.dispatched_at.elapsed()))
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn is_worker_running(&self) -> bool {
        self.worker.as_ref().is_some_and(|w| !w.is_finished())
    }

    /// Stop and join the worker. A later dispatch starts a new one.
    pub fn shutdown(&mut self) {
        self.cancel();
        {
            self.shared.lock().shutdown = true;
        }
        self.shared.ready.notify_all();
        if let Some(handle) = self.worker.take() {
            if handle.join().is_err() {
                warn!("Worker thread panicked");
            }
        }
        self.shared.lock().shutdown = false;
    }

    fn accept(&mut self, completion: Completion) -> Option<Completion> {
        match self.outstanding {
            Some(o) if o.generation == completion.generation => {
                self.outstanding = None;
                Some(completion)
            }
            _ => {
                debug!(kind = %completion.kind, generation = completion.generation, "Discarded stale completion");
                None
            }
        }
    }

    fn check_worker_alive(&mut self) -> Option<Completion> {
        let outstanding = self.outstanding?;
        let finished = self.worker.as_ref().map_or(true, |w| w.is_finished());
        if !finished {
            return None;
        }
        if let Some(handle) = self.worker.take() {
            let _ = handle.join();
        }
        warn!(kind = %outstanding.kind, "Worker exited with an operation outstanding");
        self.outstanding = None;
        Some(Completion {
            generation: outstanding.generation,
            kind: outstanding.kind,
            outcome: Outcome::Failed("worker thread exited".into()),
        })
    }

    fn ensure_worker(&mut self) -> Result<()> {
        if self.is_worker_running() {
            return Ok(());
        }
        if let Some(handle) = self.worker.take() {
            let _ = handle.join();
        }

        let shared = Arc::clone(&self.shared);
        let tx = self.result_tx.clone();
        let wake = self.wake.clone();
        let handle = std::thread::Builder::new()
            .name(WORKER_THREAD_NAME.into())
            .spawn(move || worker_loop(shared, tx, wake))
            .map_err(|e| CompareError::WorkerSpawn(e.to_string()))?;
        debug!("Started worker thread");
        self.worker = Some(handle);
        Ok(())
    }
}

impl Drop for OperationScheduler {
    fn drop(&mut self) {
        self.shutdown();
    }
}

fn worker_loop(shared: Arc<Shared>, tx: mpsc::Sender<Completion>, wake: Option<WakeFn>) {
    loop {
        let job = {
            let mut slot = shared.lock();
            loop {
                if slot.shutdown {
                    return;
                }
                if let Some(job) = slot.pending.take() {
                    break job;
                }
                slot = shared
                    .ready
                    .wait(slot)
                    .unwrap_or_else(PoisonError::into_inner);
            }
        };

        let generation = job.generation;
        let kind = job.kind;
        let is_cancelled = || shared.is_stale(generation);
        if is_cancelled() {
            debug!(%kind, generation, "Skipped superseded operation");
            continue;
        }

        let Some(outcome) = execute(job, &is_cancelled) else {
            debug!(%kind, generation, "Abandoned superseded operation");
            continue;
        };

        if tx
            .send(Completion {
                generation,
                kind,
                outcome,
            })
            .is_err()
        {
            return;
        }
        if let Some(wake) = &wake {
            wake();
        }
    }
}

/// Run one job. Returns `None` if it was superseded part-way through.
pub fn execute(job: Job, is_cancelled: &(dyn Fn() -> bool + Sync)) -> Option<Outcome> {
    let Job {
        kind,
        params,
        mut left,
        mut right,
        ..
    } = job;

    match kind {
        OperationKind::NoOp => return Some(Outcome::Nothing),
        // The other side keeps its scaled image but follows the new viewport.
        OperationKind::ScaleOneSide(Side::Left) => {
            left.rescale(&params);
            right.recompute_rects(&params);
        }
        OperationKind::ScaleOneSide(Side::Right) => {
            right.rescale(&params);
            left.recompute_rects(&params);
        }
        OperationKind::ScaleBothSides => {
            left.rescale(&params);
            if is_cancelled() {
                return None;
            }
            right.rescale(&params);
        }
        OperationKind::UpdateRectsOnly => {
            left.recompute_rects(&params);
            right.recompute_rects(&params);
        }
        OperationKind::CompareOnly => {
            return compare_surfaces(&left, &right, is_cancelled).map(Outcome::Compared);
        }
    }

    if is_cancelled() {
        return None;
    }
    Some(Outcome::Geometry { left, right })
}
