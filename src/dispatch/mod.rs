//! Bounded-concurrency encode dispatcher.
//!
//! Submitted jobs go onto an unbounded channel. A single admission task takes
//! them off in order, waits for a permit from the concurrency gate, and spawns
//! the job. Each job holds its permit for the duration of the encode and then
//! hands its [`CompletionReport`] to the configured [`ReportSink`].
//!
//! ```rust,ignore
//! let dispatcher = Dispatcher::new(2, encoder, sink);
//! for job in ladder.plan(size, path) {
//!     dispatcher.submit(job);
//! }
//! dispatcher.shutdown().await;
//! ```

use crate::ladder::EncodeJob;
use crate::notifications::{CompletionReport, ReportSink};
use ladderd_av::Encoder;
use parking_lot::Mutex;
use serde::Serialize;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use tokio::sync::{mpsc, OwnedSemaphorePermit, Semaphore};
use tokio::task::JoinHandle;
use tokio_util::task::TaskTracker;
use tracing::{debug, info, warn};

/// Snapshot of dispatcher load.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct DispatchStats {
    pub limit: usize,
    pub running: usize,
    pub queued: usize,
}

#[derive(Default)]
struct Counters {
    running: AtomicUsize,
    queued: AtomicUsize,
}

/// Handle to a running dispatcher.
pub struct Dispatcher {
    limit: usize,
    sender: Mutex<Option<mpsc::UnboundedSender<EncodeJob>>>,
    admission: Mutex<Option<JoinHandle<()>>>,
    tracker: TaskTracker,
    counters: Arc<Counters>,
}

impl Dispatcher {
    /// Start a dispatcher running at most `limit` encodes at once.
    ///
    /// Must be called from within a Tokio runtime. A limit of 0 is treated as 1.
    pub fn new(limit: usize, encoder: Arc<dyn Encoder>, sink: Arc<dyn ReportSink>) -> Self {
        let limit = limit.max(1);
        let (sender, receiver) = mpsc::unbounded_channel();
        let tracker = TaskTracker::new();
        let counters = Arc::new(Counters::default());

        let admission = tokio::spawn(admit_jobs(
            receiver,
            Arc::new(Semaphore::new(limit)),
            tracker.clone(),
            counters.clone(),
            encoder,
            sink,
        ));

        info!("Dispatcher started (concurrency limit {})", limit);

        Self {
            limit,
            sender: Mutex::new(Some(sender)),
            admission: Mutex::new(Some(admission)),
            tracker,
            counters,
        }
    }

    /// Queue a job. Never waits for the job to start.
    ///
    /// Returns `false` if the dispatcher is shutting down; the job is dropped.
    pub fn submit(&self, job: EncodeJob) -> bool {
        let sender = self.sender.lock();
        let Some(sender) = sender.as_ref() else {
            warn!(
                resolution = %job.resolution,
                output = %job.destination.display(),
                "Dispatcher is shut down, dropping job"
            );
            return false;
        };

        debug!(
            resolution = %job.resolution,
            output = %job.destination.display(),
            "Job queued"
        );

        self.counters.queued.fetch_add(1, Ordering::SeqCst);
        if let Err(mpsc::error::SendError(job)) = sender.send(job) {
            self.counters.queued.fetch_sub(1, Ordering::SeqCst);
            warn!(
                output = %job.destination.display(),
                "Admission loop has stopped, dropping job"
            );
            return false;
        }
        true
    }

    pub fn stats(&self) -> DispatchStats {
        DispatchStats {
            limit: self.limit,
            running: self.counters.running.load(Ordering::SeqCst),
            queued: self.counters.queued.load(Ordering::SeqCst),
        }
    }

    /// Stop accepting jobs, run everything already queued, and wait until
    /// every job has finished and reported.
    pub async fn shutdown(&self) {
        // Dropping the sender lets the admission loop drain and exit.
        drop(self.sender.lock().take());

        let admission = self.admission.lock().take();
        if let Some(handle) = admission {
            if let Err(e) = handle.await {
                warn!("Admission loop ended abnormally: {}", e);
            }
        }

        self.tracker.close();
        self.tracker.wait().await;
        info!("Dispatcher stopped");
    }
}

async fn admit_jobs(
    mut receiver: mpsc::UnboundedReceiver<EncodeJob>,
    gate: Arc<Semaphore>,
    tracker: TaskTracker,
    counters: Arc<Counters>,
    encoder: Arc<dyn Encoder>,
    sink: Arc<dyn ReportSink>,
) {
    while let Some(job) = receiver.recv().await {
        let permit = match gate.clone().acquire_owned().await {
            Ok(permit) => permit,
            Err(_) => {
                warn!("Concurrency gate closed, stopping admission");
                break;
            }
        };

        counters.queued.fetch_sub(1, Ordering::SeqCst);
        let slot = RunningSlot::new(permit, counters.clone());

        tracker.spawn(run_job(job, slot, encoder.clone(), sink.clone()));
    }
}

/// Holds a gate permit and the running count for one job; both are released
/// on drop, including during unwinding.
struct RunningSlot {
    _permit: OwnedSemaphorePermit,
    counters: Arc<Counters>,
}

impl RunningSlot {
    fn new(permit: OwnedSemaphorePermit, counters: Arc<Counters>) -> Self {
        counters.running.fetch_add(1, Ordering::SeqCst);
        Self {
            _permit: permit,
            counters,
        }
    }
}

impl Drop for RunningSlot {
    fn drop(&mut self) {
        self.counters.running.fetch_sub(1, Ordering::SeqCst);
    }
}

async fn run_job(
    job: EncodeJob,
    slot: RunningSlot,
    encoder: Arc<dyn Encoder>,
    sink: Arc<dyn ReportSink>,
) {
    info!(
        resolution = %job.resolution,
        output = %job.destination.display(),
        size = %job.size,
        "Encode started"
    );

    let EncodeJob {
        source,
        destination,
        args,
        resolution,
        ..
    } = job;

    // Run the encode in its own task so a panicking encoder still yields a report.
    let outcome = tokio::spawn(async move { encoder.encode(&args).await }).await;
    drop(slot);

    let report = match outcome {
        Ok(Ok(())) => {
            info!(
                resolution = %resolution,
                output = %destination.display(),
                "Encode succeeded"
            );
            CompletionReport::succeeded(source, destination, resolution)
        }
        Ok(Err(e)) => {
            warn!(
                resolution = %resolution,
                output = %destination.display(),
                error = %e,
                "Encode failed"
            );
            CompletionReport::failed(source, destination, resolution, e.to_string())
        }
        Err(e) => {
            warn!(
                resolution = %resolution,
                output = %destination.display(),
                error = %e,
                "Encode task aborted"
            );
            CompletionReport::failed(
                source,
                destination,
                resolution,
                format!("encoder task aborted: {e}"),
            )
        }
    };

    sink.emit(&report).await;
}
