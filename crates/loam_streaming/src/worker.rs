//! # Worker Pool
//!
//! Fixed set of OS threads draining the job queue.
//!
//! ```text
//!                    ┌──────────┐
//!   Main loop ──Job──▶ worker 0 ├──Completion──▶ Main loop
//!        │           ├──────────┤        ▲
//!        └───Job────▶│ worker N ├────────┘
//!                    └──────────┘
//! ```
//!
//! Workers stop once every job sender is gone and the queue is drained.
//! Dropping the pool joins them.

use std::thread::{self, JoinHandle};

use crossbeam_channel::{Receiver, Sender};

use crate::error::{StreamingError, StreamingResult};
use crate::job::{Completion, Job, JobContext};

/// Background workers for chunk jobs.
#[derive(Debug)]
pub struct WorkerPool {
    handles: Vec<JoinHandle<()>>,
}

impl WorkerPool {
    /// Starts `count` workers (at least one).
    ///
    /// # Errors
    ///
    /// Returns [`StreamingError::WorkerSpawn`] if the OS refuses a thread.
    /// Workers already started shut down once the caller drops the job
    /// sender.
    pub fn spawn(
        count: usize,
        jobs: &Receiver<Job>,
        completions: &Sender<Completion>,
        context: &JobContext,
    ) -> StreamingResult<Self> {
        let count = count.max(1);
        let mut handles = Vec::with_capacity(count);

        for index in 0..count {
            let jobs = jobs.clone();
            let completions = completions.clone();
            let context = context.clone();
            let handle = thread::Builder::new()
                .name(format!("loam-worker-{index}"))
                .spawn(move || worker_loop(index, &jobs, &completions, context))
                .map_err(|e| StreamingError::WorkerSpawn {
                    index,
                    reason: e.to_string(),
                })?;
            handles.push(handle);
        }

        tracing::info!(workers = count, "worker pool started");
        Ok(Self { handles })
    }

    /// Number of worker threads.
    #[must_use]
    pub fn len(&self) -> usize {
        self.handles.len()
    }

    /// Returns true if the pool has no workers.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.handles.is_empty()
    }
}

impl Drop for WorkerPool {
    fn drop(&mut self) {
        for handle in self.handles.drain(..) {
            if handle.join().is_err() {
                tracing::warn!("worker thread panicked");
            }
        }
        tracing::debug!("worker pool stopped");
    }
}

fn worker_loop(
    index: usize,
    jobs: &Receiver<Job>,
    completions: &Sender<Completion>,
    mut context: JobContext,
) {
    tracing::debug!(worker = index, "worker started");
    let mut processed = 0u64;

    while let Ok(job) = jobs.recv() {
        let completion = context.run(job);
        processed += 1;
        if completions.send(completion).is_err() {
            break;
        }
    }

    tracing::debug!(worker = index, processed, "worker stopped");
}
