//! Background preview conversion
//!
//! A single worker thread runs the converter. Every request gets a
//! generation number; the worker always converts the newest queued request
//! and the UI drops results that belong to an older generation.

use super::converter::Converter;
use crate::error::{Error, Result};
use log::{debug, info, warn};
use std::fmt;
use std::sync::mpsc::{channel, Receiver, Sender};
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

/// How long dropping the worker waits for a running conversion.
const SHUTDOWN_GRACE: Duration = Duration::from_millis(500);

struct Job {
    generation: u64,
    text: String,
}

struct Completed {
    generation: u64,
    outcome: Result<String>,
}

/// Callback run on the worker thread after each conversion, used to wake
/// the UI.
pub type Notify = Box<dyn Fn() + Send + 'static>;

/// Handle to the preview conversion thread.
pub struct PreviewWorker {
    jobs: Option<Sender<Job>>,
    results: Receiver<Completed>,
    /// Generation of the newest request
    latest: u64,
    /// Generation of the newest result seen by `poll`
    finished: u64,
    handle: Option<JoinHandle<()>>,
}

impl PreviewWorker {
    /// Start the worker thread.
    pub fn spawn(converter: Converter, notify: Notify) -> Result<Self> {
        let (job_tx, job_rx) = channel::<Job>();
        let (result_tx, result_rx) = channel::<Completed>();

        let handle = thread::Builder::new()
            .name("yame-preview".to_string())
            .spawn(move || run(converter, job_rx, result_tx, notify))?;

        Ok(Self {
            jobs: Some(job_tx),
            results: result_rx,
            latest: 0,
            finished: 0,
            handle: Some(handle),
        })
    }

    /// Queue a conversion of `text`, superseding any earlier request.
    ///
    /// Returns the generation number of the request.
    pub fn request(&mut self, text: String) -> Result<u64> {
        self.latest += 1;
        let job = Job {
            generation: self.latest,
            text,
        };
        let sender = self
            .jobs
            .as_ref()
            .ok_or_else(|| Error::Application("preview worker has stopped".to_string()))?;
        sender
            .send(job)
            .map_err(|_| Error::Application("preview worker has stopped".to_string()))?;
        Ok(self.latest)
    }

    /// Whether the newest request has not produced a result yet.
    pub fn is_pending(&self) -> bool {
        self.finished < self.latest
    }

    /// Collect finished conversions without blocking.
    ///
    /// Returns the outcome of the newest request once it is done. Results of
    /// superseded requests are discarded.
    pub fn poll(&mut self) -> Option<Result<String>> {
        let mut newest = None;
        while let Ok(done) = self.results.try_recv() {
            newest = self.accept(done).or(newest);
        }
        newest
    }

    fn accept(&mut self, done: Completed) -> Option<Result<String>> {
        if done.generation < self.latest {
            debug!(
                "Discarding preview generation {} (latest is {})",
                done.generation, self.latest
            );
            return None;
        }
        self.finished = done.generation;
        Some(done.outcome)
    }

    /// Block until the newest request finishes or `timeout` passes.
    #[cfg(test)]
    pub fn wait(&mut self, timeout: std::time::Duration) -> Option<Result<String>> {
        let deadline = std::time::Instant::now() + timeout;
        while self.is_pending() {
            let remaining = deadline.checked_duration_since(std::time::Instant::now())?;
            let done = self.results.recv_timeout(remaining).ok()?;
            if let Some(outcome) = self.accept(done) {
                return Some(outcome);
            }
        }
        None
    }
}

impl fmt::Debug for PreviewWorker {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PreviewWorker")
            .field("latest", &self.latest)
            .field("finished", &self.finished)
            .finish()
    }
}

impl Drop for PreviewWorker {
    fn drop(&mut self) {
        // Closing the job channel ends the worker loop.
        self.jobs.take();
        let Some(handle) = self.handle.take() else {
            return;
        };
        let deadline = Instant::now() + SHUTDOWN_GRACE;
        while !handle.is_finished() {
            if Instant::now() >= deadline {
                // The thread exits on its own once the converter returns.
                warn!("Preview converter still running; detaching worker thread");
                return;
            }
            thread::sleep(Duration::from_millis(10));
        }
        let _ = handle.join();
    }
}

fn run(converter: Converter, jobs: Receiver<Job>, results: Sender<Completed>, notify: Notify) {
    info!("Preview worker started ({})", converter.program());
    while let Ok(mut job) = jobs.recv() {
        // Only the newest queued request is worth converting.
        while let Ok(newer) = jobs.try_recv() {
            job = newer;
        }

        let outcome = converter.convert(&job.text);
        let done = Completed {
            generation: job.generation,
            outcome,
        };
        if results.send(done).is_err() {
            break;
        }
        notify();
    }
    debug!("Preview worker stopped");
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────
