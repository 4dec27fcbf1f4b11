//! Bounded worker pool for manifest jobs.
//!
//! A single dispatch task walks the manifest in order, acquires one
//! semaphore permit per job and spawns the job as its own task. The caller
//! waits on the completion barrier, which counts one event per job and
//! turns the first failure into a cancellation of the whole run.
//!
//! The pause between launches only nudges files onto the device in playback
//! order. Nothing depends on it for correctness.

mod barrier;
mod dispatch;

use std::path::PathBuf;
use std::sync::Arc;
use std::time::{Duration, Instant};

use issuesync_av::Transformer;
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;

use crate::manifest::Manifest;

/// Resolved scheduler parameters.
#[derive(Debug, Clone)]
pub struct SchedulerSettings {
    /// Maximum number of jobs running at once (at least 1).
    pub concurrency: usize,
    /// Pause after each launch.
    pub launch_delay: Duration,
}

impl Default for SchedulerSettings {
    fn default() -> Self {
        Self {
            concurrency: num_cpus::get(),
            launch_delay: Duration::from_millis(100),
        }
    }
}

/// A job that did not complete.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JobFailure {
    pub index: usize,
    pub destination: PathBuf,
    pub reason: String,
}

impl std::fmt::Display for JobFailure {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "job {} ({}): {}",
            self.index,
            self.destination.display(),
            self.reason
        )
    }
}

/// Why a scheduled run did not complete.
#[derive(Debug, thiserror::Error)]
pub enum PipelineError {
    #[error("Run aborted after {completed} of {expected} jobs, {failure}")]
    JobFailed {
        failure: JobFailure,
        completed: usize,
        expected: usize,
    },

    #[error("Run aborted after {completed} of {expected} jobs, {} failures: {}", .failures.len(), join_failures(.failures))]
    Aborted {
        failures: Vec<JobFailure>,
        completed: usize,
        expected: usize,
    },

    #[error("Completion channel closed after {completed} of {expected} jobs")]
    IncompleteRun { completed: usize, expected: usize },
}

impl PipelineError {
    /// Every job failure reported before the run stopped.
    pub fn failures(&self) -> &[JobFailure] {
        match self {
            PipelineError::JobFailed { failure, .. } => std::slice::from_ref(failure),
            PipelineError::Aborted { failures, .. } => failures,
            PipelineError::IncompleteRun { .. } => &[],
        }
    }
}

fn join_failures(failures: &[JobFailure]) -> String {
    failures
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("; ")
}

/// Outcome of a successful run.
#[derive(Debug, Clone)]
pub struct ScheduleReport {
    pub completed: usize,
    pub elapsed: Duration,
}

/// Completion signal sent by each job exactly once.
#[derive(Debug)]
enum JobEvent {
    Completed { index: usize },
    Failed { index: usize, reason: String },
}

/// Runs every job of a manifest through one transformer.
pub struct Scheduler {
    settings: SchedulerSettings,
    transformer: Arc<dyn Transformer>,
}

impl Scheduler {
    pub fn new(settings: SchedulerSettings, transformer: Arc<dyn Transformer>) -> Self {
        Self {
            settings,
            transformer,
        }
    }

    /// Run the manifest to completion.
    ///
    /// Returns once every job has completed, or after the first failure has
    /// stopped dispatch and every in-flight job has been aborted. Destination
    /// files of jobs that did not complete are removed before returning.
    pub async fn run(&self, manifest: Arc<Manifest>) -> Result<ScheduleReport, PipelineError> {
        let start = Instant::now();
        let expected = manifest.len();
        if expected == 0 {
            tracing::info!("Nothing to transform");
            return Ok(ScheduleReport {
                completed: 0,
                elapsed: start.elapsed(),
            });
        }

        tracing::debug!(
            "Scheduling {} jobs with {} ({} slots, {:?} launch delay)",
            expected,
            self.transformer.name(),
            self.settings.concurrency,
            self.settings.launch_delay
        );

        let cancel = CancellationToken::new();
        // One event per job at most, so sends never wait on the barrier.
        let (events_tx, events_rx) = mpsc::channel(expected);

        let dispatcher = tokio::spawn(dispatch::dispatch(
            Arc::clone(&manifest),
            Arc::clone(&self.transformer),
            self.settings.clone(),
            events_tx,
            cancel.clone(),
        ));

        let completed = barrier::wait(events_rx, &manifest, dispatcher, cancel).await?;

        Ok(ScheduleReport {
            completed,
            elapsed: start.elapsed(),
        })
    }
}
