use std::path::Path;

use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

use super::{JobEvent, JobFailure, PipelineError};
use crate::manifest::Manifest;

/// Wait for one completion per job.
///
/// On the first failure, cancel the run, wait for the dispatcher to wind
/// down, collect whatever else was reported, and remove the destinations of
/// every launched job that did not complete.
pub(super) async fn wait(
    mut events: mpsc::Receiver<JobEvent>,
    manifest: &Manifest,
    dispatcher: JoinHandle<usize>,
    cancel: CancellationToken,
) -> Result<usize, PipelineError> {
    let expected = manifest.len();
    let mut done = vec![false; expected];
    let mut completed = 0;
    let mut failures = Vec::new();

    while completed < expected {
        match events.recv().await {
            Some(JobEvent::Completed { index }) => {
                done[index] = true;
                completed += 1;
            }
            Some(JobEvent::Failed { index, reason }) => {
                failures.push(failure(manifest, index, reason));
                break;
            }
            None => break,
        }
    }

    if completed == expected {
        // Every job reported, so the dispatcher is only reaping tasks.
        if let Err(e) = dispatcher.await {
            warn!("Dispatcher ended abnormally: {}", e);
        }
        return Ok(completed);
    }

    cancel.cancel();
    let dispatched = match dispatcher.await {
        Ok(dispatched) => dispatched,
        Err(e) => {
            warn!("Dispatcher ended abnormally: {}", e);
            expected
        }
    };

    // The dispatcher has joined every job, so all remaining events are queued.
    while let Ok(event) = events.try_recv() {
        match event {
            JobEvent::Completed { index } => {
                done[index] = true;
                completed += 1;
            }
            JobEvent::Failed { index, reason } => {
                failures.push(failure(manifest, index, reason));
            }
        }
    }

    for job in manifest.jobs().iter().take(dispatched) {
        if !done[job.sequence_index] {
            remove_partial(&job.destination);
        }
    }

    let err = match failures.len() {
        0 => PipelineError::IncompleteRun {
            completed,
            expected,
        },
        1 => PipelineError::JobFailed {
            failure: failures.remove(0),
            completed,
            expected,
        },
        _ => PipelineError::Aborted {
            failures,
            completed,
            expected,
        },
    };
    Err(err)
}

fn failure(manifest: &Manifest, index: usize, reason: String) -> JobFailure {
    JobFailure {
        index,
        destination: manifest.jobs()[index].destination.clone(),
        reason,
    }
}

fn remove_partial(path: &Path) {
    match std::fs::remove_file(path) {
        Ok(()) => debug!("Removed unfinished {:?}", path),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
        Err(e) => warn!("Failed to remove unfinished {:?}: {}", path, e),
    }
}
