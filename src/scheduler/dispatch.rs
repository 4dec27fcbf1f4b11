use std::collections::HashMap;
use std::sync::Arc;

use issuesync_av::Transformer;
use tokio::sync::{mpsc, OwnedSemaphorePermit, Semaphore};
use tokio::task::JoinSet;
use tokio_util::sync::CancellationToken;
use tracing::{error, info, warn};

use super::{JobEvent, SchedulerSettings};
use crate::manifest::Manifest;

/// Launch jobs in manifest order and wait for every launched job to end.
///
/// Returns the number of jobs launched. Launched jobs are always a prefix of
/// the manifest. Once `cancel` fires no further job is launched and the
/// running ones are aborted.
pub(super) async fn dispatch(
    manifest: Arc<Manifest>,
    transformer: Arc<dyn Transformer>,
    settings: SchedulerSettings,
    events: mpsc::Sender<JobEvent>,
    cancel: CancellationToken,
) -> usize {
    let semaphore = Arc::new(Semaphore::new(settings.concurrency.max(1)));
    let mut workers = JoinSet::new();
    let mut running: HashMap<tokio::task::Id, usize> = HashMap::new();
    let mut dispatched = 0;
    let mut current_section: Option<&str> = None;

    let jobs = manifest.jobs();
    for (index, job) in jobs.iter().enumerate() {
        let permit = tokio::select! {
            biased;
            _ = cancel.cancelled() => break,
            permit = Arc::clone(&semaphore).acquire_owned() => match permit {
                Ok(permit) => permit,
                Err(_) => break,
            },
        };

        if current_section != Some(job.section.as_str()) {
            info!("Section: {}", job.section);
            current_section = Some(job.section.as_str());
        }

        let handle = workers.spawn(run_job(
            Arc::clone(&manifest),
            index,
            Arc::clone(&transformer),
            events.clone(),
            cancel.clone(),
            permit,
        ));
        running.insert(handle.id(), index);
        dispatched += 1;

        if index + 1 < jobs.len() && !settings.launch_delay.is_zero() {
            tokio::select! {
                biased;
                _ = cancel.cancelled() => break,
                _ = tokio::time::sleep(settings.launch_delay) => {}
            }
        }
    }

    let mut aborted = false;
    loop {
        tokio::select! {
            biased;
            _ = cancel.cancelled(), if !aborted => {
                workers.abort_all();
                aborted = true;
            }
            joined = workers.join_next_with_id() => match joined {
                None => break,
                Some(Ok((id, ()))) => {
                    running.remove(&id);
                }
                Some(Err(err)) => {
                    let index = running.remove(&err.id());
                    if err.is_panic() {
                        if let Some(index) = index {
                            error!("Job {} panicked", index);
                            // Capacity covers one event per job, and a
                            // panicked job never sent its own.
                            let _ = events
                                .send(JobEvent::Failed {
                                    index,
                                    reason: "worker panicked".to_string(),
                                })
                                .await;
                        }
                        cancel.cancel();
                    }
                }
            }
        }
    }

    if aborted {
        warn!("Stopped after launching {} of {} jobs", dispatched, jobs.len());
    }
    dispatched
}

/// A held worker slot.
///
/// Dropping it before the job has reported (a panic, or an abort) cancels the
/// run. The permit is released only after that.
struct Slot {
    cancel: CancellationToken,
    reported: bool,
    _permit: OwnedSemaphorePermit,
}

impl Drop for Slot {
    fn drop(&mut self) {
        if !self.reported {
            self.cancel.cancel();
        }
    }
}

/// Run one job, then report it. The slot is held until after the report.
async fn run_job(
    manifest: Arc<Manifest>,
    index: usize,
    transformer: Arc<dyn Transformer>,
    events: mpsc::Sender<JobEvent>,
    cancel: CancellationToken,
    permit: OwnedSemaphorePermit,
) {
    let mut slot = Slot {
        cancel: cancel.clone(),
        reported: false,
        _permit: permit,
    };

    let job = &manifest.jobs()[index];
    info!("    {}", job.article);

    let event = match transformer.transform(&job.source, &job.destination).await {
        Ok(()) => JobEvent::Completed { index },
        Err(e) => {
            error!("Failed to write {:?}: {}", job.destination, e);
            cancel.cancel();
            JobEvent::Failed {
                index,
                reason: e.to_string(),
            }
        }
    };

    // A closed channel means the barrier has already given up on the run.
    let _ = events.send(event).await;
    slot.reported = true;
}
