// SPDX-FileCopyrightText: 2026 Deskhand Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Single-flight task manager.
//!
//! Each job owns a slot guarded by a mutex over `{running, queued}`. A firing
//! starts the job when the slot is idle, queues one invocation when it is
//! running, and is dropped (and counted) when an invocation is already
//! queued.

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Instant;

use deskhand_core::Clock;
use metrics::{counter, histogram};
use tokio_util::sync::CancellationToken;
use tokio_util::task::TaskTracker;
use tracing::{debug, error, info, warn};

use crate::error::CronError;
use crate::job::{Job, JobContext};
use crate::schedule::Schedule;

/// Counters and slot state for one job.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct JobStats {
    pub runs: u64,
    pub failures: u64,
    pub dropped: u64,
    pub running: bool,
    pub queued: bool,
}

struct JobEntry {
    name: String,
    schedule: Schedule,
    job: Arc<dyn Job>,
    slot: Mutex<JobStats>,
}

impl JobEntry {
    fn slot(&self) -> MutexGuard<'_, JobStats> {
        self.slot.lock().unwrap_or_else(|e| e.into_inner())
    }
}

#[derive(Clone)]
struct Runtime {
    clock: Arc<dyn Clock>,
    cancel: CancellationToken,
    tracker: TaskTracker,
}

/// Runs registered jobs on cron schedules with single-flight semantics.
pub struct TaskManager {
    jobs: Mutex<HashMap<String, Arc<JobEntry>>>,
    runtime: Runtime,
    started: AtomicBool,
}

impl TaskManager {
    pub fn new(clock: Arc<dyn Clock>) -> Self {
        Self::with_cancellation(clock, CancellationToken::new())
    }

    /// Use `cancel` as the scheduling context; cancelling it stops the manager.
    pub fn with_cancellation(clock: Arc<dyn Clock>, cancel: CancellationToken) -> Self {
        Self {
            jobs: Mutex::new(HashMap::new()),
            runtime: Runtime {
                clock,
                cancel,
                tracker: TaskTracker::new(),
            },
            started: AtomicBool::new(false),
        }
    }

    fn jobs(&self) -> MutexGuard<'_, HashMap<String, Arc<JobEntry>>> {
        self.jobs.lock().unwrap_or_else(|e| e.into_inner())
    }

    /// Register `job` under `name`. Jobs added after [`start`](Self::start)
    /// begin ticking immediately.
    pub fn schedule(
        &self,
        name: &str,
        spec: &str,
        job: Arc<dyn Job>,
    ) -> Result<(), CronError> {
        let schedule = Schedule::parse(spec).map_err(|reason| CronError::InvalidSchedule {
            name: name.to_string(),
            expr: spec.to_string(),
            reason,
        })?;

        let entry = {
            let mut jobs = self.jobs();
            if jobs.contains_key(name) {
                return Err(CronError::DuplicateJob(name.to_string()));
            }
            let entry = Arc::new(JobEntry {
                name: name.to_string(),
                schedule,
                job,
                slot: Mutex::new(JobStats::default()),
            });
            jobs.insert(name.to_string(), Arc::clone(&entry));
            entry
        };
        info!(job = %name, schedule = %spec, "job scheduled");

        if self.started.load(Ordering::SeqCst) {
            spawn_ticker(entry, self.runtime.clone());
        }
        Ok(())
    }

    /// Begin dispatching every registered job. Calling it twice is a no-op.
    pub fn start(&self) {
        if self.started.swap(true, Ordering::SeqCst) {
            return;
        }
        let entries: Vec<_> = self.jobs().values().cloned().collect();
        info!(jobs = entries.len(), "task manager started");
        for entry in entries {
            spawn_ticker(entry, self.runtime.clone());
        }
    }

    /// Fire `name` now, outside its schedule.
    pub fn trigger(&self, name: &str) -> Result<(), CronError> {
        if self.runtime.cancel.is_cancelled() {
            return Err(CronError::Stopped);
        }
        let entry = self
            .jobs()
            .get(name)
            .cloned()
            .ok_or_else(|| CronError::UnknownJob(name.to_string()))?;
        debug!(job = %name, "manual trigger");
        fire(&entry, &self.runtime);
        Ok(())
    }

    pub fn stats(&self, name: &str) -> Result<JobStats, CronError> {
        self.jobs()
            .get(name)
            .map(|entry| *entry.slot())
            .ok_or_else(|| CronError::UnknownJob(name.to_string()))
    }

    /// Registered job names, sorted.
    pub fn job_names(&self) -> Vec<String> {
        let mut names: Vec<_> = self.jobs().keys().cloned().collect();
        names.sort();
        names
    }

    /// Cancel the scheduling context, discard queued invocations, and wait
    /// for running ones to finish.
    pub async fn stop(&self) {
        for entry in self.jobs().values() {
            entry.slot().queued = false;
        }
        self.runtime.cancel.cancel();
        self.runtime.tracker.close();
        self.runtime.tracker.wait().await;
        info!("task manager stopped");
    }
}

fn spawn_ticker(entry: Arc<JobEntry>, runtime: Runtime) {
    let tracker = runtime.tracker.clone();
    tracker.spawn(async move {
        // Wall-clock schedule mapped onto the monotonic timer.
        let anchor_instant = tokio::time::Instant::now();
        let anchor_time = runtime.clock.now();
        let mut cursor = anchor_time;

        loop {
            let Some(next) = entry.schedule.next_after(cursor) else {
                warn!(job = %entry.name, "schedule has no future occurrence");
                break;
            };
            let offset = (next - anchor_time).to_std().unwrap_or_default();
            let deadline = anchor_instant + offset;

            tokio::select! {
                _ = runtime.cancel.cancelled() => break,
                _ = tokio::time::sleep_until(deadline) => {
                    fire(&entry, &runtime);
                    cursor = next;
                }
            }
        }
        debug!(job = %entry.name, "ticker stopped");
    });
}

fn fire(entry: &Arc<JobEntry>, runtime: &Runtime) {
    let mut slot = entry.slot();
    if !slot.running {
        slot.running = true;
        drop(slot);
        let entry = Arc::clone(entry);
        let runtime_for_task = runtime.clone();
        runtime
            .tracker
            .spawn(async move { drive(entry, runtime_for_task).await });
    } else if !slot.queued {
        slot.queued = true;
        debug!(job = %entry.name, "invocation queued");
    } else {
        slot.dropped += 1;
        drop(slot);
        counter!("deskhand_job_dropped_total", "job" => entry.name.clone()).increment(1);
        warn!(job = %entry.name, "job still running with one queued, firing dropped");
    }
}

/// Runs the job, then any invocation queued meanwhile, then releases the slot.
async fn drive(entry: Arc<JobEntry>, runtime: Runtime) {
    loop {
        let ctx = JobContext {
            job: entry.name.clone(),
            fired_at: runtime.clock.now(),
            cancel: runtime.cancel.child_token(),
        };
        let job = Arc::clone(&entry.job);
        info!(job = %entry.name, "job started");
        let started = Instant::now();

        // A separate task so a panic surfaces as a JoinError.
        let outcome = tokio::spawn(async move { job.run(&ctx).await }).await;

        let elapsed = started.elapsed().as_secs_f64();
        histogram!("deskhand_job_duration_seconds", "job" => entry.name.clone()).record(elapsed);
        counter!("deskhand_job_runs_total", "job" => entry.name.clone()).increment(1);

        let failed = match outcome {
            Ok(Ok(())) => {
                info!(job = %entry.name, elapsed_secs = elapsed, "job finished");
                false
            }
            Ok(Err(e)) => {
                error!(job = %entry.name, error = %e, "job failed");
                true
            }
            Err(e) if e.is_panic() => {
                error!(job = %entry.name, "job panicked");
                true
            }
            Err(e) => {
                warn!(job = %entry.name, error = %e, "job aborted");
                true
            }
        };
        if failed {
            counter!("deskhand_job_failures_total", "job" => entry.name.clone()).increment(1);
        }

        let rerun = {
            let mut slot = entry.slot();
            slot.runs += 1;
            if failed {
                slot.failures += 1;
            }
            if slot.queued && !runtime.cancel.is_cancelled() {
                slot.queued = false;
                true
            } else {
                slot.running = false;
                slot.queued = false;
                false
            }
        };
        if !rerun {
            break;
        }
    }
}
