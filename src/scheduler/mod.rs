//! Daily jobs fired at fixed wall-clock times.

mod jobs;
mod trigger;

pub use jobs::{JobKind, JobRunner};
pub use trigger::DailyTrigger;

use chrono::{DateTime, Utc};
use chrono_tz::Tz;
use serde::Serialize;
use tokio::sync::watch;
use tokio::task::JoinHandle;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum JobState {
    Idle,
    Firing,
}

/// A running job task and the channel reporting its state.
pub struct JobHandle {
    pub kind: JobKind,
    pub state: watch::Receiver<JobState>,
    pub task: JoinHandle<()>,
}

pub struct Scheduler {
    tz: Tz,
    runner: JobRunner,
    jobs: Vec<(JobKind, DailyTrigger)>,
}

impl Scheduler {
    pub fn new(tz: Tz, runner: JobRunner) -> Self {
        Self {
            tz,
            runner,
            jobs: Vec::new(),
        }
    }

    pub fn with_job(mut self, kind: JobKind, trigger: DailyTrigger) -> Self {
        self.jobs.push((kind, trigger));
        self
    }

    /// Starts one task per job. Tasks exit once `shutdown` turns true or its
    /// sender is dropped.
    pub fn spawn(self, shutdown: watch::Receiver<bool>) -> Vec<JobHandle> {
        self.jobs
            .into_iter()
            .map(|(kind, trigger)| {
                let (state_tx, state_rx) = watch::channel(JobState::Idle);
                let task = tokio::spawn(run_job(
                    kind,
                    trigger,
                    self.tz,
                    self.runner.clone(),
                    state_tx,
                    shutdown.clone(),
                ));
                JobHandle {
                    kind,
                    state: state_rx,
                    task,
                }
            })
            .collect()
    }
}

async fn run_job(
    kind: JobKind,
    trigger: DailyTrigger,
    tz: Tz,
    runner: JobRunner,
    state: watch::Sender<JobState>,
    mut shutdown: watch::Receiver<bool>,
) {
    let mut last_target: Option<DateTime<Utc>> = None;

    loop {
        if *shutdown.borrow() {
            break;
        }

        // Never schedule at or before a time already fired, even if the wall
        // clock lags the timer that woke us.
        let now = Utc::now();
        let from = match last_target {
            Some(last) if last > now => last,
            _ => now,
        };
        let target = trigger.next_fire_after(from, &tz);
        let wait = (target - now).to_std().unwrap_or_default();

        tracing::info!(
            job = %kind,
            at = %target.with_timezone(&tz),
            "Next run scheduled"
        );

        tokio::select! {
            _ = tokio::time::sleep(wait) => {}
            changed = shutdown.changed() => {
                if changed.is_err() || *shutdown.borrow() {
                    break;
                }
                continue;
            }
        }

        state.send_replace(JobState::Firing);
        tracing::info!(job = %kind, "Running scheduled job");
        runner.fire(kind).await;
        state.send_replace(JobState::Idle);

        last_target = Some(target);
    }

    tracing::debug!(job = %kind, "Scheduler task stopped");
}
