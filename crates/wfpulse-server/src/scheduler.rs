//! Background refresh scheduler.
//!
//! Registers a single recurring collection job on a [`JobScheduler`] at
//! server startup. The job definition is registered exactly once per
//! process; that does not serialize executions — a run that outlasts the
//! cadence can overlap the next firing, and the snapshot's atomic
//! replacement is what keeps readers consistent in that case.

use std::sync::Arc;

use thiserror::Error;
use tokio_cron_scheduler::{Job, JobScheduler, JobSchedulerError};

use wfpulse_ingest::Collector;
use wfpulse_store::SnapshotStore;

#[derive(Debug, Error)]
pub enum SchedulerError {
    #[error("invalid cron expression '{expr}': expected 5 fields (minute hour day month weekday), got {got}")]
    InvalidCron { expr: String, got: usize },

    #[error("scheduler error: {0}")]
    Scheduler(#[from] JobSchedulerError),
}

/// Convert a five-field cron expression (minute hour day month weekday)
/// into the six-field form the runtime scheduler expects, by pinning the
/// seconds field to 0.
fn to_six_field(expr: &str) -> Result<String, SchedulerError> {
    let fields: Vec<&str> = expr.split_whitespace().collect();
    if fields.len() != 5 {
        return Err(SchedulerError::InvalidCron {
            expr: expr.to_owned(),
            got: fields.len(),
        });
    }
    Ok(format!("0 {}", fields.join(" ")))
}

/// Builds and starts the refresh scheduler.
///
/// Returns the running [`JobScheduler`] handle, which must be kept alive
/// for the lifetime of the process; shut it down explicitly to cancel
/// future firings. An in-flight run is never interrupted.
///
/// # Errors
///
/// Returns [`SchedulerError`] if the cron expression is malformed, the
/// scheduler cannot be initialised, or the job cannot be registered. All of
/// these are fatal at startup — the service must not run with a broken
/// schedule.
pub async fn build_scheduler(
    cron_schedule: &str,
    collector: Arc<Collector>,
    store: Arc<SnapshotStore>,
) -> Result<JobScheduler, SchedulerError> {
    let schedule = to_six_field(cron_schedule)?;
    let scheduler = JobScheduler::new().await?;

    let job = Job::new_async(schedule.as_str(), move |_uuid, _lock| {
        let collector = Arc::clone(&collector);
        let store = Arc::clone(&store);

        Box::pin(async move {
            tracing::info!("scheduler: starting refresh run");
            run_refresh(&collector, &store).await;
            tracing::info!("scheduler: refresh run complete");
        })
    })?;

    scheduler.add(job).await?;
    scheduler.start().await?;

    tracing::info!(schedule = cron_schedule, "refresh scheduler started");
    Ok(scheduler)
}

/// Drive one collection and persist the result.
///
/// An empty collection — every platform down — leaves the previous
/// snapshot untouched rather than wiping it.
pub async fn run_refresh(collector: &Collector, store: &SnapshotStore) {
    let records = collector.collect_all().await;

    if records.is_empty() {
        tracing::warn!("refresh produced no records; keeping previous snapshot");
        return;
    }

    match store.save_all(&records) {
        Ok(()) => {
            tracing::info!(records = records.len(), "snapshot refreshed");
        }
        Err(e) => {
            tracing::error!(error = %e, "failed to write refreshed snapshot");
        }
    }
}
