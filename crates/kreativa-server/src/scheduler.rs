//! Background housekeeping jobs.
//!
//! The rate-limit table and session store are in-memory maps that only
//! shrink when swept. Both sweeps run every five minutes.

use tokio_cron_scheduler::{Job, JobScheduler, JobSchedulerError};

use crate::{rate_limit::RateLimiter, session::SessionStore};

const SWEEP_SCHEDULE: &str = "0 */5 * * * *";

/// Builds and starts the scheduler. The returned handle must be kept alive
/// for the lifetime of the process; dropping it stops every job.
///
/// # Errors
///
/// Returns [`JobSchedulerError`] if the scheduler cannot be initialised,
/// a job cannot be registered, or the scheduler fails to start.
pub async fn build_scheduler(
    rate_limiter: RateLimiter,
    sessions: SessionStore,
) -> Result<JobScheduler, JobSchedulerError> {
    let scheduler = JobScheduler::new().await?;

    register_sweep_job(&scheduler, rate_limiter, sessions).await?;

    scheduler.start().await?;
    Ok(scheduler)
}

async fn register_sweep_job(
    scheduler: &JobScheduler,
    rate_limiter: RateLimiter,
    sessions: SessionStore,
) -> Result<(), JobSchedulerError> {
    let job = Job::new_async(SWEEP_SCHEDULE, move |_uuid, _lock| {
        let rate_limiter = rate_limiter.clone();
        let sessions = sessions.clone();

        Box::pin(async move {
            let windows = rate_limiter.sweep().await;
            let expired = sessions.sweep().await;
            if windows > 0 || expired > 0 {
                tracing::debug!(windows, sessions = expired, "scheduler: swept expired entries");
            }
        })
    })?;

    scheduler.add(job).await?;
    Ok(())
}
