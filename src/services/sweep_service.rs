//! Daily expiry sweep.
//!
//! Runs at UTC midnight. A failed run is retried after a fixed delay until it
//! succeeds; a sweep that is late only delays archival, since public listings
//! and the sitemap already exclude expired postings on their own.

use std::sync::Arc;
use std::time::Duration;

use anyhow::Result;
use tokio_cron_scheduler::{Job, JobScheduler};
use tracing::{error, info};

use crate::services::lifecycle_service::LifecycleService;
use crate::utils::time::{next_utc_midnight, now};

pub const SWEEP_SCHEDULE: &str = "0 0 0 * * *";

#[derive(Clone)]
pub struct ExpirySweeper {
    lifecycle: LifecycleService,
    retry_delay: Duration,
}

impl ExpirySweeper {
    pub fn new(lifecycle: LifecycleService, retry_delay: Duration) -> Self {
        Self {
            lifecycle,
            retry_delay,
        }
    }

    pub async fn run_once(&self) -> crate::error::Result<u64> {
        self.lifecycle.sweep_expired(now()).await
    }

    /// Keeps retrying until one run completes; returns its archive count.
    pub async fn run_until_success(&self) -> u64 {
        let mut attempt = 1u32;
        loop {
            match self.run_once().await {
                Ok(archived) => {
                    info!(archived, attempt, "Expiry sweep finished");
                    return archived;
                }
                Err(e) => {
                    error!(
                        error = %e,
                        attempt,
                        retry_in_secs = self.retry_delay.as_secs(),
                        "Expiry sweep failed"
                    );
                    attempt += 1;
                    tokio::time::sleep(self.retry_delay).await;
                }
            }
        }
    }
}

/// Registers the sweep on a cron scheduler and starts it.
pub async fn start_sweep_scheduler(sweeper: ExpirySweeper) -> Result<JobScheduler> {
    let scheduler = JobScheduler::new().await?;

    let sweeper = Arc::new(sweeper);
    let job = Job::new_async(SWEEP_SCHEDULE, move |_uuid, _lock| {
        let sweeper = sweeper.clone();
        Box::pin(async move {
            sweeper.run_until_success().await;
        })
    })?;

    scheduler.add(job).await?;
    scheduler.start().await?;

    info!(next_run = %next_utc_midnight(now()), "Expiry sweep scheduled daily at UTC midnight");
    Ok(scheduler)
}
