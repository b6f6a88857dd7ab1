/*
 *
 *
 *
 *
 * MIT License
 * Copyright (c) 2025. Dwight J. Browne
 * dwight[-at-]dwightjbrowne[-dot-]com
 *
 *
 * Permission is hereby granted, free of charge, to any person obtaining a copy
 * of this software and associated documentation files (the "Software"), to deal
 * in the Software without restriction, including without limitation the rights
 * to use, copy, modify, merge, publish, distribute, sublicense, and/or sell
 * copies of the Software, and to permit persons to whom the Software is
 * furnished to do so, subject to the following conditions:
 *
 * The above copyright notice and this permission notice shall be included in all
 * copies or substantial portions of the Software.
 *
 * THE SOFTWARE IS PROVIDED "AS IS", WITHOUT WARRANTY OF ANY KIND, EXPRESS OR
 * IMPLIED, INCLUDING BUT NOT LIMITED TO THE WARRANTIES OF MERCHANTABILITY,
 * FITNESS FOR A PARTICULAR PURPOSE AND NONINFRINGEMENT. IN NO EVENT SHALL THE
 * AUTHORS OR COPYRIGHT HOLDERS BE LIABLE FOR ANY CLAIM, DAMAGES OR OTHER
 * LIABILITY, WHETHER IN AN ACTION OF CONTRACT, TORT OR OTHERWISE, ARISING FROM,
 * OUT OF OR IN CONNECTION WITH THE SOFTWARE OR THE USE OR OTHER DEALINGS IN THE
 * SOFTWARE.
 */

//! # fr-jobs
//!
//! Cron-scheduled sync jobs.
//!
//! Two jobs per venue, history and online, each on its own cron expression.
//! A per-job try-lock guard suppresses a trigger while the previous run of
//! the same job is still active; a shared cancellation token stops in-flight
//! work on shutdown without rolling back persisted rows.

use fr_core::VenueCode;
use fr_pipelines::{HistoryPipeline, OnlinePipeline};
use std::sync::Arc;
use thiserror::Error;
use tokio_cron_scheduler::{Job, JobScheduler, JobSchedulerError};
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info};

#[derive(Error, Debug)]
pub enum JobError {
  #[error("Scheduler error: {0}")]
  Scheduler(#[from] JobSchedulerError),
}

pub type JobResult<T> = Result<T, JobError>;

/// Registers and runs the per-venue sync jobs.
pub struct JobRegistry {
  scheduler: JobScheduler,
  cancel: CancellationToken,
}

impl JobRegistry {
  pub async fn new(cancel: CancellationToken) -> JobResult<Self> {
    Ok(Self { scheduler: JobScheduler::new().await?, cancel })
  }

  /// Register the history and online jobs for one venue.
  pub async fn register_venue(
    &self,
    venue: VenueCode,
    history: Arc<HistoryPipeline>,
    online: Arc<OnlinePipeline>,
    history_cron: &str,
    online_cron: &str,
  ) -> JobResult<()> {
    self.add_history_job(venue, history, history_cron).await?;
    self.add_online_job(venue, online, online_cron).await?;
    Ok(())
  }

  async fn add_history_job(
    &self,
    venue: VenueCode,
    pipeline: Arc<HistoryPipeline>,
    cron: &str,
  ) -> JobResult<()> {
    let guard = Arc::new(tokio::sync::Mutex::new(()));
    let cancel = self.cancel.clone();

    let job = Job::new_async(cron, move |_uuid, _scheduler| {
      let pipeline = pipeline.clone();
      let guard = guard.clone();
      let cancel = cancel.clone();

      Box::pin(async move {
        // Suppress the trigger while the previous run is still active.
        let Ok(_running) = guard.try_lock() else {
          debug!("{} history job still running, trigger suppressed", venue);
          return;
        };

        match pipeline.run(&cancel).await {
          Ok(report) => info!(
            "{} history job: {} rows inserted, {} symbols failed",
            venue, report.rows_inserted, report.symbols_failed
          ),
          Err(err) => error!("{} history job failed: {}", venue, err),
        }
      })
    })?;

    self.scheduler.add(job).await?;
    Ok(())
  }

  async fn add_online_job(
    &self,
    venue: VenueCode,
    pipeline: Arc<OnlinePipeline>,
    cron: &str,
  ) -> JobResult<()> {
    let guard = Arc::new(tokio::sync::Mutex::new(()));
    let cancel = self.cancel.clone();

    let job = Job::new_async(cron, move |_uuid, _scheduler| {
      let pipeline = pipeline.clone();
      let guard = guard.clone();
      let cancel = cancel.clone();

      Box::pin(async move {
        let Ok(_running) = guard.try_lock() else {
          debug!("{} online job still running, trigger suppressed", venue);
          return;
        };

        match pipeline.run(&cancel).await {
          Ok(report) => info!(
            "{} online job: {} created, {} updated",
            venue, report.created, report.updated
          ),
          Err(err) => error!("{} online job failed: {}", venue, err),
        }
      })
    })?;

    self.scheduler.add(job).await?;
    Ok(())
  }

  pub async fn start(&self) -> JobResult<()> {
    self.scheduler.start().await?;
    Ok(())
  }

  /// Cancel in-flight work and stop the scheduler. Persisted rows stay.
  pub async fn shutdown(&mut self) -> JobResult<()> {
    self.cancel.cancel();
    self.scheduler.shutdown().await?;
    Ok(())
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[tokio::test]
  async fn test_registry_construction() {
    let registry = JobRegistry::new(CancellationToken::new()).await;
    assert!(registry.is_ok());
  }

  #[tokio::test]
  async fn test_invalid_cron_is_rejected() {
    let job = Job::new_async("not a cron", |_uuid, _scheduler| Box::pin(async {}));
    assert!(job.is_err());
  }

  #[tokio::test]
  async fn test_default_cron_expressions_parse() {
    for cron in [fr_core::config::DEFAULT_HISTORY_CRON, fr_core::config::DEFAULT_ONLINE_CRON] {
      let job = Job::new_async(cron, |_uuid, _scheduler| Box::pin(async {}));
      assert!(job.is_ok(), "cron {:?} should parse", cron);
    }
  }

  #[tokio::test]
  async fn test_shutdown_cancels_token() {
    let cancel = CancellationToken::new();
    let mut registry = JobRegistry::new(cancel.clone()).await.unwrap();
    registry.shutdown().await.unwrap();
    assert!(cancel.is_cancelled());
  }
}
