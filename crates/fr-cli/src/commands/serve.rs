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

//! The scheduler daemon: two cron jobs per venue until interrupted

use anyhow::Result;
use fr_core::{Config, VenueCode};
use fr_jobs::JobRegistry;
use fr_pipelines::{HistoryPipeline, OnlinePipeline};
use fr_venues::adapter_for;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use tracing::info;

pub async fn execute(config: Config) -> Result<()> {
  let storage = super::storage(&config).await?;

  let cancel = CancellationToken::new();
  let mut registry = JobRegistry::new(cancel.clone()).await?;

  for venue in VenueCode::ALL {
    let adapter = adapter_for(venue, config.timeout_secs)?;
    let history =
      Arc::new(HistoryPipeline::new(adapter.clone(), storage.clone(), storage.clone()));
    let online = Arc::new(OnlinePipeline::new(adapter, storage.clone(), storage.clone()));

    registry
      .register_venue(venue, history, online, &config.history_cron, &config.online_cron)
      .await?;
    info!(
      "Registered {} jobs (history {:?}, online {:?})",
      venue, config.history_cron, config.online_cron
    );
  }

  registry.start().await?;
  info!("Scheduler running; press Ctrl-C to stop");

  tokio::signal::ctrl_c().await?;
  info!("Shutting down");
  registry.shutdown().await?;

  Ok(())
}
