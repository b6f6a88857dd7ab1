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

//! One-shot sync passes outside the scheduler

use anyhow::Result;
use clap::{Args, Subcommand};
use fr_core::{Config, VenueCode};
use fr_pipelines::{HistoryPipeline, OnlinePipeline};
use fr_venues::adapter_for;
use indicatif::{ProgressBar, ProgressStyle};
use std::str::FromStr;
use std::time::Duration;
use tokio_util::sync::CancellationToken;

#[derive(Args, Debug)]
pub struct SyncCommand {
  #[command(subcommand)]
  target: SyncTarget,
}

#[derive(Subcommand, Debug)]
enum SyncTarget {
  /// History backfill or incremental catch-up
  History {
    /// Venue code; all venues when omitted
    #[arg(long)]
    venue: Option<String>,
  },

  /// Online snapshot of the latest funding per symbol
  Online {
    /// Venue code; all venues when omitted
    #[arg(long)]
    venue: Option<String>,
  },
}

fn venues_from(arg: Option<String>) -> Result<Vec<VenueCode>> {
  match arg {
    Some(code) => Ok(vec![VenueCode::from_str(&code)?]),
    None => Ok(VenueCode::ALL.to_vec()),
  }
}

fn spinner(message: String) -> ProgressBar {
  let bar = ProgressBar::new_spinner();
  bar.set_style(ProgressStyle::default_spinner().template("{spinner:.green} {msg}").unwrap());
  bar.set_message(message);
  bar.enable_steady_tick(Duration::from_millis(120));
  bar
}

pub async fn execute(cmd: SyncCommand, config: Config) -> Result<()> {
  let storage = super::storage(&config).await?;
  let cancel = CancellationToken::new();

  match cmd.target {
    SyncTarget::History { venue } => {
      for venue in venues_from(venue)? {
        let adapter = adapter_for(venue, config.timeout_secs)?;
        let pipeline = HistoryPipeline::new(adapter, storage.clone(), storage.clone());

        let bar = spinner(format!("Syncing {} history", venue));
        let report = pipeline.run(&cancel).await?;
        bar.finish_with_message(format!(
          "{}: {} rows inserted, {} symbols synced, {} fresh, {} failed",
          venue,
          report.rows_inserted,
          report.symbols_synced,
          report.symbols_skipped,
          report.symbols_failed
        ));
      }
    }

    SyncTarget::Online { venue } => {
      for venue in venues_from(venue)? {
        let adapter = adapter_for(venue, config.timeout_secs)?;
        let pipeline = OnlinePipeline::new(adapter, storage.clone(), storage.clone());

        let bar = spinner(format!("Snapshotting {} funding", venue));
        let report = pipeline.run(&cancel).await?;
        bar.finish_with_message(format!(
          "{}: {} created, {} updated, {} failed",
          venue, report.created, report.updated, report.symbols_failed
        ));
      }
    }
  }

  Ok(())
}
