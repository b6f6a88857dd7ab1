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

//! Online pipeline: one row per (symbol, venue) holding the latest funding
//!
//! Each run loads the venue's existing rows keyed by raw name, fetches the
//! latest observation per active symbol, and commits updates then creates in
//! a single transaction. Existing ids are preserved; raw names that collide
//! after normalization are rejected past the first.

use crate::batch::fan_out;
use crate::error::{PipelineError, PipelineResult};
use crate::retry::retry_transient;
use bigdecimal::BigDecimal;
use fr_core::{is_valid_interval, normalize_symbol, now_ms};
use fr_database::{
  ExchangeStore, FundingOnline, FundingOnlineUpdate, NewFundingOnline, OnlineStore,
};
use fr_venues::{FundingObservation, VenueAdapter};
use std::collections::{HashMap, HashSet};
use std::sync::Arc;
use tokio::sync::Semaphore;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, warn};
use uuid::Uuid;

#[derive(Debug, Default, Clone)]
pub struct OnlineSyncReport {
  pub created: usize,
  pub updated: usize,
  pub symbols_skipped: usize,
  pub symbols_failed: usize,
  pub failed_symbols: Vec<String>,
}

/// The latest observation for one symbol, before reconciliation.
#[derive(Debug)]
struct SymbolSnapshot {
  name: String,
  symbol_interval: Option<i32>,
  observation: FundingObservation,
}

/// Per-venue online snapshot pipeline.
pub struct OnlinePipeline {
  adapter: Arc<dyn VenueAdapter>,
  exchanges: Arc<dyn ExchangeStore>,
  online: Arc<dyn OnlineStore>,
  semaphore: Arc<Semaphore>,
}

impl OnlinePipeline {
  pub fn new(
    adapter: Arc<dyn VenueAdapter>,
    exchanges: Arc<dyn ExchangeStore>,
    online: Arc<dyn OnlineStore>,
  ) -> Self {
    let semaphore = Arc::new(Semaphore::new(adapter.online_parallelism()));
    Self { adapter, exchanges, online, semaphore }
  }

  /// One scheduled job run. Venue-API and database failures are logged and
  /// yield an empty report; partial commits are never retried.
  pub async fn run(&self, cancel: &CancellationToken) -> PipelineResult<OnlineSyncReport> {
    match self.run_inner(cancel).await {
      Ok(report) => Ok(report),
      Err(PipelineError::Cancelled) => Err(PipelineError::Cancelled),
      Err(err) => {
        error!("Online sync for {} failed: {}", self.adapter.venue(), err);
        Ok(OnlineSyncReport::default())
      }
    }
  }

  async fn run_inner(&self, cancel: &CancellationToken) -> PipelineResult<OnlineSyncReport> {
    let venue = self.adapter.venue();

    let Some(exchange) = self.exchanges.get_by_code(venue).await? else {
      warn!("No exchanges row for {}, skipping online sync", venue);
      return Ok(OnlineSyncReport::default());
    };

    let fetched_at = now_ms();

    let existing: HashMap<String, FundingOnline> = self
      .online
      .get_for_exchange(exchange.id)
      .await?
      .into_iter()
      .map(|row| (row.name.clone(), row))
      .collect();

    let adapter = self.adapter.as_ref();
    let pairs = retry_transient(cancel, move || async move {
      adapter.list_online_perpetuals().await.map_err(PipelineError::from)
    })
    .await?;

    let mut report = OnlineSyncReport::default();
    let items: Vec<(String, Option<i32>)> = pairs
      .into_iter()
      .filter_map(|pair| {
        pair.name().map(|name| (name.to_string(), pair.interval_hours()))
      })
      .collect();

    let outcome =
      fan_out(items, self.semaphore.clone(), self.adapter.online_parallelism(), cancel, {
        |name, symbol_interval| async move {
          let symbol = name.as_str();
          let observation = retry_transient(cancel, move || async move {
            adapter.latest(symbol).await.map_err(PipelineError::from)
          })
          .await?;

          if observation.funding_time == 0 {
            return Err(PipelineError::Validation(format!("zero funding time for {}", name)));
          }

          Ok(SymbolSnapshot { name, symbol_interval, observation })
        }
      })
      .await;

    for (symbol, err) in outcome.failures {
      match err {
        PipelineError::Cancelled => return Err(PipelineError::Cancelled),
        PipelineError::EmptyResult(_) => {
          warn!("No online observation for {}: {}", symbol, err);
          report.symbols_skipped += 1;
        }
        other => {
          warn!("Failed to snapshot {}: {}", symbol, other);
          report.symbols_failed += 1;
          report.failed_symbols.push(symbol);
        }
      }
    }

    let mut updates: Vec<(Uuid, FundingOnlineUpdate)> = Vec::new();
    let mut creates: Vec<NewFundingOnline> = Vec::new();
    let mut seen_symbols: HashSet<String> = HashSet::new();

    for snapshot in outcome.success {
      let symbol = normalize_symbol(&snapshot.name);

      let Some(interval_hours) =
        snapshot.symbol_interval.or(snapshot.observation.interval_hours)
      else {
        warn!("No funding interval source for {}, dropping", snapshot.name);
        report.symbols_failed += 1;
        report.failed_symbols.push(snapshot.name);
        continue;
      };
      if !is_valid_interval(interval_hours) {
        warn!("Interval {}h out of range for {}, dropping", interval_hours, snapshot.name);
        report.symbols_failed += 1;
        report.failed_symbols.push(snapshot.name);
        continue;
      }

      // Two raw names collapsing to one symbol would break the unique keys;
      // the first processed name wins.
      if !seen_symbols.insert(symbol.clone()) {
        warn!("Duplicate normalized symbol {} (raw {}), rejecting", symbol, snapshot.name);
        report.symbols_skipped += 1;
        continue;
      }

      match existing.get(&snapshot.name) {
        Some(row) => updates.push((
          row.id,
          FundingOnlineUpdate {
            name: snapshot.name,
            interval_hours,
            rate: snapshot.observation.rate,
            open_interest: BigDecimal::from(0),
            ts_rate: snapshot.observation.funding_time,
            fetched_at,
          },
        )),
        None => creates.push(NewFundingOnline {
          id: Uuid::new_v4(),
          exchange_id: exchange.id,
          symbol,
          name: snapshot.name,
          interval_hours,
          rate: snapshot.observation.rate,
          open_interest: BigDecimal::from(0),
          ts_rate: snapshot.observation.funding_time,
          fetched_at,
        }),
      }
    }

    let (updated, created) = self.online.commit_snapshot(updates, creates).await?;
    report.updated = updated;
    report.created = created;

    debug!(
      "Online sync for {}: {} updated, {} created, {} failed",
      venue, report.updated, report.created, report.symbols_failed
    );
    Ok(report)
  }
}
