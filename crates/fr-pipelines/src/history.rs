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

//! History pipeline: cold-start backfill and incremental catch-up
//!
//! When a venue has no stored history the pipeline backfills every symbol
//! from its launch in sequential batches. Otherwise each symbol takes exactly
//! one action per tick: skip while the next event is not due, append the
//! single latest observation, or fill a gap of missed events. Newly listed
//! symbols get the same deep backfill as cold start.

use crate::batch::fan_out;
use crate::error::{PipelineError, PipelineResult};
use crate::retry::retry_transient;
use bigdecimal::BigDecimal;
use fr_core::{interval_ms, is_valid_interval, normalize_symbol, now_ms};
use fr_database::{ExchangeStore, HistoryStore, LatestRate, NewFundingHistory};
use fr_venues::{FundingObservation, SymbolPair, VenueAdapter};
use std::collections::{HashMap, HashSet};
use std::sync::Arc;
use tokio::sync::Semaphore;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};
use uuid::Uuid;

/// What one known symbol does on an incremental tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SyncAction {
  /// The next funding event is not yet due
  SkipFresh,
  /// Exactly one new event is due; fetch the latest observation
  AppendOne,
  /// More than one event was missed; fetch everything after the last
  FillGap,
  /// The symbol has no stored history; deep backfill
  FullBackfill,
}

impl SyncAction {
  /// Decide from the last known event (`ts_rate`, interval in ms) and `now`.
  pub fn decide(last: Option<(i64, i64)>, now: i64) -> SyncAction {
    match last {
      None => SyncAction::FullBackfill,
      Some((last_ts, delta)) => {
        if last_ts + delta > now {
          SyncAction::SkipFresh
        } else if now - 2 * delta > last_ts {
          SyncAction::FillGap
        } else {
          SyncAction::AppendOne
        }
      }
    }
  }
}

/// Rows produced for one symbol, plus observations dropped by validation.
#[derive(Debug, Default)]
struct SymbolRows {
  rows: Vec<NewFundingHistory>,
  dropped: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SyncMode {
  /// Venue row missing; nothing ran
  #[default]
  Skipped,
  ColdStart,
  Incremental,
}

/// Counts only; cold-start volumes make row DTOs impractical to return.
#[derive(Debug, Default, Clone)]
pub struct HistorySyncReport {
  pub mode: SyncMode,
  pub symbols_synced: usize,
  pub symbols_skipped: usize,
  pub symbols_failed: usize,
  pub rows_inserted: usize,
  pub rows_dropped: usize,
  pub failed_symbols: Vec<String>,
}

/// Build one insertable row, enforcing the row-level invariants.
fn build_row(
  exchange_id: Uuid,
  name: &str,
  symbol_interval: Option<i32>,
  observation: &FundingObservation,
  fetched_at: i64,
) -> PipelineResult<NewFundingHistory> {
  if observation.funding_time == 0 {
    return Err(PipelineError::Validation(format!("zero funding time for {}", name)));
  }

  let interval_hours = symbol_interval.or(observation.interval_hours).ok_or_else(|| {
    PipelineError::Validation(format!("no funding interval source for {}", name))
  })?;

  if !is_valid_interval(interval_hours) {
    return Err(PipelineError::Validation(format!(
      "interval {}h out of range for {}",
      interval_hours, name
    )));
  }

  Ok(NewFundingHistory {
    id: Uuid::new_v4(),
    exchange_id,
    symbol: normalize_symbol(name),
    name: name.to_string(),
    interval_hours,
    rate: observation.rate.clone(),
    open_interest: BigDecimal::from(0),
    ts_rate: observation.funding_time,
    fetched_at,
  })
}

/// Drop rows repeating a `(symbol, ts_rate)` already seen in this
/// accumulation; the first occurrence wins.
fn dedup_rows(rows: Vec<NewFundingHistory>) -> (Vec<NewFundingHistory>, usize) {
  let before = rows.len();
  let mut seen: HashSet<(String, i64)> = HashSet::with_capacity(before);
  let out: Vec<NewFundingHistory> =
    rows.into_iter().filter(|r| seen.insert((r.symbol.clone(), r.ts_rate))).collect();
  let dropped = before - out.len();
  (out, dropped)
}

/// Per-venue history synchronization pipeline.
pub struct HistoryPipeline {
  adapter: Arc<dyn VenueAdapter>,
  exchanges: Arc<dyn ExchangeStore>,
  history: Arc<dyn HistoryStore>,
  semaphore: Arc<Semaphore>,
}

impl HistoryPipeline {
  pub fn new(
    adapter: Arc<dyn VenueAdapter>,
    exchanges: Arc<dyn ExchangeStore>,
    history: Arc<dyn HistoryStore>,
  ) -> Self {
    let semaphore = Arc::new(Semaphore::new(adapter.history_parallelism()));
    Self { adapter, exchanges, history, semaphore }
  }

  /// One scheduled job run for this venue.
  pub async fn run(&self, cancel: &CancellationToken) -> PipelineResult<HistorySyncReport> {
    let venue = self.adapter.venue();

    let Some(exchange) = self.exchanges.get_by_code(venue).await? else {
      warn!("No exchanges row for {}, skipping history sync", venue);
      return Ok(HistorySyncReport::default());
    };

    let fetched_at = now_ms();
    let existing = self.history.count_for_exchange(exchange.id).await?;

    let adapter = self.adapter.as_ref();
    let pairs = retry_transient(cancel, move || async move {
      adapter.list_active_perpetuals().await.map_err(PipelineError::from)
    })
    .await?;

    if existing == 0 {
      self.cold_start(exchange.id, pairs, fetched_at, cancel).await
    } else {
      self.incremental(exchange.id, pairs, fetched_at, cancel).await
    }
  }

  /// Full backfill of every symbol, batched and bulk-inserted per batch.
  async fn cold_start(
    &self,
    exchange_id: Uuid,
    pairs: Vec<SymbolPair>,
    fetched_at: i64,
    cancel: &CancellationToken,
  ) -> PipelineResult<HistorySyncReport> {
    let mut report = HistorySyncReport { mode: SyncMode::ColdStart, ..Default::default() };
    let batch_size = self.adapter.history_batch_size();
    let parallelism = self.adapter.history_parallelism();

    info!(
      "Cold-start backfill for {}: {} symbols in batches of {}",
      self.adapter.venue(),
      pairs.len(),
      batch_size
    );

    let mut remaining = self.named(pairs, &mut report);

    while !remaining.is_empty() {
      if cancel.is_cancelled() {
        return Err(PipelineError::Cancelled);
      }

      let take = batch_size.min(remaining.len());
      let batch: Vec<(String, SymbolPair)> = remaining.drain(..take).collect();

      let outcome = fan_out(batch, self.semaphore.clone(), parallelism, cancel, |name, pair| {
        self.backfill_symbol(exchange_id, name, pair, fetched_at, cancel)
      })
      .await;

      let mut rows = Vec::new();
      for symbol_rows in outcome.success {
        report.symbols_synced += 1;
        report.rows_dropped += symbol_rows.dropped;
        rows.extend(symbol_rows.rows);
      }
      self.record_failures(outcome.failures, &mut report)?;

      let (rows, duplicate_count) = dedup_rows(rows);
      report.rows_dropped += duplicate_count;

      let batch_rows = rows.len();
      if batch_rows > 0 {
        report.rows_inserted += self.history.bulk_insert(rows).await?;
      }

      if !remaining.is_empty() {
        if let Some(delay) = self.adapter.pacing_delay(batch_rows) {
          tokio::select! {
            _ = cancel.cancelled() => return Err(PipelineError::Cancelled),
            _ = tokio::time::sleep(delay) => {}
          }
        }
      }
    }

    info!(
      "Cold start for {} complete: {} rows across {} symbols ({} failed)",
      self.adapter.venue(),
      report.rows_inserted,
      report.symbols_synced,
      report.symbols_failed
    );
    Ok(report)
  }

  /// Catch-up pass: one action per symbol, one bulk insert per run.
  async fn incremental(
    &self,
    exchange_id: Uuid,
    pairs: Vec<SymbolPair>,
    fetched_at: i64,
    cancel: &CancellationToken,
  ) -> PipelineResult<HistorySyncReport> {
    let mut report = HistorySyncReport { mode: SyncMode::Incremental, ..Default::default() };
    let parallelism = self.adapter.history_parallelism();

    let known: HashMap<String, LatestRate> = self
      .history
      .latest_rates_by_name(exchange_id)
      .await?
      .into_iter()
      .map(|r| (r.name.to_lowercase(), r))
      .collect();

    let items = self.named(pairs, &mut report);

    let outcome = fan_out(items, self.semaphore.clone(), parallelism, cancel, |name, pair| {
      self.sync_symbol(exchange_id, name, pair, &known, fetched_at, cancel)
    })
    .await;

    let mut rows = Vec::new();
    for symbol_rows in outcome.success {
      if symbol_rows.rows.is_empty() && symbol_rows.dropped == 0 {
        report.symbols_skipped += 1;
      } else {
        report.symbols_synced += 1;
      }
      report.rows_dropped += symbol_rows.dropped;
      rows.extend(symbol_rows.rows);
    }
    self.record_failures(outcome.failures, &mut report)?;

    let (rows, duplicate_count) = dedup_rows(rows);
    report.rows_dropped += duplicate_count;

    if !rows.is_empty() {
      report.rows_inserted += self.history.bulk_insert(rows).await?;
    }

    debug!(
      "Incremental sync for {}: {} inserted, {} symbols fresh, {} failed",
      self.adapter.venue(),
      report.rows_inserted,
      report.symbols_skipped,
      report.symbols_failed
    );
    Ok(report)
  }

  /// Pair each symbol with its raw name; nameless pairs cannot be ingested.
  fn named(
    &self,
    pairs: Vec<SymbolPair>,
    report: &mut HistorySyncReport,
  ) -> Vec<(String, SymbolPair)> {
    let mut named = Vec::with_capacity(pairs.len());
    for pair in pairs {
      let name = pair.name().map(str::to_string);
      match name {
        Some(name) => named.push((name, pair)),
        None => {
          warn!("Symbol without a name from {}, dropping", self.adapter.venue());
          report.symbols_failed += 1;
        }
      }
    }
    named
  }

  fn record_failures(
    &self,
    failures: Vec<(String, PipelineError)>,
    report: &mut HistorySyncReport,
  ) -> PipelineResult<()> {
    for (symbol, err) in failures {
      match err {
        PipelineError::Cancelled => return Err(PipelineError::Cancelled),
        PipelineError::EmptyResult(_) => {
          warn!("No data for {}: {}", symbol, err);
          report.symbols_skipped += 1;
        }
        other => {
          warn!("Failed to sync {}: {}", symbol, other);
          report.symbols_failed += 1;
          report.failed_symbols.push(symbol);
        }
      }
    }
    Ok(())
  }

  /// Deep backfill of one symbol from its launch (or listing) onwards.
  async fn backfill_symbol(
    &self,
    exchange_id: Uuid,
    name: String,
    pair: SymbolPair,
    fetched_at: i64,
    cancel: &CancellationToken,
  ) -> PipelineResult<SymbolRows> {
    let start = pair.backfill_start();
    let adapter = self.adapter.as_ref();
    let symbol = name.as_str();
    let observations = retry_transient(cancel, move || async move {
      adapter.list_history(symbol, start).await.map_err(PipelineError::from)
    })
    .await?;

    Ok(self.rows_from(exchange_id, &name, pair.interval_hours(), &observations, fetched_at))
  }

  /// One incremental action for one symbol.
  async fn sync_symbol(
    &self,
    exchange_id: Uuid,
    name: String,
    pair: SymbolPair,
    known: &HashMap<String, LatestRate>,
    now: i64,
    cancel: &CancellationToken,
  ) -> PipelineResult<SymbolRows> {
    let last = known.get(&name.to_lowercase());
    let action = SyncAction::decide(
      last.map(|l| (l.ts_rate, interval_ms(l.interval_hours))),
      now,
    );

    match (action, last) {
      (SyncAction::SkipFresh, _) => Ok(SymbolRows::default()),

      (SyncAction::AppendOne, Some(last)) => {
        let adapter = self.adapter.as_ref();
        let symbol = name.as_str();
        let observation = retry_transient(cancel, move || async move {
          adapter.latest(symbol).await.map_err(PipelineError::from)
        })
        .await?;

        if observation.funding_time <= last.ts_rate {
          debug!("No new funding event for {} yet", name);
          return Ok(SymbolRows::default());
        }
        Ok(self.rows_from(exchange_id, &name, pair.interval_hours(), &[observation], now))
      }

      (SyncAction::FillGap, Some(last)) => {
        let adapter = self.adapter.as_ref();
        let symbol = name.as_str();
        let start = last.ts_rate + 1;
        let observations = retry_transient(cancel, move || async move {
          adapter.list_history(symbol, Some(start)).await.map_err(PipelineError::from)
        })
        .await?;

        let fresh: Vec<FundingObservation> =
          observations.into_iter().filter(|o| o.funding_time > last.ts_rate).collect();
        Ok(self.rows_from(exchange_id, &name, pair.interval_hours(), &fresh, now))
      }

      (SyncAction::FullBackfill, _) => {
        debug!("Newly listed symbol {}, deep backfill", name);
        self.backfill_symbol(exchange_id, name, pair, now, cancel).await
      }

      // decide() only yields the existing-symbol actions when `last` exists.
      (_, None) => Ok(SymbolRows::default()),
    }
  }

  fn rows_from(
    &self,
    exchange_id: Uuid,
    name: &str,
    symbol_interval: Option<i32>,
    observations: &[FundingObservation],
    fetched_at: i64,
  ) -> SymbolRows {
    let mut out = SymbolRows { rows: Vec::with_capacity(observations.len()), dropped: 0 };
    for observation in observations {
      match build_row(exchange_id, name, symbol_interval, observation, fetched_at) {
        Ok(row) => out.rows.push(row),
        Err(err) => {
          warn!("Dropping observation for {}: {}", name, err);
          out.dropped += 1;
        }
      }
    }
    out
  }
}
