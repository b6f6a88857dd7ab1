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

//! The venue adapter trait and the transient values it emits

use crate::error::VenueResult;
use async_trait::async_trait;
use bigdecimal::BigDecimal;
use fr_core::VenueCode;
use std::time::Duration;

/// Funding-side view of a symbol: identity, interval, launch time.
#[derive(Debug, Clone, PartialEq)]
pub struct FundingSymbolInfo {
  /// Venue-raw symbol string
  pub name: String,
  /// Funding cadence in hours, when the venue reports it at symbol level
  pub interval_hours: Option<i32>,
  /// Epoch ms the contract started funding, when known
  pub launch_time: Option<i64>,
}

/// Exchange-side view of a symbol: identity and listing date.
#[derive(Debug, Clone, PartialEq)]
pub struct ExchangeSymbolInfo {
  /// Venue-raw symbol string
  pub name: String,
  /// Epoch ms the contract was listed, when known
  pub listing_date: Option<i64>,
}

/// A symbol as discovered by an adapter; either side may be absent.
///
/// Pipelines read the funding side for identity, interval and launch time,
/// falling back to the exchange side for the listing date.
#[derive(Debug, Clone, PartialEq)]
pub struct SymbolPair {
  pub exchange: Option<ExchangeSymbolInfo>,
  pub funding: Option<FundingSymbolInfo>,
}

impl SymbolPair {
  pub fn funding_only(funding: FundingSymbolInfo) -> Self {
    Self { exchange: None, funding: Some(funding) }
  }

  /// Venue-raw symbol name, preferring the funding side.
  pub fn name(&self) -> Option<&str> {
    self
      .funding
      .as_ref()
      .map(|f| f.name.as_str())
      .or_else(|| self.exchange.as_ref().map(|e| e.name.as_str()))
  }

  /// Symbol-level funding interval, when the venue reports one.
  pub fn interval_hours(&self) -> Option<i32> {
    self.funding.as_ref().and_then(|f| f.interval_hours)
  }

  /// Preferred backfill start: launch time, else listing date.
  pub fn backfill_start(&self) -> Option<i64> {
    self
      .funding
      .as_ref()
      .and_then(|f| f.launch_time)
      .or_else(|| self.exchange.as_ref().and_then(|e| e.listing_date))
  }
}

/// One funding observation as returned by a venue.
#[derive(Debug, Clone, PartialEq)]
pub struct FundingObservation {
  pub rate: BigDecimal,
  /// Epoch ms of the funding event; zero means the venue sent no timestamp
  pub funding_time: i64,
  /// Populated only when the venue reports the cadence on the observation
  /// itself (MEXC)
  pub interval_hours: Option<i32>,
}

/// A venue's REST surface, as the pipelines consume it.
///
/// Implementations are pure functional views: no retries, no persistence.
/// Each adapter honors its venue's pagination direction and inter-page
/// delays; everything else is the pipeline's concern.
#[async_trait]
pub trait VenueAdapter: Send + Sync {
  fn venue(&self) -> VenueCode;

  /// Concurrent per-symbol operations allowed during history sync.
  fn history_parallelism(&self) -> usize;

  /// Concurrent per-symbol operations allowed during online snapshots.
  fn online_parallelism(&self) -> usize {
    self.history_parallelism()
  }

  /// Symbols per sequential batch during history sync.
  fn history_batch_size(&self) -> usize;

  /// Active linear perpetual symbols with available funding metadata.
  async fn list_active_perpetuals(&self) -> VenueResult<Vec<SymbolPair>>;

  /// The catalog used by the online pipeline; venues that expose a
  /// trading-status flag narrow it here.
  async fn list_online_perpetuals(&self) -> VenueResult<Vec<SymbolPair>> {
    self.list_active_perpetuals().await
  }

  /// All funding observations for `symbol` at or after `start_time`,
  /// ascending. `None` uses the adapter's own default floor.
  async fn list_history(
    &self,
    symbol: &str,
    start_time: Option<i64>,
  ) -> VenueResult<Vec<FundingObservation>>;

  /// The single most recent funding observation for `symbol`.
  async fn latest(&self, symbol: &str) -> VenueResult<FundingObservation>;

  /// Delay before the next history batch, given the rows the finished batch
  /// produced. Coarse rate-limit pressure relief, not a token bucket.
  fn pacing_delay(&self, batch_rows: usize) -> Option<Duration> {
    Some(Duration::from_millis(batch_rows as u64 / 10))
  }
}
