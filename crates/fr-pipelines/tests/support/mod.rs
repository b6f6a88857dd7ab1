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

//! Scripted venue adapter and in-memory stores for pipeline tests

use async_trait::async_trait;
use bigdecimal::BigDecimal;
use fr_core::{VenueCode, normalize_symbol};
use fr_database::models::{
  Exchange, FundingHistory, FundingOnline, FundingOnlineUpdate, LatestRate, NewExchange,
  NewFundingHistory, NewFundingOnline,
};
use fr_database::repository::{
  ExchangeStore, HistoryStore, OnlineStore, RateFilter, StoreError, StoreResult,
};
use fr_venues::adapter::{FundingObservation, FundingSymbolInfo, SymbolPair, VenueAdapter};
use fr_venues::error::{VenueError, VenueResult};
use std::collections::HashMap;
use std::str::FromStr;
use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};
use uuid::Uuid;

pub const HOUR_MS: i64 = 3_600_000;

pub fn obs(rate: &str, funding_time: i64, interval_hours: Option<i32>) -> FundingObservation {
  FundingObservation { rate: BigDecimal::from_str(rate).unwrap(), funding_time, interval_hours }
}

/// A venue adapter scripted entirely from test data.
pub struct MockAdapter {
  venue: VenueCode,
  parallelism: usize,
  batch_size: usize,
  pairs: Vec<SymbolPair>,
  histories: HashMap<String, Vec<FundingObservation>>,
  /// Remaining transient failures per symbol before `latest` succeeds
  latest_failures: Mutex<HashMap<String, u32>>,
  /// When set, every catalog call fails with this many transient errors left
  catalog_failures: Mutex<u32>,
  pub latest_calls: AtomicUsize,
  pub history_calls: AtomicUsize,
}

impl MockAdapter {
  pub fn new(venue: VenueCode) -> Self {
    Self {
      venue,
      parallelism: 2,
      batch_size: 10,
      pairs: Vec::new(),
      histories: HashMap::new(),
      latest_failures: Mutex::new(HashMap::new()),
      catalog_failures: Mutex::new(0),
      latest_calls: AtomicUsize::new(0),
      history_calls: AtomicUsize::new(0),
    }
  }

  /// Register a symbol with a symbol-level interval and its full history.
  pub fn with_symbol(
    mut self,
    name: &str,
    interval_hours: Option<i32>,
    history: Vec<FundingObservation>,
  ) -> Self {
    self.pairs.push(SymbolPair::funding_only(FundingSymbolInfo {
      name: name.to_string(),
      interval_hours,
      launch_time: None,
    }));
    self.histories.insert(name.to_string(), history);
    self
  }

  pub fn with_latest_failures(self, name: &str, failures: u32) -> Self {
    self.latest_failures.lock().unwrap().insert(name.to_string(), failures);
    self
  }

  pub fn with_catalog_failures(self, failures: u32) -> Self {
    *self.catalog_failures.lock().unwrap() = failures;
    self
  }
}

#[async_trait]
impl VenueAdapter for MockAdapter {
  fn venue(&self) -> VenueCode {
    self.venue
  }

  fn history_parallelism(&self) -> usize {
    self.parallelism
  }

  fn history_batch_size(&self) -> usize {
    self.batch_size
  }

  async fn list_active_perpetuals(&self) -> VenueResult<Vec<SymbolPair>> {
    let mut failures = self.catalog_failures.lock().unwrap();
    if *failures > 0 {
      *failures -= 1;
      return Err(VenueError::Http("catalog unavailable".to_string()));
    }
    Ok(self.pairs.clone())
  }

  async fn list_history(
    &self,
    symbol: &str,
    start_time: Option<i64>,
  ) -> VenueResult<Vec<FundingObservation>> {
    self.history_calls.fetch_add(1, Ordering::SeqCst);
    let floor = start_time.unwrap_or(0);
    let mut out: Vec<FundingObservation> = self
      .histories
      .get(symbol)
      .cloned()
      .unwrap_or_default()
      .into_iter()
      .filter(|o| o.funding_time >= floor)
      .collect();
    out.sort_by_key(|o| o.funding_time);
    Ok(out)
  }

  async fn latest(&self, symbol: &str) -> VenueResult<FundingObservation> {
    self.latest_calls.fetch_add(1, Ordering::SeqCst);

    if let Some(remaining) = self.latest_failures.lock().unwrap().get_mut(symbol) {
      if *remaining > 0 {
        *remaining -= 1;
        return Err(VenueError::Http("flaky venue".to_string()));
      }
    }

    self
      .histories
      .get(symbol)
      .and_then(|h| h.iter().max_by_key(|o| o.funding_time))
      .cloned()
      .ok_or_else(|| VenueError::EmptyResult { venue: self.venue, symbol: symbol.to_string() })
  }

  // Deterministic tests: no inter-batch sleeps.
  fn pacing_delay(&self, _batch_rows: usize) -> Option<std::time::Duration> {
    None
  }
}

/// In-memory implementation of every store trait.
#[derive(Default)]
pub struct MemStorage {
  pub exchanges: Mutex<Vec<Exchange>>,
  pub history: Mutex<Vec<FundingHistory>>,
  pub online: Mutex<Vec<FundingOnline>>,
  pub commit_calls: AtomicUsize,
  pub fail_bulk_insert: Mutex<bool>,
}

impl MemStorage {
  pub fn with_exchange(self, code: VenueCode) -> (Self, Uuid) {
    let id = Uuid::new_v4();
    self.exchanges.lock().unwrap().push(Exchange { id, code: code.as_str().to_string() });
    (self, id)
  }

  /// Seed one stored history row (its raw name keyed as the venue sent it).
  pub fn seed_history(&self, exchange_id: Uuid, name: &str, interval_hours: i32, ts_rate: i64) {
    self.history.lock().unwrap().push(FundingHistory {
      id: Uuid::new_v4(),
      exchange_id,
      symbol: normalize_symbol(name),
      name: name.to_string(),
      interval_hours,
      rate: BigDecimal::from_str("0.0001").unwrap(),
      open_interest: BigDecimal::from(0),
      ts_rate,
      fetched_at: ts_rate,
    });
  }

  pub fn seed_online(&self, exchange_id: Uuid, name: &str, interval_hours: i32, ts_rate: i64) -> Uuid {
    let id = Uuid::new_v4();
    self.online.lock().unwrap().push(FundingOnline {
      id,
      exchange_id,
      symbol: normalize_symbol(name),
      name: name.to_string(),
      interval_hours,
      rate: BigDecimal::from_str("0.0001").unwrap(),
      open_interest: BigDecimal::from(0),
      ts_rate,
      fetched_at: ts_rate,
    });
    id
  }
}

#[async_trait]
impl ExchangeStore for MemStorage {
  async fn get_by_code(&self, code: VenueCode) -> StoreResult<Option<Exchange>> {
    Ok(self.exchanges.lock().unwrap().iter().find(|e| e.code == code.as_str()).cloned())
  }

  async fn list(&self) -> StoreResult<Vec<Exchange>> {
    Ok(self.exchanges.lock().unwrap().clone())
  }

  async fn insert(&self, row: NewExchange) -> StoreResult<usize> {
    let mut exchanges = self.exchanges.lock().unwrap();
    if exchanges.iter().any(|e| e.code == row.code) {
      return Ok(0);
    }
    exchanges.push(Exchange { id: row.id, code: row.code });
    Ok(1)
  }
}

#[async_trait]
impl HistoryStore for MemStorage {
  async fn count_for_exchange(&self, exchange_id: Uuid) -> StoreResult<i64> {
    Ok(self.history.lock().unwrap().iter().filter(|r| r.exchange_id == exchange_id).count() as i64)
  }

  async fn latest_rates_by_name(&self, exchange_id: Uuid) -> StoreResult<Vec<LatestRate>> {
    let mut newest: HashMap<String, LatestRate> = HashMap::new();
    for row in self.history.lock().unwrap().iter().filter(|r| r.exchange_id == exchange_id) {
      let entry = newest.entry(row.name.clone());
      let candidate =
        LatestRate { name: row.name.clone(), ts_rate: row.ts_rate, interval_hours: row.interval_hours };
      entry
        .and_modify(|current| {
          if row.ts_rate > current.ts_rate {
            *current = candidate.clone();
          }
        })
        .or_insert(candidate);
    }
    Ok(newest.into_values().collect())
  }

  async fn bulk_insert(&self, rows: Vec<NewFundingHistory>) -> StoreResult<usize> {
    if *self.fail_bulk_insert.lock().unwrap() {
      return Err(StoreError::Query("bulk copy failed".to_string()));
    }
    let inserted = rows.len();
    let mut history = self.history.lock().unwrap();
    for row in rows {
      history.push(FundingHistory {
        id: row.id,
        exchange_id: row.exchange_id,
        symbol: row.symbol,
        name: row.name,
        interval_hours: row.interval_hours,
        rate: row.rate,
        open_interest: row.open_interest,
        ts_rate: row.ts_rate,
        fetched_at: row.fetched_at,
      });
    }
    Ok(inserted)
  }

  async fn get_by_filter(
    &self,
    filter: &RateFilter,
    _page: i64,
    _size: i64,
  ) -> StoreResult<Vec<FundingHistory>> {
    Ok(
      self
        .history
        .lock()
        .unwrap()
        .iter()
        .filter(|r| filter.exchange_id.map(|id| r.exchange_id == id).unwrap_or(true))
        .filter(|r| filter.symbol.as_deref().map(|s| r.symbol == s).unwrap_or(true))
        .cloned()
        .collect(),
    )
  }

  async fn get_count_by_filter(&self, filter: &RateFilter) -> StoreResult<i64> {
    Ok(HistoryStore::get_by_filter(self, filter, 0, i64::MAX).await?.len() as i64)
  }

  async fn get_unique_symbols_count(&self, filter: &RateFilter) -> StoreResult<i64> {
    let rows = HistoryStore::get_by_filter(self, filter, 0, i64::MAX).await?;
    let symbols: std::collections::HashSet<String> =
      rows.into_iter().map(|r| r.symbol).collect();
    Ok(symbols.len() as i64)
  }

  async fn get_latest_symbol_rates(
    &self,
    exchange_id: Option<Uuid>,
    _group_by_exchange: bool,
    _page: i64,
    _size: i64,
  ) -> StoreResult<Vec<FundingHistory>> {
    let mut newest: HashMap<String, FundingHistory> = HashMap::new();
    for row in self
      .history
      .lock()
      .unwrap()
      .iter()
      .filter(|r| exchange_id.map(|id| r.exchange_id == id).unwrap_or(true))
    {
      newest
        .entry(row.symbol.clone())
        .and_modify(|current| {
          if row.ts_rate > current.ts_rate {
            *current = row.clone();
          }
        })
        .or_insert_with(|| row.clone());
    }
    Ok(newest.into_values().collect())
  }
}

#[async_trait]
impl OnlineStore for MemStorage {
  async fn get_for_exchange(&self, exchange_id: Uuid) -> StoreResult<Vec<FundingOnline>> {
    Ok(
      self
        .online
        .lock()
        .unwrap()
        .iter()
        .filter(|r| r.exchange_id == exchange_id)
        .cloned()
        .collect(),
    )
  }

  async fn commit_snapshot(
    &self,
    updates: Vec<(Uuid, FundingOnlineUpdate)>,
    creates: Vec<NewFundingOnline>,
  ) -> StoreResult<(usize, usize)> {
    self.commit_calls.fetch_add(1, Ordering::SeqCst);
    let mut online = self.online.lock().unwrap();

    let mut updated = 0;
    for (row_id, changes) in updates {
      if let Some(row) = online.iter_mut().find(|r| r.id == row_id) {
        row.name = changes.name;
        row.interval_hours = changes.interval_hours;
        row.rate = changes.rate;
        row.open_interest = changes.open_interest;
        row.ts_rate = changes.ts_rate;
        row.fetched_at = changes.fetched_at;
        updated += 1;
      }
    }

    let created = creates.len();
    for row in creates {
      online.push(FundingOnline {
        id: row.id,
        exchange_id: row.exchange_id,
        symbol: row.symbol,
        name: row.name,
        interval_hours: row.interval_hours,
        rate: row.rate,
        open_interest: row.open_interest,
        ts_rate: row.ts_rate,
        fetched_at: row.fetched_at,
      });
    }

    Ok((updated, created))
  }

  async fn get_by_filter(
    &self,
    filter: &RateFilter,
    _page: i64,
    _size: i64,
  ) -> StoreResult<Vec<FundingOnline>> {
    Ok(
      self
        .online
        .lock()
        .unwrap()
        .iter()
        .filter(|r| filter.exchange_id.map(|id| r.exchange_id == id).unwrap_or(true))
        .cloned()
        .collect(),
    )
  }

  async fn get_count_by_filter(&self, filter: &RateFilter) -> StoreResult<i64> {
    Ok(OnlineStore::get_by_filter(self, filter, 0, i64::MAX).await?.len() as i64)
  }

  async fn get_unique_symbols_count(&self) -> StoreResult<i64> {
    let symbols: std::collections::HashSet<String> =
      self.online.lock().unwrap().iter().map(|r| r.symbol.clone()).collect();
    Ok(symbols.len() as i64)
  }

  async fn get_latest_symbol_funding_rates(
    &self,
    _page: i64,
    _size: i64,
  ) -> StoreResult<Vec<FundingOnline>> {
    Ok(self.online.lock().unwrap().clone())
  }
}
