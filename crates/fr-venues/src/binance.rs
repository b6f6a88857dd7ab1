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

//! Binance USD-M futures adapter
//!
//! The symbol catalog is the union of `/fapi/v1/fundingInfo` and the trading
//! perpetuals of `/fapi/v1/exchangeInfo`. Symbols the funding-info endpoint
//! does not know get their interval inferred from the delta of their two most
//! recent funding events. History pages forward by `startTime` with a 400 ms
//! delay between pages.

use crate::adapter::{
  ExchangeSymbolInfo, FundingObservation, FundingSymbolInfo, SymbolPair, VenueAdapter,
};
use crate::error::{VenueError, VenueResult};
use crate::parse_rate;
use crate::transport::Transport;
use async_trait::async_trait;
use fr_core::VenueCode;
use serde::Deserialize;
use std::collections::HashMap;
use std::time::Duration;
use tokio::time::sleep;
use tracing::{debug, warn};

pub const BINANCE_FUTURES_BASE_URL: &str = "https://fapi.binance.com";

const PAGE_LIMIT: usize = 1000;
const PAGE_DELAY_MS: u64 = 400;

pub struct BinanceAdapter {
  transport: Transport,
  base_url: String,
}

#[derive(Debug, Deserialize)]
struct ExchangeInfoResponse {
  symbols: Vec<ExchangeInfoSymbol>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ExchangeInfoSymbol {
  symbol: String,
  status: String,
  contract_type: String,
  #[serde(default)]
  onboard_date: Option<i64>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct FundingInfoEntry {
  symbol: String,
  funding_interval_hours: i32,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct FundingRateEntry {
  #[allow(dead_code)]
  symbol: String,
  funding_time: i64,
  funding_rate: String,
}

/// Infer a funding interval from the two most recent funding times.
///
/// Accepts only whole-ish deltas of 1..=24 hours; anything else means the
/// symbol cannot be ingested.
pub fn infer_interval_hours(earlier_ms: i64, later_ms: i64) -> Option<i32> {
  let delta_ms = later_ms - earlier_ms;
  if delta_ms <= 0 {
    return None;
  }
  let hours = ((delta_ms as f64) / 3_600_000.0).round() as i64;
  if (1..=24).contains(&hours) { Some(hours as i32) } else { None }
}

impl BinanceAdapter {
  pub fn new(timeout_secs: u64) -> VenueResult<Self> {
    Ok(Self {
      transport: Transport::new(timeout_secs)?,
      base_url: BINANCE_FUTURES_BASE_URL.to_string(),
    })
  }

  /// Point the adapter at a different base URL (tests).
  pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
    self.base_url = base_url.into();
    self
  }

  async fn funding_info(&self) -> VenueResult<Vec<FundingInfoEntry>> {
    let url = format!("{}/fapi/v1/fundingInfo", self.base_url);
    self.transport.get_json(&url, &[]).await
  }

  async fn exchange_info(&self) -> VenueResult<Vec<ExchangeInfoSymbol>> {
    let url = format!("{}/fapi/v1/exchangeInfo", self.base_url);
    let response: ExchangeInfoResponse = self.transport.get_json(&url, &[]).await?;
    Ok(response.symbols)
  }

  async fn funding_rate_page(
    &self,
    symbol: &str,
    start_time: Option<i64>,
    limit: usize,
  ) -> VenueResult<Vec<FundingRateEntry>> {
    let url = format!("{}/fapi/v1/fundingRate", self.base_url);
    let mut query = vec![("symbol", symbol.to_string()), ("limit", limit.to_string())];
    if let Some(start) = start_time {
      query.push(("startTime", start.to_string()));
    }
    self.transport.get_json(&url, &query).await
  }

  /// Interval for a symbol the funding-info endpoint does not know: the
  /// delta between its two most recent funding events.
  async fn infer_interval(&self, symbol: &str) -> VenueResult<Option<i32>> {
    let recent = self.funding_rate_page(symbol, None, 2).await?;
    if recent.len() < 2 {
      return Ok(None);
    }
    Ok(infer_interval_hours(recent[0].funding_time, recent[1].funding_time))
  }
}

#[async_trait]
impl VenueAdapter for BinanceAdapter {
  fn venue(&self) -> VenueCode {
    VenueCode::Binance
  }

  fn history_parallelism(&self) -> usize {
    1
  }

  fn history_batch_size(&self) -> usize {
    10
  }

  async fn list_active_perpetuals(&self) -> VenueResult<Vec<SymbolPair>> {
    let funding_entries = self.funding_info().await?;
    let mut intervals: HashMap<String, i32> =
      funding_entries.into_iter().map(|e| (e.symbol, e.funding_interval_hours)).collect();

    let trading: Vec<ExchangeInfoSymbol> = self
      .exchange_info()
      .await?
      .into_iter()
      .filter(|s| s.status == "TRADING" && s.contract_type == "PERPETUAL")
      .collect();

    let mut pairs = Vec::with_capacity(trading.len());
    for info in trading {
      let interval = match intervals.remove(&info.symbol) {
        Some(hours) => Some(hours),
        None => match self.infer_interval(&info.symbol).await? {
          Some(hours) => {
            debug!("Inferred {}h funding interval for {}", hours, info.symbol);
            // Keep inference calls within the venue's request quota.
            sleep(Duration::from_millis(PAGE_DELAY_MS)).await;
            Some(hours)
          }
          None => {
            warn!("Cannot infer funding interval for {}, skipping", info.symbol);
            sleep(Duration::from_millis(PAGE_DELAY_MS)).await;
            continue;
          }
        },
      };

      pairs.push(SymbolPair {
        exchange: Some(ExchangeSymbolInfo {
          name: info.symbol.clone(),
          listing_date: info.onboard_date,
        }),
        funding: Some(FundingSymbolInfo {
          name: info.symbol,
          interval_hours: interval,
          launch_time: None,
        }),
      });
    }

    // Funding-info symbols absent from the trading set still belong to the
    // union; they carry a funding side only.
    for (symbol, hours) in intervals {
      pairs.push(SymbolPair::funding_only(FundingSymbolInfo {
        name: symbol,
        interval_hours: Some(hours),
        launch_time: None,
      }));
    }

    Ok(pairs)
  }

  async fn list_history(
    &self,
    symbol: &str,
    start_time: Option<i64>,
  ) -> VenueResult<Vec<FundingObservation>> {
    // Without a start Binance returns the newest page, so the full backfill
    // anchors at zero and walks forward.
    let mut start = start_time.unwrap_or(0);
    let mut out = Vec::new();

    loop {
      let page = self.funding_rate_page(symbol, Some(start), PAGE_LIMIT).await?;
      if page.is_empty() {
        break;
      }

      let last_time = page[page.len() - 1].funding_time;
      for entry in &page {
        out.push(FundingObservation {
          rate: parse_rate(&entry.funding_rate)?,
          funding_time: entry.funding_time,
          interval_hours: None,
        });
      }

      if page.len() < PAGE_LIMIT {
        break;
      }
      start = last_time + 1;
      sleep(Duration::from_millis(PAGE_DELAY_MS)).await;
    }

    Ok(out)
  }

  async fn latest(&self, symbol: &str) -> VenueResult<FundingObservation> {
    let page = self.funding_rate_page(symbol, None, 1).await?;
    let entry = page
      .into_iter()
      .next_back()
      .ok_or_else(|| VenueError::EmptyResult { venue: self.venue(), symbol: symbol.to_string() })?;

    Ok(FundingObservation {
      rate: parse_rate(&entry.funding_rate)?,
      funding_time: entry.funding_time,
      interval_hours: None,
    })
  }
}
