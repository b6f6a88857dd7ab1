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

//! HyperLiquid adapter
//!
//! Every asset in the `meta` universe is a perpetual funding hourly, so the
//! interval is a constant 1 h. History pages forward from `startTime` through
//! the `fundingHistory` info request with a 700 ms delay between pages; an
//! absent start falls back to 2000-01-01.

use crate::adapter::{FundingObservation, FundingSymbolInfo, SymbolPair, VenueAdapter};
use crate::error::{VenueError, VenueResult};
use crate::parse_rate;
use crate::transport::Transport;
use async_trait::async_trait;
use fr_core::{HISTORY_EPOCH_MS, VenueCode, now_ms};
use serde::Deserialize;
use serde_json::json;
use std::time::Duration;
use tokio::time::sleep;

pub const HYPERLIQUID_BASE_URL: &str = "https://api.hyperliquid.xyz";

/// The funding cadence for every HyperLiquid perpetual.
pub const FUNDING_INTERVAL_HOURS: i32 = 1;

/// The info endpoint caps fundingHistory responses at this many rows.
const PAGE_LIMIT: usize = 500;
const PAGE_DELAY_MS: u64 = 700;

/// Window used to pull the single most recent observation.
const LATEST_WINDOW_MS: i64 = 4 * 3_600_000;

pub struct HyperliquidAdapter {
  transport: Transport,
  base_url: String,
}

#[derive(Debug, Deserialize)]
struct MetaResponse {
  universe: Vec<UniverseAsset>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct UniverseAsset {
  name: String,
  #[serde(default)]
  is_delisted: bool,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct FundingHistoryEntry {
  #[allow(dead_code)]
  coin: String,
  funding_rate: String,
  time: i64,
}

impl HyperliquidAdapter {
  pub fn new(timeout_secs: u64) -> VenueResult<Self> {
    Ok(Self {
      transport: Transport::new(timeout_secs)?,
      base_url: HYPERLIQUID_BASE_URL.to_string(),
    })
  }

  pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
    self.base_url = base_url.into();
    self
  }

  async fn funding_history_page(
    &self,
    symbol: &str,
    start_time: i64,
  ) -> VenueResult<Vec<FundingHistoryEntry>> {
    let url = format!("{}/info", self.base_url);
    let body = json!({ "type": "fundingHistory", "coin": symbol, "startTime": start_time });
    self.transport.post_json(&url, &body).await
  }

  fn to_observation(entry: &FundingHistoryEntry) -> VenueResult<FundingObservation> {
    Ok(FundingObservation {
      rate: parse_rate(&entry.funding_rate)?,
      funding_time: entry.time,
      interval_hours: None,
    })
  }
}

#[async_trait]
impl VenueAdapter for HyperliquidAdapter {
  fn venue(&self) -> VenueCode {
    VenueCode::Hyperliquid
  }

  fn history_parallelism(&self) -> usize {
    1
  }

  fn history_batch_size(&self) -> usize {
    30
  }

  async fn list_active_perpetuals(&self) -> VenueResult<Vec<SymbolPair>> {
    let url = format!("{}/info", self.base_url);
    let meta: MetaResponse = self.transport.post_json(&url, &json!({ "type": "meta" })).await?;

    Ok(
      meta
        .universe
        .into_iter()
        .filter(|a| !a.is_delisted)
        .map(|a| {
          SymbolPair::funding_only(FundingSymbolInfo {
            name: a.name,
            interval_hours: Some(FUNDING_INTERVAL_HOURS),
            launch_time: None,
          })
        })
        .collect(),
    )
  }

  async fn list_history(
    &self,
    symbol: &str,
    start_time: Option<i64>,
  ) -> VenueResult<Vec<FundingObservation>> {
    let mut start = start_time.unwrap_or(HISTORY_EPOCH_MS);
    let mut out = Vec::new();

    loop {
      let page = self.funding_history_page(symbol, start).await?;
      if page.is_empty() {
        break;
      }

      let last_time = page[page.len() - 1].time;
      for entry in &page {
        out.push(Self::to_observation(entry)?);
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
    // No single-shot endpoint; a trailing window wider than two intervals
    // always contains the newest event for a live symbol.
    let page = self.funding_history_page(symbol, now_ms() - LATEST_WINDOW_MS).await?;
    let entry = page
      .last()
      .ok_or_else(|| VenueError::EmptyResult { venue: self.venue(), symbol: symbol.to_string() })?;
    Self::to_observation(entry)
  }
}
