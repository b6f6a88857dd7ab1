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

//! MEXC contract adapter
//!
//! The catalog comes from contract-details; the funding interval is unknown
//! at symbol level and is read from each observation's `collectCycle`.
//! History is page-number based, newest-first, and stops when the current
//! page reaches the total; the adapter sorts ascending before returning.

use crate::adapter::{FundingObservation, FundingSymbolInfo, SymbolPair, VenueAdapter};
use crate::error::{VenueError, VenueResult};
use crate::transport::Transport;
use async_trait::async_trait;
use bigdecimal::BigDecimal;
use fr_core::VenueCode;
use serde::Deserialize;
use serde::de::DeserializeOwned;
use std::str::FromStr;
use std::time::Duration;
use tokio::time::sleep;

pub const MEXC_CONTRACT_BASE_URL: &str = "https://contract.mexc.com";

const PAGE_SIZE: usize = 1000;
const PAGE_DELAY_MS: u64 = 500;

pub struct MexcAdapter {
  transport: Transport,
  base_url: String,
}

/// Contract endpoints wrap payloads in a success envelope.
#[derive(Debug, Deserialize)]
struct Envelope<T> {
  success: bool,
  #[serde(default)]
  code: i32,
  data: Option<T>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ContractDetail {
  symbol: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct FundingHistoryPage {
  total_page: i32,
  current_page: i32,
  #[serde(default)]
  result_list: Vec<FundingHistoryEntry>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct FundingHistoryEntry {
  #[allow(dead_code)]
  symbol: String,
  funding_rate: f64,
  settle_time: i64,
  #[serde(default)]
  collect_cycle: Option<i32>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct LatestFundingRate {
  #[allow(dead_code)]
  symbol: String,
  funding_rate: f64,
  #[serde(default)]
  collect_cycle: Option<i32>,
  #[serde(default)]
  timestamp: i64,
}

/// MEXC sends rates as JSON numbers; go through the shortest decimal
/// rendering to keep the stored value faithful.
fn rate_from_f64(raw: f64) -> VenueResult<BigDecimal> {
  BigDecimal::from_str(&raw.to_string())
    .map_err(|e| VenueError::Parse(format!("invalid rate {}: {}", raw, e)))
}

impl MexcAdapter {
  pub fn new(timeout_secs: u64) -> VenueResult<Self> {
    Ok(Self {
      transport: Transport::new(timeout_secs)?,
      base_url: MEXC_CONTRACT_BASE_URL.to_string(),
    })
  }

  pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
    self.base_url = base_url.into();
    self
  }

  fn unwrap_envelope<T>(&self, envelope: Envelope<T>) -> VenueResult<T> {
    if !envelope.success {
      return Err(VenueError::Api {
        venue: VenueCode::Mexc,
        message: format!("success=false, code {}", envelope.code),
      });
    }
    envelope.data.ok_or_else(|| VenueError::Api {
      venue: VenueCode::Mexc,
      message: "missing data payload".to_string(),
    })
  }

  async fn get<T: DeserializeOwned>(
    &self,
    path: &str,
    query: &[(&str, String)],
  ) -> VenueResult<T> {
    let url = format!("{}{}", self.base_url, path);
    let envelope: Envelope<T> = self.transport.get_json(&url, query).await?;
    self.unwrap_envelope(envelope)
  }

  async fn history_page(&self, symbol: &str, page_num: i32) -> VenueResult<FundingHistoryPage> {
    self
      .get(
        "/api/v1/contract/funding_rate/history",
        &[
          ("symbol", symbol.to_string()),
          ("page_num", page_num.to_string()),
          ("page_size", PAGE_SIZE.to_string()),
        ],
      )
      .await
  }
}

#[async_trait]
impl VenueAdapter for MexcAdapter {
  fn venue(&self) -> VenueCode {
    VenueCode::Mexc
  }

  fn history_parallelism(&self) -> usize {
    3
  }

  fn online_parallelism(&self) -> usize {
    2
  }

  fn history_batch_size(&self) -> usize {
    30
  }

  async fn list_active_perpetuals(&self) -> VenueResult<Vec<SymbolPair>> {
    let details: Vec<ContractDetail> = self.get("/api/v1/contract/detail", &[]).await?;

    Ok(
      details
        .into_iter()
        .map(|d| {
          SymbolPair::funding_only(FundingSymbolInfo {
            name: d.symbol,
            // Unknown at symbol level; each observation carries its cycle.
            interval_hours: None,
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
    let floor = start_time.unwrap_or(0);
    let mut page_num = 1;
    let mut collected: Vec<FundingObservation> = Vec::new();

    loop {
      let page = self.history_page(symbol, page_num).await?;

      let mut earliest = i64::MAX;
      for entry in &page.result_list {
        earliest = earliest.min(entry.settle_time);
        collected.push(FundingObservation {
          rate: rate_from_f64(entry.funding_rate)?,
          funding_time: entry.settle_time,
          interval_hours: entry.collect_cycle,
        });
      }

      // Pages arrive newest-first; once past the floor the rest is noise.
      if page.current_page >= page.total_page || earliest < floor {
        break;
      }
      page_num += 1;
      sleep(Duration::from_millis(PAGE_DELAY_MS)).await;
    }

    collected.retain(|o| o.funding_time >= floor);
    collected.sort_by_key(|o| o.funding_time);
    Ok(collected)
  }

  async fn latest(&self, symbol: &str) -> VenueResult<FundingObservation> {
    let path = format!("/api/v1/contract/funding_rate/{}", symbol);
    let latest: LatestFundingRate = self.get(&path, &[]).await?;

    if latest.timestamp == 0 {
      return Err(VenueError::EmptyResult { venue: self.venue(), symbol: symbol.to_string() });
    }

    Ok(FundingObservation {
      rate: rate_from_f64(latest.funding_rate)?,
      funding_time: latest.timestamp,
      interval_hours: latest.collect_cycle,
    })
  }
}
