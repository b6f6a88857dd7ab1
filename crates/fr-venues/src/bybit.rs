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

//! Bybit v5 linear perpetuals adapter
//!
//! The catalog is `category=linear` filtered to `LinearPerpetual`; the online
//! catalog additionally requires `Trading` status. The funding interval comes
//! from the instrument in minutes. History pages backward by `endTime` until
//! the earliest record reaches the requested start, then returns ascending.

use crate::adapter::{FundingObservation, FundingSymbolInfo, SymbolPair, VenueAdapter};
use crate::error::{VenueError, VenueResult};
use crate::parse_rate;
use crate::transport::Transport;
use async_trait::async_trait;
use fr_core::VenueCode;
use serde::Deserialize;
use serde::de::DeserializeOwned;

pub const BYBIT_BASE_URL: &str = "https://api.bybit.com";

const PAGE_LIMIT: usize = 200;

pub struct BybitAdapter {
  transport: Transport,
  base_url: String,
}

/// Every v5 endpoint wraps its payload in this envelope.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Envelope<T> {
  ret_code: i32,
  ret_msg: String,
  result: Option<T>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct InstrumentList {
  #[serde(default)]
  list: Vec<Instrument>,
  #[serde(default)]
  next_page_cursor: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Instrument {
  symbol: String,
  contract_type: String,
  status: String,
  /// Funding cadence in minutes
  funding_interval: i32,
  #[serde(default)]
  launch_time: Option<String>,
}

#[derive(Debug, Deserialize)]
struct FundingList {
  #[serde(default)]
  list: Vec<FundingEntry>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct FundingEntry {
  #[allow(dead_code)]
  symbol: String,
  funding_rate: String,
  funding_rate_timestamp: String,
}

impl Instrument {
  fn launch_time_ms(&self) -> Option<i64> {
    self.launch_time.as_deref().and_then(|s| s.parse().ok())
  }

  fn to_pair(&self) -> SymbolPair {
    SymbolPair::funding_only(FundingSymbolInfo {
      name: self.symbol.clone(),
      interval_hours: Some(self.funding_interval / 60),
      launch_time: self.launch_time_ms(),
    })
  }
}

impl FundingEntry {
  fn to_observation(&self) -> VenueResult<FundingObservation> {
    let funding_time: i64 = self
      .funding_rate_timestamp
      .parse()
      .map_err(|_| VenueError::Parse(format!("bad timestamp {}", self.funding_rate_timestamp)))?;
    Ok(FundingObservation {
      rate: parse_rate(&self.funding_rate)?,
      funding_time,
      interval_hours: None,
    })
  }
}

impl BybitAdapter {
  pub fn new(timeout_secs: u64) -> VenueResult<Self> {
    Ok(Self { transport: Transport::new(timeout_secs)?, base_url: BYBIT_BASE_URL.to_string() })
  }

  pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
    self.base_url = base_url.into();
    self
  }

  /// Unwrap the v5 envelope, mapping venue-reported failure to an API error.
  fn unwrap_envelope<T>(&self, envelope: Envelope<T>) -> VenueResult<T> {
    if envelope.ret_code != 0 {
      return Err(VenueError::Api {
        venue: VenueCode::Bybit,
        message: format!("retCode {}: {}", envelope.ret_code, envelope.ret_msg),
      });
    }
    envelope.result.ok_or_else(|| VenueError::Api {
      venue: VenueCode::Bybit,
      message: "missing result payload".to_string(),
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

  async fn instruments(&self) -> VenueResult<Vec<Instrument>> {
    let mut cursor: Option<String> = None;
    let mut out = Vec::new();

    loop {
      let mut query =
        vec![("category", "linear".to_string()), ("limit", "1000".to_string())];
      if let Some(c) = &cursor {
        query.push(("cursor", c.clone()));
      }
      let page: InstrumentList = self.get("/v5/market/instruments-info", &query).await?;
      out.extend(page.list);

      match page.next_page_cursor {
        Some(next) if !next.is_empty() => cursor = Some(next),
        _ => break,
      }
    }

    Ok(out)
  }

  async fn funding_page(
    &self,
    symbol: &str,
    end_time: Option<i64>,
    limit: usize,
  ) -> VenueResult<Vec<FundingEntry>> {
    let mut query = vec![
      ("category", "linear".to_string()),
      ("symbol", symbol.to_string()),
      ("limit", limit.to_string()),
    ];
    if let Some(end) = end_time {
      query.push(("endTime", end.to_string()));
    }
    let list: FundingList = self.get("/v5/market/funding/history", &query).await?;
    Ok(list.list)
  }
}

#[async_trait]
impl VenueAdapter for BybitAdapter {
  fn venue(&self) -> VenueCode {
    VenueCode::Bybit
  }

  fn history_parallelism(&self) -> usize {
    10
  }

  fn history_batch_size(&self) -> usize {
    50
  }

  async fn list_active_perpetuals(&self) -> VenueResult<Vec<SymbolPair>> {
    let instruments = self.instruments().await?;
    Ok(
      instruments
        .iter()
        .filter(|i| i.contract_type == "LinearPerpetual")
        .map(Instrument::to_pair)
        .collect(),
    )
  }

  async fn list_online_perpetuals(&self) -> VenueResult<Vec<SymbolPair>> {
    let instruments = self.instruments().await?;
    Ok(
      instruments
        .iter()
        .filter(|i| i.contract_type == "LinearPerpetual" && i.status == "Trading")
        .map(Instrument::to_pair)
        .collect(),
    )
  }

  async fn list_history(
    &self,
    symbol: &str,
    start_time: Option<i64>,
  ) -> VenueResult<Vec<FundingObservation>> {
    let floor = start_time.unwrap_or(0);
    let mut end_time: Option<i64> = None;
    let mut collected: Vec<FundingObservation> = Vec::new();

    // Newest-first pages, walking backward until the floor is reached.
    loop {
      let page = self.funding_page(symbol, end_time, PAGE_LIMIT).await?;
      if page.is_empty() {
        break;
      }

      let mut earliest = i64::MAX;
      for entry in &page {
        let obs = entry.to_observation()?;
        earliest = earliest.min(obs.funding_time);
        collected.push(obs);
      }

      if earliest <= floor || page.len() < PAGE_LIMIT {
        break;
      }
      end_time = Some(earliest - 1);
    }

    collected.retain(|o| o.funding_time >= floor);
    collected.sort_by_key(|o| o.funding_time);
    Ok(collected)
  }

  async fn latest(&self, symbol: &str) -> VenueResult<FundingObservation> {
    let page = self.funding_page(symbol, None, 1).await?;
    let entry = page
      .first()
      .ok_or_else(|| VenueError::EmptyResult { venue: self.venue(), symbol: symbol.to_string() })?;
    entry.to_observation()
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn test_envelope_failure_maps_to_api_error() {
    let raw = r#"{"retCode": 10001, "retMsg": "params error", "result": null}"#;
    let envelope: Envelope<FundingList> = serde_json::from_str(raw).unwrap();
    let adapter = BybitAdapter::new(5).unwrap();
    let err = adapter.unwrap_envelope(envelope).unwrap_err();
    assert!(matches!(err, VenueError::Api { venue: VenueCode::Bybit, .. }));
    assert!(err.to_string().contains("retCode 10001"));
  }

  #[test]
  fn test_envelope_success_unwraps_result() {
    let raw = r#"{"retCode": 0, "retMsg": "OK", "result": {"list": []}}"#;
    let envelope: Envelope<FundingList> = serde_json::from_str(raw).unwrap();
    let adapter = BybitAdapter::new(5).unwrap();
    assert!(adapter.unwrap_envelope(envelope).unwrap().list.is_empty());
  }

  #[test]
  fn test_instrument_interval_minutes_to_hours() {
    let raw = r#"{
      "symbol": "ETHUSDT", "contractType": "LinearPerpetual", "status": "Trading",
      "fundingInterval": 480, "launchTime": "1585526400000"
    }"#;
    let instrument: Instrument = serde_json::from_str(raw).unwrap();
    let pair = instrument.to_pair();
    assert_eq!(pair.interval_hours(), Some(8));
    assert_eq!(pair.backfill_start(), Some(1_585_526_400_000));
  }

  #[test]
  fn test_funding_entry_to_observation() {
    let raw = r#"{"symbol": "ETHUSDT", "fundingRate": "0.0001", "fundingRateTimestamp": "1700000000000"}"#;
    let entry: FundingEntry = serde_json::from_str(raw).unwrap();
    let obs = entry.to_observation().unwrap();
    assert_eq!(obs.funding_time, 1_700_000_000_000);
    assert_eq!(obs.interval_hours, None);
  }

  #[test]
  fn test_funding_entry_bad_timestamp() {
    let entry = FundingEntry {
      symbol: "X".to_string(),
      funding_rate: "0.1".to_string(),
      funding_rate_timestamp: "not-a-number".to_string(),
    };
    assert!(matches!(entry.to_observation(), Err(VenueError::Parse(_))));
  }
}
