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

//! End-to-end online pipeline scenarios over a scripted adapter

mod support;

use fr_core::{VenueCode, now_ms};
use fr_pipelines::OnlinePipeline;
use std::collections::HashMap;
use std::sync::Arc;
use std::sync::atomic::Ordering;
use support::{HOUR_MS, MemStorage, MockAdapter, obs};
use tokio_util::sync::CancellationToken;
use uuid::Uuid;

fn pipeline(adapter: MockAdapter, storage: Arc<MemStorage>) -> OnlinePipeline {
  OnlinePipeline::new(Arc::new(adapter), storage.clone(), storage)
}

#[tokio::test]
async fn snapshot_creates_new_and_updates_existing_rows() {
  let (storage, exchange_id) = MemStorage::default().with_exchange(VenueCode::Hyperliquid);
  let storage = Arc::new(storage);

  let stale = now_ms() - 3 * HOUR_MS;
  let btc_id = storage.seed_online(exchange_id, "BTC", 1, stale);
  let eth_id = storage.seed_online(exchange_id, "ETH", 1, stale);

  let fresh = now_ms() - 10 * 60 * 1000;
  let adapter = MockAdapter::new(VenueCode::Hyperliquid)
    .with_symbol("BTC", Some(1), vec![obs("0.0001", fresh, None)])
    .with_symbol("ETH", Some(1), vec![obs("0.0002", fresh, None)])
    .with_symbol("SOL", Some(1), vec![obs("0.0003", fresh, None)]);

  let report = pipeline(adapter, storage.clone()).run(&CancellationToken::new()).await.unwrap();

  assert_eq!(report.created, 1);
  assert_eq!(report.updated, 2);
  assert_eq!(report.symbols_failed, 0);
  // Everything lands in one commit.
  assert_eq!(storage.commit_calls.load(Ordering::SeqCst), 1);

  let rows = storage.online.lock().unwrap();
  assert_eq!(rows.len(), 3);

  let by_symbol: HashMap<&str, &_> =
    rows.iter().map(|r| (r.symbol.as_str(), r)).collect();
  // Updated rows keep their original ids.
  assert_eq!(by_symbol["BTC"].id, btc_id);
  assert_eq!(by_symbol["ETH"].id, eth_id);
  assert_eq!(by_symbol["BTC"].ts_rate, fresh);
  // The created row has a fresh id.
  assert_ne!(by_symbol["SOL"].id, btc_id);
  assert_ne!(by_symbol["SOL"].id, eth_id);
}

#[tokio::test]
async fn second_run_with_no_new_observations_preserves_ids_and_rates() {
  let (storage, _) = MemStorage::default().with_exchange(VenueCode::Bybit);
  let storage = Arc::new(storage);

  let ts = now_ms() - 30 * 60 * 1000;
  let adapter = Arc::new(
    MockAdapter::new(VenueCode::Bybit)
      .with_symbol("BTCUSDT", Some(8), vec![obs("0.0001", ts, None)])
      .with_symbol("ETHUSDT", Some(8), vec![obs("-0.0002", ts, None)]),
  );

  let pipeline = OnlinePipeline::new(adapter.clone(), storage.clone(), storage.clone());

  pipeline.run(&CancellationToken::new()).await.unwrap();
  let first: Vec<(Uuid, String)> = storage
    .online
    .lock()
    .unwrap()
    .iter()
    .map(|r| (r.id, r.rate.to_string()))
    .collect();

  let report = pipeline.run(&CancellationToken::new()).await.unwrap();
  assert_eq!(report.created, 0);
  assert_eq!(report.updated, 2);

  let second: Vec<(Uuid, String)> = storage
    .online
    .lock()
    .unwrap()
    .iter()
    .map(|r| (r.id, r.rate.to_string()))
    .collect();
  assert_eq!(first, second);
}

#[tokio::test]
async fn zero_funding_time_is_rejected() {
  let (storage, _) = MemStorage::default().with_exchange(VenueCode::Mexc);
  let storage = Arc::new(storage);

  let adapter = MockAdapter::new(VenueCode::Mexc)
    .with_symbol("BTC_USDT", None, vec![obs("0.0001", 0, Some(8))])
    .with_symbol("ETH_USDT", None, vec![obs("0.0002", now_ms() - HOUR_MS, Some(8))]);

  let report = pipeline(adapter, storage.clone()).run(&CancellationToken::new()).await.unwrap();

  assert_eq!(report.symbols_failed, 1);
  assert_eq!(report.failed_symbols, vec!["BTC_USDT".to_string()]);
  assert_eq!(report.created, 1);

  let rows = storage.online.lock().unwrap();
  assert_eq!(rows.len(), 1);
  assert_eq!(rows[0].symbol, "ETHUSDT");
  assert_eq!(rows[0].name, "ETH_USDT");
}

#[tokio::test]
async fn colliding_raw_names_keep_only_the_first_variant() {
  let (storage, _) = MemStorage::default().with_exchange(VenueCode::Mexc);
  let storage = Arc::new(storage);

  let ts = now_ms() - HOUR_MS;
  let adapter = MockAdapter::new(VenueCode::Mexc)
    .with_symbol("BTC_USDT", None, vec![obs("0.0001", ts, Some(8))])
    .with_symbol("BTCUSDT", None, vec![obs("0.0009", ts, Some(8))]);

  let report = pipeline(adapter, storage.clone()).run(&CancellationToken::new()).await.unwrap();

  assert_eq!(report.created, 1);
  assert_eq!(report.symbols_skipped, 1);
  assert_eq!(storage.online.lock().unwrap().len(), 1);
  assert_eq!(storage.online.lock().unwrap()[0].symbol, "BTCUSDT");
}

#[tokio::test(start_paused = true)]
async fn persistent_catalog_failure_yields_empty_report() {
  let (storage, _) = MemStorage::default().with_exchange(VenueCode::Binance);
  let storage = Arc::new(storage);

  let adapter = MockAdapter::new(VenueCode::Binance)
    .with_symbol("BTCUSDT", Some(8), vec![obs("0.0001", now_ms() - HOUR_MS, None)])
    .with_catalog_failures(99);

  let report = pipeline(adapter, storage.clone()).run(&CancellationToken::new()).await.unwrap();

  assert_eq!(report.created, 0);
  assert_eq!(report.updated, 0);
  assert!(storage.online.lock().unwrap().is_empty());
  assert_eq!(storage.commit_calls.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn empty_latest_result_skips_the_symbol() {
  let (storage, _) = MemStorage::default().with_exchange(VenueCode::Hyperliquid);
  let storage = Arc::new(storage);

  let adapter = MockAdapter::new(VenueCode::Hyperliquid)
    .with_symbol("BTC", Some(1), vec![obs("0.0001", now_ms() - HOUR_MS, None)])
    // No observations at all: the venue answers with an empty payload.
    .with_symbol("DOGE", Some(1), vec![]);

  let report = pipeline(adapter, storage.clone()).run(&CancellationToken::new()).await.unwrap();

  assert_eq!(report.created, 1);
  assert_eq!(report.symbols_skipped, 1);
  assert_eq!(report.symbols_failed, 0);
}

#[tokio::test]
async fn missing_exchange_row_short_circuits() {
  let storage = Arc::new(MemStorage::default());
  let adapter = MockAdapter::new(VenueCode::Bybit).with_symbol(
    "BTCUSDT",
    Some(8),
    vec![obs("0.0001", now_ms() - HOUR_MS, None)],
  );

  let report = pipeline(adapter, storage.clone()).run(&CancellationToken::new()).await.unwrap();

  assert_eq!(report.created + report.updated, 0);
  assert!(storage.online.lock().unwrap().is_empty());
}

#[tokio::test(start_paused = true)]
async fn transient_latest_failure_recovers_within_the_run() {
  let (storage, _) = MemStorage::default().with_exchange(VenueCode::Mexc);
  let storage = Arc::new(storage);

  let ts = now_ms() - HOUR_MS;
  let adapter = Arc::new(
    MockAdapter::new(VenueCode::Mexc)
      .with_symbol("BTC_USDT", None, vec![obs("0.0001", ts, Some(8))])
      .with_latest_failures("BTC_USDT", 2),
  );

  let pipeline = OnlinePipeline::new(adapter.clone(), storage.clone(), storage.clone());
  let report = pipeline.run(&CancellationToken::new()).await.unwrap();

  assert_eq!(report.created, 1);
  assert_eq!(report.symbols_failed, 0);
  // Two failures plus the success.
  assert_eq!(adapter.latest_calls.load(Ordering::SeqCst), 3);
}
