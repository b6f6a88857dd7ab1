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

//! # fr-core
//!
//! Core types, configuration, and error handling for the funding-rate service.
//!
//! This crate provides the foundational components shared across all crates:
//!
//! - [`VenueCode`] - Type-safe venue identifiers
//! - [`Config`] - Service configuration (database, schedules, timeouts)
//! - [`Error`] and [`Result`] - Unified error handling
//! - [`normalize_symbol`] - The canonical symbol normalization rule
//!
//! ## Example
//!
//! ```
//! use fr_core::{VenueCode, normalize_symbol};
//!
//! let venue = VenueCode::Mexc;
//! assert_eq!(normalize_symbol("BTC_USDT"), "BTCUSDT");
//! ```

pub mod config;
pub mod error;
pub use config::Config;
pub use error::{Error, Result};

use serde::{Deserialize, Serialize};

/// The venues the service synchronizes funding rates from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum VenueCode {
  Binance,
  Bybit,
  Hyperliquid,
  Mexc,
}

impl VenueCode {
  /// Every supported venue, in seeding order.
  pub const ALL: [VenueCode; 4] =
    [VenueCode::Binance, VenueCode::Bybit, VenueCode::Hyperliquid, VenueCode::Mexc];

  /// The stable tag stored in the `exchanges.code` column.
  pub fn as_str(&self) -> &'static str {
    match self {
      VenueCode::Binance => "BINANCE",
      VenueCode::Bybit => "BYBIT",
      VenueCode::Hyperliquid => "HYPERLIQUID",
      VenueCode::Mexc => "MEXC",
    }
  }
}

impl std::fmt::Display for VenueCode {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    write!(f, "{}", self.as_str())
  }
}

impl std::str::FromStr for VenueCode {
  type Err = Error;

  fn from_str(s: &str) -> Result<Self> {
    match s.to_uppercase().as_str() {
      "BINANCE" => Ok(VenueCode::Binance),
      "BYBIT" => Ok(VenueCode::Bybit),
      "HYPERLIQUID" => Ok(VenueCode::Hyperliquid),
      "MEXC" => Ok(VenueCode::Mexc),
      other => Err(Error::UnknownVenue(other.to_string())),
    }
  }
}

/// Normalize a venue-raw trading symbol to its canonical form.
///
/// The canonical form is uppercase with `_` and `-` separators removed;
/// `symbol` columns always store this form, `name` columns the raw string.
pub fn normalize_symbol(raw: &str) -> String {
  raw.chars().filter(|c| *c != '_' && *c != '-').collect::<String>().to_uppercase()
}

/// Current wall-clock time as epoch milliseconds.
pub fn now_ms() -> i64 {
  chrono::Utc::now().timestamp_millis()
}

/// A funding interval expressed in milliseconds.
pub fn interval_ms(interval_hours: i32) -> i64 {
  interval_hours as i64 * 3_600_000
}

/// 2000-01-01T00:00:00Z; the backfill floor for venues that require a start time.
pub const HISTORY_EPOCH_MS: i64 = 946_684_800_000;

/// Funding intervals outside 1..=24 hours are rejected everywhere.
pub const MIN_INTERVAL_HOURS: i32 = 1;
pub const MAX_INTERVAL_HOURS: i32 = 24;

/// Whether an interval (in hours) is one the service will ingest.
pub fn is_valid_interval(interval_hours: i32) -> bool {
  (MIN_INTERVAL_HOURS..=MAX_INTERVAL_HOURS).contains(&interval_hours)
}
