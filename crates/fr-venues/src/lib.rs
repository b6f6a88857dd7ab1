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

//! # fr-venues
//!
//! Venue adapters for perpetual-futures funding-rate APIs.
//!
//! Each adapter is a pure functional view over one venue's REST surface:
//! it lists active linear perpetuals, pages through funding history in the
//! venue's native direction, fetches the latest observation, and knows the
//! venue's funding-interval rules. Retries and persistence live elsewhere;
//! adapters only honor the venue's pagination and pacing quirks.

pub mod adapter;
pub mod binance;
pub mod bybit;
pub mod error;
pub mod hyperliquid;
pub mod mexc;
pub mod transport;

pub use adapter::{
  ExchangeSymbolInfo, FundingObservation, FundingSymbolInfo, SymbolPair, VenueAdapter,
};
pub use binance::BinanceAdapter;
pub use bybit::BybitAdapter;
pub use error::{VenueError, VenueResult};
pub use hyperliquid::HyperliquidAdapter;
pub use mexc::MexcAdapter;
pub use transport::Transport;

use bigdecimal::BigDecimal;
use fr_core::VenueCode;
use std::str::FromStr;
use std::sync::Arc;

/// Parse a rate string as the venues send them ("-0.00012300").
pub(crate) fn parse_rate(raw: &str) -> VenueResult<BigDecimal> {
  BigDecimal::from_str(raw)
    .map_err(|e| VenueError::Parse(format!("invalid rate {:?}: {}", raw, e)))
}

/// Construct the adapter for a venue.
pub fn adapter_for(venue: VenueCode, timeout_secs: u64) -> VenueResult<Arc<dyn VenueAdapter>> {
  Ok(match venue {
    VenueCode::Binance => Arc::new(BinanceAdapter::new(timeout_secs)?),
    VenueCode::Bybit => Arc::new(BybitAdapter::new(timeout_secs)?),
    VenueCode::Hyperliquid => Arc::new(HyperliquidAdapter::new(timeout_secs)?),
    VenueCode::Mexc => Arc::new(MexcAdapter::new(timeout_secs)?),
  })
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn test_parse_rate_negative() {
    let rate = parse_rate("-0.00012300").unwrap();
    assert!(rate < BigDecimal::from(0));
  }

  #[test]
  fn test_parse_rate_invalid() {
    assert!(matches!(parse_rate("abc"), Err(VenueError::Parse(_))));
  }

  #[test]
  fn test_adapter_for_covers_every_venue() {
    for venue in VenueCode::ALL {
      let adapter = adapter_for(venue, 5).unwrap();
      assert_eq!(adapter.venue(), venue);
    }
  }

  #[test]
  fn test_contractual_parallelism_and_batch_sizes() {
    let binance = adapter_for(VenueCode::Binance, 5).unwrap();
    assert_eq!((binance.history_parallelism(), binance.history_batch_size()), (1, 10));

    let bybit = adapter_for(VenueCode::Bybit, 5).unwrap();
    assert_eq!((bybit.history_parallelism(), bybit.history_batch_size()), (10, 50));

    let hyperliquid = adapter_for(VenueCode::Hyperliquid, 5).unwrap();
    assert_eq!(
      (hyperliquid.history_parallelism(), hyperliquid.history_batch_size()),
      (1, 30)
    );

    let mexc = adapter_for(VenueCode::Mexc, 5).unwrap();
    assert_eq!((mexc.history_parallelism(), mexc.history_batch_size()), (3, 30));
    assert_eq!(mexc.online_parallelism(), 2);
  }

  #[test]
  fn test_default_pacing_is_dynamic() {
    let bybit = adapter_for(VenueCode::Bybit, 5).unwrap();
    let delay = bybit.pacing_delay(1000).unwrap();
    assert_eq!(delay, std::time::Duration::from_millis(100));
  }
}
