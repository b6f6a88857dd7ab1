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

//! Query operations over the stored funding rates

use anyhow::{Result, bail};
use clap::{Args, Subcommand};
use fr_core::{Config, VenueCode};
use fr_database::{ExchangeStore, HistoryStore, OnlineStore, RateFilter};
use std::str::FromStr;

#[derive(Args, Debug)]
pub struct QueryCommand {
  #[command(subcommand)]
  cmd: QueryCommands,
}

#[derive(Subcommand, Debug)]
enum QueryCommands {
  /// The newest stored rate per symbol
  Latest {
    /// Restrict to one venue
    #[arg(long)]
    venue: Option<String>,

    /// Keep one row per symbol and venue instead of per symbol
    #[arg(long)]
    group_by_venue: bool,

    #[arg(long, default_value_t = 0)]
    page: i64,

    #[arg(long, default_value_t = 50)]
    size: i64,
  },

  /// Row and symbol counts per venue
  Stats,

  /// The current online snapshot
  Online {
    #[arg(long, default_value_t = 0)]
    page: i64,

    #[arg(long, default_value_t = 50)]
    size: i64,
  },
}

pub async fn execute(cmd: QueryCommand, config: Config) -> Result<()> {
  let storage = super::storage(&config).await?;

  match cmd.cmd {
    QueryCommands::Latest { venue, group_by_venue, page, size } => {
      let exchange_id = match venue {
        Some(code) => {
          let code = VenueCode::from_str(&code)?;
          match storage.get_by_code(code).await? {
            Some(exchange) => Some(exchange.id),
            None => bail!("Venue {} not found; run `fr seed` first", code),
          }
        }
        None => None,
      };

      let rows = storage.get_latest_symbol_rates(exchange_id, group_by_venue, page, size).await?;
      println!("{:<20} {:>14} {:>9} {:>16}", "symbol", "rate", "interval", "ts_rate");
      for row in rows {
        println!(
          "{:<20} {:>14} {:>8}h {:>16}",
          row.symbol, row.rate, row.interval_hours, row.ts_rate
        );
      }
    }

    QueryCommands::Stats => {
      let exchanges = storage.list().await?;
      if exchanges.is_empty() {
        bail!("No venues seeded; run `fr seed` first");
      }

      println!("{:<14} {:>12} {:>10} {:>10}", "venue", "history", "symbols", "online");
      for exchange in exchanges {
        let filter = RateFilter::for_exchange(exchange.id);
        let history = HistoryStore::get_count_by_filter(storage.as_ref(), &filter).await?;
        let symbols = HistoryStore::get_unique_symbols_count(storage.as_ref(), &filter).await?;
        let online = OnlineStore::get_count_by_filter(storage.as_ref(), &filter).await?;
        println!("{:<14} {:>12} {:>10} {:>10}", exchange.code, history, symbols, online);
      }
    }

    QueryCommands::Online { page, size } => {
      let rows = storage.get_latest_symbol_funding_rates(page, size).await?;
      println!("{:<20} {:>14} {:>9} {:>16}", "symbol", "rate", "interval", "ts_rate");
      for row in rows {
        println!(
          "{:<20} {:>14} {:>8}h {:>16}",
          row.symbol, row.rate, row.interval_hours, row.ts_rate
        );
      }
    }
  }

  Ok(())
}
