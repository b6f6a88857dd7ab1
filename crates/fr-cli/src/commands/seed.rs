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

//! Seed the venue table with every supported venue

use anyhow::Result;
use fr_core::{Config, VenueCode};
use fr_database::{ExchangeStore, NewExchange};
use tracing::info;
use uuid::Uuid;

pub async fn execute(config: Config) -> Result<()> {
  let storage = super::storage(&config).await?;

  let mut inserted = 0;
  for venue in VenueCode::ALL {
    let rows = storage
      .insert(NewExchange { id: Uuid::new_v4(), code: venue.as_str().to_string() })
      .await?;
    if rows > 0 {
      info!("Seeded venue {}", venue);
      inserted += rows;
    }
  }

  println!("Seeded {} venues ({} already present)", inserted, VenueCode::ALL.len() - inserted);
  Ok(())
}
