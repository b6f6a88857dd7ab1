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

use bigdecimal::BigDecimal;
use diesel::prelude::*;
use diesel_async::{AsyncConnection, RunQueryDsl, scoped_futures::ScopedFutureExt};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::schema::funding_online;

/// The latest funding observation per (symbol, venue); updated in place.
#[derive(
  Queryable, QueryableByName, Selectable, Identifiable, Debug, Clone, Serialize, Deserialize,
)]
#[diesel(table_name = funding_online)]
pub struct FundingOnline {
  pub id: Uuid,
  pub exchange_id: Uuid,
  pub symbol: String,
  pub name: String,
  pub interval_hours: i32,
  pub rate: BigDecimal,
  pub open_interest: BigDecimal,
  pub ts_rate: i64,
  pub fetched_at: i64,
}

#[derive(Insertable, Debug, Clone)]
#[diesel(table_name = funding_online)]
pub struct NewFundingOnline {
  pub id: Uuid,
  pub exchange_id: Uuid,
  pub symbol: String,
  pub name: String,
  pub interval_hours: i32,
  pub rate: BigDecimal,
  pub open_interest: BigDecimal,
  pub ts_rate: i64,
  pub fetched_at: i64,
}

/// Fields rewritten when an existing row is refreshed; `id` never changes.
#[derive(AsChangeset, Debug, Clone)]
#[diesel(table_name = funding_online)]
pub struct FundingOnlineUpdate {
  pub name: String,
  pub interval_hours: i32,
  pub rate: BigDecimal,
  pub open_interest: BigDecimal,
  pub ts_rate: i64,
  pub fetched_at: i64,
}

impl FundingOnline {
  pub async fn list_for_exchange(
    conn: &mut diesel_async::AsyncPgConnection,
    exchange: Uuid,
  ) -> Result<Vec<FundingOnline>, diesel::result::Error> {
    funding_online::table
      .filter(funding_online::exchange_id.eq(exchange))
      .order(funding_online::symbol.asc())
      .load::<FundingOnline>(conn)
      .await
  }

  /// One transactional commit per online job run: updates first, then
  /// creates, then commit.
  pub async fn commit_snapshot(
    conn: &mut diesel_async::AsyncPgConnection,
    updates: Vec<(Uuid, FundingOnlineUpdate)>,
    creates: Vec<NewFundingOnline>,
  ) -> Result<(usize, usize), diesel::result::Error> {
    conn
      .transaction::<_, diesel::result::Error, _>(|conn| {
        async move {
          let mut updated = 0;
          for (row_id, changes) in updates {
            updated += diesel::update(funding_online::table.find(row_id))
              .set(&changes)
              .execute(conn)
              .await?;
          }

          let mut created = 0;
          for chunk in creates.chunks(1000) {
            created +=
              diesel::insert_into(funding_online::table).values(chunk).execute(conn).await?;
          }

          Ok((updated, created))
        }
        .scope_boxed()
      })
      .await
  }
}
