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
use diesel_async::RunQueryDsl;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::schema::funding_history;

/// One historical funding observation, append-only.
#[derive(
  Queryable, QueryableByName, Selectable, Identifiable, Debug, Clone, Serialize, Deserialize,
)]
#[diesel(table_name = funding_history)]
pub struct FundingHistory {
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
#[diesel(table_name = funding_history)]
pub struct NewFundingHistory {
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

/// The newest known funding event for one raw symbol name.
#[derive(Queryable, Debug, Clone)]
pub struct LatestRate {
  pub name: String,
  pub ts_rate: i64,
  pub interval_hours: i32,
}

impl NewFundingHistory {
  /// Batch insert; no separate save is required afterwards.
  pub async fn bulk_insert(
    conn: &mut diesel_async::AsyncPgConnection,
    records: Vec<Self>,
  ) -> Result<usize, diesel::result::Error> {
    use diesel::insert_into;

    const BATCH_SIZE: usize = 1000;
    let mut total_inserted = 0;

    for chunk in records.chunks(BATCH_SIZE) {
      let inserted = insert_into(funding_history::table).values(chunk).execute(conn).await?;
      total_inserted += inserted;
    }

    Ok(total_inserted)
  }
}

impl FundingHistory {
  pub async fn count_for_exchange(
    conn: &mut diesel_async::AsyncPgConnection,
    exchange: Uuid,
  ) -> Result<i64, diesel::result::Error> {
    funding_history::table
      .filter(funding_history::exchange_id.eq(exchange))
      .count()
      .get_result(conn)
      .await
  }

  /// Per raw name, the row with the greatest `ts_rate` for one venue.
  pub async fn latest_rates_by_name(
    conn: &mut diesel_async::AsyncPgConnection,
    exchange: Uuid,
  ) -> Result<Vec<LatestRate>, diesel::result::Error> {
    funding_history::table
      .filter(funding_history::exchange_id.eq(exchange))
      .order((funding_history::name.asc(), funding_history::ts_rate.desc()))
      .distinct_on(funding_history::name)
      .select((funding_history::name, funding_history::ts_rate, funding_history::interval_hours))
      .load::<LatestRate>(conn)
      .await
  }

  /// Per unique symbol (or symbol and venue when grouped), the row with the
  /// greatest `ts_rate`.
  pub async fn latest_symbol_rates(
    conn: &mut diesel_async::AsyncPgConnection,
    exchange: Option<Uuid>,
    group_by_exchange: bool,
    page: i64,
    size: i64,
  ) -> Result<Vec<FundingHistory>, diesel::result::Error> {
    use diesel::sql_query;
    use diesel::sql_types::{BigInt, Nullable, Uuid as SqlUuid};

    let distinct_cols = if group_by_exchange { "symbol, exchange_id" } else { "symbol" };

    sql_query(format!(
      r#"
            SELECT id, exchange_id, symbol, name, interval_hours,
                   rate, open_interest, ts_rate, fetched_at
            FROM (
                SELECT DISTINCT ON ({distinct}) *
                FROM funding_history
                WHERE ($1 IS NULL OR exchange_id = $1)
                ORDER BY {distinct}, ts_rate DESC
            ) latest
            ORDER BY symbol ASC
            OFFSET $2 LIMIT $3
            "#,
      distinct = distinct_cols
    ))
    .bind::<Nullable<SqlUuid>, _>(exchange)
    .bind::<BigInt, _>(page * size)
    .bind::<BigInt, _>(size)
    .load::<FundingHistory>(conn)
    .await
  }
}
