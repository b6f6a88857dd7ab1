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

//! Repository abstraction over the funding-rate tables
//!
//! Pipelines consume these traits; the Postgres implementations run over the
//! shared bb8 pool. Trait objects keep the pipelines testable without a
//! database.

use async_trait::async_trait;
use diesel::prelude::*;
use diesel::result::Error as DieselError;
use diesel_async::RunQueryDsl;
use fr_core::VenueCode;
use log::error;
use thiserror::Error;
use uuid::Uuid;

use crate::connection::DbPool;
use crate::models::{
  Exchange, FundingHistory, FundingOnline, FundingOnlineUpdate, LatestRate, NewExchange,
  NewFundingHistory, NewFundingOnline,
};
use crate::schema::{funding_history, funding_online};

/// Storage errors
#[derive(Error, Debug)]
pub enum StoreError {
  #[error("Connection pool error: {0}")]
  Pool(String),

  #[error("Database query error: {0}")]
  Query(String),

  #[error("Not found: {0}")]
  NotFound(String),

  #[error("Constraint violation: {0}")]
  ConstraintViolation(String),
}

impl From<DieselError> for StoreError {
  fn from(err: DieselError) -> Self {
    match err {
      DieselError::NotFound => StoreError::NotFound("Record not found".to_string()),
      DieselError::DatabaseError(kind, info) => match kind {
        diesel::result::DatabaseErrorKind::UniqueViolation
        | diesel::result::DatabaseErrorKind::ForeignKeyViolation => {
          StoreError::ConstraintViolation(info.message().to_string())
        }
        _ => StoreError::Query(info.message().to_string()),
      },
      other => StoreError::Query(other.to_string()),
    }
  }
}

pub type StoreResult<T> = Result<T, StoreError>;

/// Row filter shared by the query operations.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RateFilter {
  pub exchange_id: Option<Uuid>,
  pub symbol: Option<String>,
  pub from_ts: Option<i64>,
  pub to_ts: Option<i64>,
}

impl RateFilter {
  pub fn for_exchange(exchange_id: Uuid) -> Self {
    Self { exchange_id: Some(exchange_id), ..Default::default() }
  }

  pub fn with_symbol(mut self, symbol: impl Into<String>) -> Self {
    self.symbol = Some(symbol.into());
    self
  }
}

#[async_trait]
pub trait ExchangeStore: Send + Sync {
  async fn get_by_code(&self, code: VenueCode) -> StoreResult<Option<Exchange>>;
  async fn list(&self) -> StoreResult<Vec<Exchange>>;
  /// Seeding only; a no-op when the code already exists.
  async fn insert(&self, row: NewExchange) -> StoreResult<usize>;
}

#[async_trait]
pub trait HistoryStore: Send + Sync {
  async fn count_for_exchange(&self, exchange_id: Uuid) -> StoreResult<i64>;
  async fn latest_rates_by_name(&self, exchange_id: Uuid) -> StoreResult<Vec<LatestRate>>;
  /// Batch insert; commits on return, no separate save.
  async fn bulk_insert(&self, rows: Vec<NewFundingHistory>) -> StoreResult<usize>;
  async fn get_by_filter(
    &self,
    filter: &RateFilter,
    page: i64,
    size: i64,
  ) -> StoreResult<Vec<FundingHistory>>;
  async fn get_count_by_filter(&self, filter: &RateFilter) -> StoreResult<i64>;
  async fn get_unique_symbols_count(&self, filter: &RateFilter) -> StoreResult<i64>;
  async fn get_latest_symbol_rates(
    &self,
    exchange_id: Option<Uuid>,
    group_by_exchange: bool,
    page: i64,
    size: i64,
  ) -> StoreResult<Vec<FundingHistory>>;
}

#[async_trait]
pub trait OnlineStore: Send + Sync {
  async fn get_for_exchange(&self, exchange_id: Uuid) -> StoreResult<Vec<FundingOnline>>;
  /// Updates first, then creates, one commit.
  async fn commit_snapshot(
    &self,
    updates: Vec<(Uuid, FundingOnlineUpdate)>,
    creates: Vec<NewFundingOnline>,
  ) -> StoreResult<(usize, usize)>;
  async fn get_by_filter(
    &self,
    filter: &RateFilter,
    page: i64,
    size: i64,
  ) -> StoreResult<Vec<FundingOnline>>;
  async fn get_count_by_filter(&self, filter: &RateFilter) -> StoreResult<i64>;
  async fn get_unique_symbols_count(&self) -> StoreResult<i64>;
  async fn get_latest_symbol_funding_rates(
    &self,
    page: i64,
    size: i64,
  ) -> StoreResult<Vec<FundingOnline>>;
}

/// Postgres implementation of every store, sharing one pool.
#[derive(Clone)]
pub struct PgStorage {
  pool: DbPool,
}

impl PgStorage {
  pub fn new(pool: DbPool) -> Self {
    Self { pool }
  }

  async fn conn(
    &self,
  ) -> StoreResult<
    diesel_async::pooled_connection::bb8::PooledConnection<'_, diesel_async::AsyncPgConnection>,
  > {
    self.pool.get().await.map_err(|e| {
      error!("Failed to check out a database connection: {}", e);
      StoreError::Pool(e.to_string())
    })
  }
}

#[async_trait]
impl ExchangeStore for PgStorage {
  async fn get_by_code(&self, code: VenueCode) -> StoreResult<Option<Exchange>> {
    let mut conn = self.conn().await?;
    Exchange::find_by_code(&mut conn, code.as_str()).await.map_err(StoreError::from)
  }

  async fn list(&self) -> StoreResult<Vec<Exchange>> {
    let mut conn = self.conn().await?;
    Exchange::list_all(&mut conn).await.map_err(StoreError::from)
  }

  async fn insert(&self, row: NewExchange) -> StoreResult<usize> {
    let mut conn = self.conn().await?;
    row.insert_if_missing(&mut conn).await.map_err(StoreError::from)
  }
}

#[async_trait]
impl HistoryStore for PgStorage {
  async fn count_for_exchange(&self, exchange_id: Uuid) -> StoreResult<i64> {
    let mut conn = self.conn().await?;
    FundingHistory::count_for_exchange(&mut conn, exchange_id).await.map_err(StoreError::from)
  }

  async fn latest_rates_by_name(&self, exchange_id: Uuid) -> StoreResult<Vec<LatestRate>> {
    let mut conn = self.conn().await?;
    FundingHistory::latest_rates_by_name(&mut conn, exchange_id).await.map_err(StoreError::from)
  }

  async fn bulk_insert(&self, rows: Vec<NewFundingHistory>) -> StoreResult<usize> {
    let mut conn = self.conn().await?;
    NewFundingHistory::bulk_insert(&mut conn, rows).await.map_err(StoreError::from)
  }

  async fn get_by_filter(
    &self,
    filter: &RateFilter,
    page: i64,
    size: i64,
  ) -> StoreResult<Vec<FundingHistory>> {
    let mut conn = self.conn().await?;
    let mut query = funding_history::table.into_boxed();
    if let Some(exchange_id) = filter.exchange_id {
      query = query.filter(funding_history::exchange_id.eq(exchange_id));
    }
    if let Some(symbol) = &filter.symbol {
      query = query.filter(funding_history::symbol.eq(symbol.clone()));
    }
    if let Some(from_ts) = filter.from_ts {
      query = query.filter(funding_history::ts_rate.ge(from_ts));
    }
    if let Some(to_ts) = filter.to_ts {
      query = query.filter(funding_history::ts_rate.le(to_ts));
    }
    query
      .order((funding_history::symbol.asc(), funding_history::ts_rate.desc()))
      .offset(page * size)
      .limit(size)
      .load::<FundingHistory>(&mut conn)
      .await
      .map_err(StoreError::from)
  }

  async fn get_count_by_filter(&self, filter: &RateFilter) -> StoreResult<i64> {
    use diesel::dsl::count_star;

    let mut conn = self.conn().await?;
    let mut query = funding_history::table.select(count_star()).into_boxed();
    if let Some(exchange_id) = filter.exchange_id {
      query = query.filter(funding_history::exchange_id.eq(exchange_id));
    }
    if let Some(symbol) = &filter.symbol {
      query = query.filter(funding_history::symbol.eq(symbol.clone()));
    }
    if let Some(from_ts) = filter.from_ts {
      query = query.filter(funding_history::ts_rate.ge(from_ts));
    }
    if let Some(to_ts) = filter.to_ts {
      query = query.filter(funding_history::ts_rate.le(to_ts));
    }
    query.get_result(&mut conn).await.map_err(StoreError::from)
  }

  async fn get_unique_symbols_count(&self, filter: &RateFilter) -> StoreResult<i64> {
    use diesel::dsl::count_distinct;

    let mut conn = self.conn().await?;
    let mut query =
      funding_history::table.select(count_distinct(funding_history::symbol)).into_boxed();
    if let Some(exchange_id) = filter.exchange_id {
      query = query.filter(funding_history::exchange_id.eq(exchange_id));
    }
    if let Some(from_ts) = filter.from_ts {
      query = query.filter(funding_history::ts_rate.ge(from_ts));
    }
    if let Some(to_ts) = filter.to_ts {
      query = query.filter(funding_history::ts_rate.le(to_ts));
    }
    query.get_result(&mut conn).await.map_err(StoreError::from)
  }

  async fn get_latest_symbol_rates(
    &self,
    exchange_id: Option<Uuid>,
    group_by_exchange: bool,
    page: i64,
    size: i64,
  ) -> StoreResult<Vec<FundingHistory>> {
    let mut conn = self.conn().await?;
    FundingHistory::latest_symbol_rates(&mut conn, exchange_id, group_by_exchange, page, size)
      .await
      .map_err(StoreError::from)
  }
}

#[async_trait]
impl OnlineStore for PgStorage {
  async fn get_for_exchange(&self, exchange_id: Uuid) -> StoreResult<Vec<FundingOnline>> {
    let mut conn = self.conn().await?;
    FundingOnline::list_for_exchange(&mut conn, exchange_id).await.map_err(StoreError::from)
  }

  async fn commit_snapshot(
    &self,
    updates: Vec<(Uuid, FundingOnlineUpdate)>,
    creates: Vec<NewFundingOnline>,
  ) -> StoreResult<(usize, usize)> {
    let mut conn = self.conn().await?;
    FundingOnline::commit_snapshot(&mut conn, updates, creates).await.map_err(StoreError::from)
  }

  async fn get_by_filter(
    &self,
    filter: &RateFilter,
    page: i64,
    size: i64,
  ) -> StoreResult<Vec<FundingOnline>> {
    let mut conn = self.conn().await?;
    let mut query = funding_online::table.into_boxed();
    if let Some(exchange_id) = filter.exchange_id {
      query = query.filter(funding_online::exchange_id.eq(exchange_id));
    }
    if let Some(symbol) = &filter.symbol {
      query = query.filter(funding_online::symbol.eq(symbol.clone()));
    }
    if let Some(from_ts) = filter.from_ts {
      query = query.filter(funding_online::ts_rate.ge(from_ts));
    }
    if let Some(to_ts) = filter.to_ts {
      query = query.filter(funding_online::ts_rate.le(to_ts));
    }
    query
      .order(funding_online::symbol.asc())
      .offset(page * size)
      .limit(size)
      .load::<FundingOnline>(&mut conn)
      .await
      .map_err(StoreError::from)
  }

  async fn get_count_by_filter(&self, filter: &RateFilter) -> StoreResult<i64> {
    use diesel::dsl::count_star;

    let mut conn = self.conn().await?;
    let mut query = funding_online::table.select(count_star()).into_boxed();
    if let Some(exchange_id) = filter.exchange_id {
      query = query.filter(funding_online::exchange_id.eq(exchange_id));
    }
    if let Some(symbol) = &filter.symbol {
      query = query.filter(funding_online::symbol.eq(symbol.clone()));
    }
    query.get_result(&mut conn).await.map_err(StoreError::from)
  }

  async fn get_unique_symbols_count(&self) -> StoreResult<i64> {
    use diesel::dsl::count_distinct;

    let mut conn = self.conn().await?;
    funding_online::table
      .select(count_distinct(funding_online::symbol))
      .get_result(&mut conn)
      .await
      .map_err(StoreError::from)
  }

  async fn get_latest_symbol_funding_rates(
    &self,
    page: i64,
    size: i64,
  ) -> StoreResult<Vec<FundingOnline>> {
    use diesel::sql_query;
    use diesel::sql_types::BigInt;

    let mut conn = self.conn().await?;
    sql_query(
      r#"
            SELECT id, exchange_id, symbol, name, interval_hours,
                   rate, open_interest, ts_rate, fetched_at
            FROM (
                SELECT DISTINCT ON (symbol) *
                FROM funding_online
                ORDER BY symbol, ts_rate DESC
            ) latest
            ORDER BY symbol ASC
            OFFSET $1 LIMIT $2
            "#,
    )
    .bind::<BigInt, _>(page * size)
    .bind::<BigInt, _>(size)
    .load::<FundingOnline>(&mut conn)
    .await
    .map_err(StoreError::from)
  }
}
