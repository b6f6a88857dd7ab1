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

//! # fr-database
//!
//! PostgreSQL storage for funding-rate data.
//!
//! This crate provides async database operations using Diesel ORM with BB8
//! connection pooling:
//!
//! - **Async Support**: Uses `diesel-async` with BB8 connection pool
//! - **Repository Pattern**: Trait-object stores so pipelines stay testable
//! - **Bulk Insert**: Chunked multi-row inserts with no separate save step
//!
//! ## Example
//!
//! ```ignore
//! use fr_database::{establish_pool, PgStorage};
//!
//! let pool = establish_pool(&database_url).await?;
//! let storage = PgStorage::new(pool);
//! ```

pub mod connection;
pub mod models;
pub mod repository;
pub mod schema;

// Re-export commonly used items
pub use connection::{DbPool, establish_pool};
pub use models::{
  Exchange, FundingHistory, FundingOnline, FundingOnlineUpdate, LatestRate, NewExchange,
  NewFundingHistory, NewFundingOnline,
};
pub use repository::{
  ExchangeStore, HistoryStore, OnlineStore, PgStorage, RateFilter, StoreError, StoreResult,
};
