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

//! # fr-pipelines
//!
//! Funding-rate synchronization pipelines.
//!
//! This crate holds the engine proper:
//!
//! - [`HistoryPipeline`] - cold-start backfill and incremental catch-up
//! - [`OnlinePipeline`] - latest-funding snapshot per (symbol, venue)
//! - [`retry_transient`] and [`fan_out`] - the shared concurrency and retry
//!   kernel: bounded parallelism, exponential back-off, cooperative
//!   cancellation
//!
//! Pipelines consume a [`fr_venues::VenueAdapter`] and the `fr_database`
//! store traits; each instance serves one venue and owns its semaphore.

pub mod batch;
pub mod error;
pub mod history;
pub mod online;
pub mod retry;

// Re-export commonly used types
pub use batch::{FanOutResult, fan_out};
pub use error::{PipelineError, PipelineResult};
pub use history::{HistoryPipeline, HistorySyncReport, SyncAction, SyncMode};
pub use online::{OnlinePipeline, OnlineSyncReport};
pub use retry::{BACKOFF_UNIT, MAX_ATTEMPTS, retry_transient};
