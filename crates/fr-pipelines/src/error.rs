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

use fr_database::StoreError;
use fr_venues::VenueError;
use thiserror::Error;

#[derive(Error, Debug, Clone)]
pub enum PipelineError {
  /// A venue call failed or reported failure; retried by the kernel.
  #[error("Venue API error: {0}")]
  VenueApi(String),

  /// The venue returned no data where one observation was expected.
  #[error("Empty result: {0}")]
  EmptyResult(String),

  /// Bulk insert or save failed; aborts the job, the scheduler re-attempts.
  #[error("Database error: {0}")]
  Database(String),

  /// A row cannot be built (zero funding time, no interval source); the row
  /// is dropped and the job continues.
  #[error("Validation error: {0}")]
  Validation(String),

  /// Caller cancellation; surfaces immediately, nothing is rolled back.
  #[error("Cancelled")]
  Cancelled,
}

impl PipelineError {
  /// Only transient failures re-enter the retry loop.
  pub fn is_transient(&self) -> bool {
    matches!(self, PipelineError::VenueApi(_))
  }
}

impl From<VenueError> for PipelineError {
  fn from(err: VenueError) -> Self {
    match err {
      VenueError::EmptyResult { .. } => PipelineError::EmptyResult(err.to_string()),
      VenueError::Parse(_) => PipelineError::Validation(err.to_string()),
      VenueError::Api { .. } | VenueError::Http(_) => PipelineError::VenueApi(err.to_string()),
    }
  }
}

impl From<StoreError> for PipelineError {
  fn from(err: StoreError) -> Self {
    PipelineError::Database(err.to_string())
  }
}

pub type PipelineResult<T> = Result<T, PipelineError>;
