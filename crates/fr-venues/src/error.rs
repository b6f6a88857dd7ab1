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

use fr_core::VenueCode;
use thiserror::Error;

#[derive(Error, Debug, Clone)]
pub enum VenueError {
  /// The request succeeded at the transport layer but the venue reported
  /// failure, or a required payload was missing.
  #[error("{venue} API error: {message}")]
  Api { venue: VenueCode, message: String },

  /// The payload was valid but empty where one observation was required.
  #[error("{venue} returned no data for {symbol}")]
  EmptyResult { venue: VenueCode, symbol: String },

  #[error("HTTP error: {0}")]
  Http(String),

  #[error("Parse error: {0}")]
  Parse(String),
}

impl VenueError {
  /// Transient failures are retried by the pipeline kernel; the rest skip.
  pub fn is_transient(&self) -> bool {
    matches!(self, VenueError::Api { .. } | VenueError::Http(_))
  }
}

impl From<reqwest::Error> for VenueError {
  fn from(err: reqwest::Error) -> Self {
    if err.is_decode() {
      VenueError::Parse(err.to_string())
    } else {
      VenueError::Http(err.to_string())
    }
  }
}

pub type VenueResult<T> = Result<T, VenueError>;
