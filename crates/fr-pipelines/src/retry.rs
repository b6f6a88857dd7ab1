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

//! Retry policy for transient venue failures

use crate::error::{PipelineError, PipelineResult};
use std::future::Future;
use std::time::Duration;
use tokio_util::sync::CancellationToken;
use tracing::warn;

/// Attempts per operation; the final attempt's failure surfaces.
pub const MAX_ATTEMPTS: u32 = 3;

/// Back-off after failed attempt `k` (1-indexed) is `k` times this.
pub const BACKOFF_UNIT: Duration = Duration::from_secs(1);

/// Run `op` up to [`MAX_ATTEMPTS`] times, sleeping `k × 1 s` after failed
/// attempt `k`. Only transient errors retry; cancellation propagates
/// immediately and is never retried.
pub async fn retry_transient<T, F, Fut>(
  cancel: &CancellationToken,
  mut op: F,
) -> PipelineResult<T>
where
  F: FnMut() -> Fut,
  Fut: Future<Output = PipelineResult<T>>,
{
  for attempt in 1..=MAX_ATTEMPTS {
    if cancel.is_cancelled() {
      return Err(PipelineError::Cancelled);
    }

    match op().await {
      Ok(value) => return Ok(value),
      Err(err) if err.is_transient() && attempt < MAX_ATTEMPTS => {
        warn!("Attempt {} failed, retrying: {}", attempt, err);
        let backoff = BACKOFF_UNIT * attempt;
        tokio::select! {
          _ = cancel.cancelled() => return Err(PipelineError::Cancelled),
          _ = tokio::time::sleep(backoff) => {}
        }
      }
      Err(err) => return Err(err),
    }
  }

  unreachable!("loop returns on the final attempt")
}
