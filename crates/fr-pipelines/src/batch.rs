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

//! Bounded per-symbol fan-out shared by both pipelines

use crate::error::PipelineError;
use futures::stream::{self, StreamExt};
use std::future::Future;
use std::sync::Arc;
use tokio::sync::Semaphore;
use tokio_util::sync::CancellationToken;
use tracing::debug;

/// Outcome of one bounded fan-out over a set of symbols.
#[derive(Debug)]
pub struct FanOutResult<T> {
  /// Successfully processed units, in completion order
  pub success: Vec<T>,

  /// Failed units with the symbol they belong to
  pub failures: Vec<(String, PipelineError)>,
}

impl<T> FanOutResult<T> {
  pub fn success_count(&self) -> usize {
    self.success.len()
  }

  pub fn failure_count(&self) -> usize {
    self.failures.len()
  }
}

/// Run `op` over `items` concurrently, bounded by `semaphore`.
///
/// Cancellation stops new work from being scheduled; units already running
/// finish or observe the token themselves. Per-unit failures are collected,
/// never propagated.
pub async fn fan_out<I, T, F, Fut>(
  items: Vec<(String, I)>,
  semaphore: Arc<Semaphore>,
  parallelism: usize,
  cancel: &CancellationToken,
  op: F,
) -> FanOutResult<T>
where
  I: Send + 'static,
  T: Send + 'static,
  F: Fn(String, I) -> Fut + Clone,
  Fut: Future<Output = Result<T, PipelineError>>,
{
  let total = items.len();
  debug!("Fanning out over {} symbols with parallelism {}", total, parallelism);

  let results: Vec<(String, Result<T, PipelineError>)> = stream::iter(items)
    .map(|(label, item)| {
      let op = op.clone();
      let semaphore = semaphore.clone();
      let cancel = cancel.clone();

      async move {
        if cancel.is_cancelled() {
          return (label, Err(PipelineError::Cancelled));
        }
        let _permit =
          semaphore.acquire().await.expect("Semaphore should not be closed during operation");
        let outcome = op(label.clone(), item).await;
        (label, outcome)
      }
    })
    .buffer_unordered(parallelism)
    .collect()
    .await;

  let mut out = FanOutResult { success: Vec::with_capacity(total), failures: Vec::new() };
  for (label, result) in results {
    match result {
      Ok(value) => out.success.push(value),
      Err(err) => out.failures.push((label, err)),
    }
  }
  out
}

#[cfg(test)]
mod tests {
  use super::*;
  use std::sync::atomic::{AtomicUsize, Ordering};

  #[tokio::test]
  async fn test_all_items_processed() {
    let cancel = CancellationToken::new();
    let semaphore = Arc::new(Semaphore::new(4));
    let items: Vec<(String, i32)> = (0..10).map(|i| (format!("SYM{}", i), i)).collect();

    let result =
      fan_out(items, semaphore, 4, &cancel, |_label, i| async move { Ok(i * 2) }).await;

    assert_eq!(result.success_count(), 10);
    assert_eq!(result.failure_count(), 0);
    let sum: i32 = result.success.iter().sum();
    assert_eq!(sum, 90);
  }

  #[tokio::test]
  async fn test_failures_do_not_abort_the_batch() {
    let cancel = CancellationToken::new();
    let semaphore = Arc::new(Semaphore::new(2));
    let items: Vec<(String, i32)> = (0..6).map(|i| (format!("SYM{}", i), i)).collect();

    let result = fan_out(items, semaphore, 2, &cancel, |_label, i| async move {
      if i % 2 == 0 { Ok(i) } else { Err(PipelineError::VenueApi("boom".to_string())) }
    })
    .await;

    assert_eq!(result.success_count(), 3);
    assert_eq!(result.failure_count(), 3);
    assert!(result.failures.iter().all(|(label, _)| label.starts_with("SYM")));
  }

  #[tokio::test]
  async fn test_parallelism_bounded_by_semaphore() {
    let cancel = CancellationToken::new();
    let semaphore = Arc::new(Semaphore::new(2));
    let in_flight = Arc::new(AtomicUsize::new(0));
    let peak = Arc::new(AtomicUsize::new(0));
    let items: Vec<(String, ())> = (0..8).map(|i| (format!("SYM{}", i), ())).collect();

    let in_flight_ref = in_flight.clone();
    let peak_ref = peak.clone();
    let result = fan_out(items, semaphore, 8, &cancel, move |_label, _| {
      let in_flight = in_flight_ref.clone();
      let peak = peak_ref.clone();
      async move {
        let now = in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        peak.fetch_max(now, Ordering::SeqCst);
        tokio::time::sleep(std::time::Duration::from_millis(5)).await;
        in_flight.fetch_sub(1, Ordering::SeqCst);
        Ok(())
      }
    })
    .await;

    assert_eq!(result.success_count(), 8);
    assert!(peak.load(Ordering::SeqCst) <= 2);
  }

  #[tokio::test]
  async fn test_cancellation_stops_scheduling() {
    let cancel = CancellationToken::new();
    cancel.cancel();
    let semaphore = Arc::new(Semaphore::new(2));
    let items: Vec<(String, ())> = (0..4).map(|i| (format!("SYM{}", i), ())).collect();

    let result = fan_out(items, semaphore, 2, &cancel, |_label, _| async move { Ok(()) }).await;

    assert_eq!(result.success_count(), 0);
    assert_eq!(result.failure_count(), 4);
    assert!(result.failures.iter().all(|(_, e)| matches!(e, PipelineError::Cancelled)));
  }
}
