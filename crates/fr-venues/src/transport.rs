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

use crate::error::{VenueError, VenueResult};
use reqwest::Client;
use serde::Serialize;
use serde::de::DeserializeOwned;
use std::time::Duration;
use tracing::debug;

/// HTTP transport shared by the venue adapters
///
/// Handles the low-level HTTP communication with venue REST APIs, including
/// request construction, status checking, and JSON decoding. Retries are the
/// pipeline's responsibility, not the transport's.
#[derive(Clone)]
pub struct Transport {
  client: Client,
}

impl Transport {
  /// Create a new transport instance
  pub fn new(timeout_secs: u64) -> VenueResult<Self> {
    let client = Client::builder()
      .timeout(Duration::from_secs(timeout_secs))
      .user_agent("fr-venues/0.1")
      .build()
      .map_err(|e| VenueError::Http(format!("Failed to create HTTP client: {}", e)))?;

    Ok(Self { client })
  }

  /// Execute a GET request and decode the JSON body
  pub async fn get_json<T>(&self, url: &str, query: &[(&str, String)]) -> VenueResult<T>
  where
    T: DeserializeOwned,
  {
    debug!("GET {} {:?}", url, query);

    let response = self.client.get(url).query(query).send().await?;

    let status = response.status();
    if !status.is_success() {
      return Err(VenueError::Http(format!("HTTP error {} for {}", status, url)));
    }

    response.json::<T>().await.map_err(VenueError::from)
  }

  /// Execute a POST request with a JSON body and decode the JSON response
  pub async fn post_json<T, B>(&self, url: &str, body: &B) -> VenueResult<T>
  where
    T: DeserializeOwned,
    B: Serialize + ?Sized,
  {
    debug!("POST {}", url);

    let response = self.client.post(url).json(body).send().await?;

    let status = response.status();
    if !status.is_success() {
      return Err(VenueError::Http(format!("HTTP error {} for {}", status, url)));
    }

    response.json::<T>().await.map_err(VenueError::from)
  }
}

impl std::fmt::Debug for Transport {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    f.debug_struct("Transport").finish()
  }
}
