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

use crate::error::{Error, Result};
use dotenvy::dotenv;
use serde::{Deserialize, Serialize};
use std::env;

/// Cron expression fired for every venue's history job unless overridden.
pub const DEFAULT_HISTORY_CRON: &str = "*/15 * * * * *";

/// Cron expression fired for every venue's online job unless overridden.
pub const DEFAULT_ONLINE_CRON: &str = "*/10 * * * * *";

/// Main configuration for the funding-rate service
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Config {
  /// Postgres connection string
  pub database_url: String,

  /// Cron schedule for the per-venue history sync jobs
  pub history_cron: String,

  /// Cron schedule for the per-venue online snapshot jobs
  pub online_cron: String,

  /// HTTP request timeout in seconds for venue calls
  pub timeout_secs: u64,
}

impl Config {
  /// Load configuration from environment variables
  pub fn from_env() -> Result<Self> {
    dotenv().ok();

    let database_url = env::var("DATABASE_URL")
      .map_err(|_| Error::Config("DATABASE_URL not set".to_string()))?;

    let history_cron =
      env::var("FR_HISTORY_CRON").unwrap_or_else(|_| DEFAULT_HISTORY_CRON.to_string());

    let online_cron =
      env::var("FR_ONLINE_CRON").unwrap_or_else(|_| DEFAULT_ONLINE_CRON.to_string());

    let timeout_secs = env::var("FR_TIMEOUT_SECS")
      .unwrap_or_else(|_| "30".to_string())
      .parse()
      .map_err(|_| Error::Config("Invalid FR_TIMEOUT_SECS".to_string()))?;

    Ok(Config { database_url, history_cron, online_cron, timeout_secs })
  }

  /// Create a config with default values (for testing)
  pub fn default_with_database(database_url: String) -> Self {
    Config {
      database_url,
      history_cron: DEFAULT_HISTORY_CRON.to_string(),
      online_cron: DEFAULT_ONLINE_CRON.to_string(),
      timeout_secs: 30,
    }
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn test_config_from_env() {
    env::set_var("DATABASE_URL", "postgres://localhost/funding_test");
    let config = Config::from_env().unwrap();
    assert_eq!(config.database_url, "postgres://localhost/funding_test");
    assert_eq!(config.timeout_secs, 30);
  }

  #[test]
  fn test_config_default_crons() {
    let config = Config::default_with_database("postgres://x".to_string());
    assert_eq!(config.history_cron, "*/15 * * * * *");
    assert_eq!(config.online_cron, "*/10 * * * * *");
  }
}
