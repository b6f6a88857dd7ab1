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

mod commands;

use anyhow::Result;
use clap::{Parser, Subcommand};
use dotenvy::dotenv;
use fr_core::Config;

#[derive(Parser, Debug)]
#[command(name = "fr", about = "Funding-rate synchronization service", version)]
struct Cli {
  #[command(subcommand)]
  command: Commands,

  /// Enable debug logging
  #[arg(short, long, global = true)]
  verbose: bool,
}

#[derive(Subcommand, Debug)]
enum Commands {
  /// Seed the venue table
  Seed,

  /// Run one sync pass outside the scheduler
  Sync(commands::sync::SyncCommand),

  /// Run the cron scheduler until interrupted
  Serve,

  /// Query stored funding rates
  Query(commands::query::QueryCommand),
}

#[tokio::main]
async fn main() -> Result<()> {
  // Load environment variables
  dotenv().ok();

  // Parse CLI arguments
  let cli = Cli::parse();

  // Initialize logging
  let log_level = if cli.verbose { "debug" } else { "info" };
  tracing_subscriber::fmt().with_env_filter(log_level).init();

  // Load configuration
  let config = Config::from_env()?;

  // Execute command
  match cli.command {
    Commands::Seed => commands::seed::execute(config).await?,
    Commands::Sync(cmd) => commands::sync::execute(cmd, config).await?,
    Commands::Serve => commands::serve::execute(config).await?,
    Commands::Query(cmd) => commands::query::execute(cmd, config).await?,
  }

  Ok(())
}
