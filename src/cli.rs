//! Command-line configuration.
//!
//! Every option can also come from an environment variable, so the reader
//! can be pointed at a different backend without retyping flags.

use std::path::PathBuf;
use std::time::Duration;

use clap::Parser;

use crate::source::Timeframe;

/// Terminal reader for summarized AI news.
///
/// # Examples
///
/// ```sh
/// # Local backend, default 7-day window
/// newsfeed-tui
///
/// # Remote backend, open on the yearly trends
/// newsfeed-tui --api-base https://news.example.com --timeframe 1y
/// ```
#[derive(Parser, Debug)]
#[command(author, version, about)]
pub struct Cli {
    /// Base URL of the news backend
    #[arg(long, env = "NEWSFEED_API_BASE", default_value = "http://localhost:8000")]
    pub api_base: String,

    /// Timeframe to open with (1d, 7d, 30d, 1y)
    #[arg(short, long, env = "NEWSFEED_TIMEFRAME", default_value = "7d")]
    pub timeframe: Timeframe,

    /// Per-request timeout in seconds
    #[arg(long, env = "NEWSFEED_TIMEOUT_SECS", default_value_t = 30)]
    pub timeout_secs: u64,

    /// File that receives the log output (the terminal belongs to the UI)
    #[arg(long, env = "NEWSFEED_LOG_FILE", default_value = "newsfeed-tui.log")]
    pub log_file: PathBuf,
}

impl Cli {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs.max(1))
    }
}
