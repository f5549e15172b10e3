//! Runtime configuration.
//!
//! Every option can be given as a flag or through the environment, so the
//! same binary runs locally (`--port 4000`) and behind a platform that only
//! injects env vars (`PORT=4000`).

use std::net::SocketAddr;
use std::time::Duration;

use anyhow::{anyhow, Context, Result};
use chrono::FixedOffset;
use clap::Parser;

/// Command-line arguments for the analytics server.
///
/// # Examples
///
/// ```sh
/// pageview-analytics --port 4000 --utc-offset-minutes 180
/// SEED_DEMO=300 pageview-analytics --log-json
/// ```
#[derive(Parser, Debug, Clone)]
#[command(author, version, about = "In-memory page-view analytics with a live stats feed")]
pub struct Config {
    /// Interface to bind
    #[arg(long, env = "HOST", default_value = "0.0.0.0")]
    pub host: String,

    /// Port to listen on
    #[arg(short, long, env = "PORT", default_value_t = 3000)]
    pub port: u16,

    /// Directory served for any path that is not an API route
    #[arg(long, env = "STATIC_DIR", default_value = "static")]
    pub static_dir: String,

    /// Externally reachable base URL, baked into the tracking snippet
    #[arg(long, env = "PUBLIC_URL", default_value = "http://localhost:3000")]
    pub public_url: String,

    /// Length of the `recent` list when the caller does not ask for one
    #[arg(long, env = "RECENT_LIMIT", default_value_t = 10)]
    pub recent_limit: usize,

    /// Tick of the SSE stats stream, in milliseconds
    #[arg(long, env = "STREAM_INTERVAL_MS", default_value_t = 5_000)]
    pub stream_interval_ms: u64,

    /// Offset from UTC, in minutes, used for the hour-of-day chart labels
    #[arg(long, env = "UTC_OFFSET_MINUTES", default_value_t = 0, allow_negative_numbers = true)]
    pub utc_offset_minutes: i32,

    /// Number of synthetic page views to load at startup (0 disables)
    #[arg(long, env = "SEED_DEMO", default_value_t = 0)]
    pub seed_demo: usize,

    /// Accept `DELETE /api/stats`, which wipes every held page view
    #[arg(long, env = "ALLOW_RESET")]
    pub allow_reset: bool,

    /// Emit logs as JSON lines
    #[arg(long, env = "LOG_JSON")]
    pub log_json: bool,

    /// Log filter used when RUST_LOG is not set
    #[arg(long, env = "LOG_FILTER", default_value = "info")]
    pub log_filter: String,
}

impl Config {
    pub fn bind_addr(&self) -> Result<SocketAddr> {
        format!("{}:{}", self.host, self.port)
            .parse()
            .with_context(|| format!("invalid bind address {}:{}", self.host, self.port))
    }

    pub fn utc_offset(&self) -> Result<FixedOffset> {
        self.utc_offset_minutes
            .checked_mul(60)
            .and_then(FixedOffset::east_opt)
            .ok_or_else(|| anyhow!("UTC offset {} minutes is out of range", self.utc_offset_minutes))
    }

    pub fn stream_interval(&self) -> Duration {
        Duration::from_millis(self.stream_interval_ms.max(100))
    }

    /// Endpoint the tracking snippet posts to.
    pub fn track_url(&self) -> String {
        format!("{}/api/track", self.public_url.trim_end_matches('/'))
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".into(),
            port: 3000,
            static_dir: "static".into(),
            public_url: "http://localhost:3000".into(),
            recent_limit: 10,
            stream_interval_ms: 5_000,
            utc_offset_minutes: 0,
            seed_demo: 0,
            allow_reset: false,
            log_json: false,
            log_filter: "info".into(),
        }
    }
}
