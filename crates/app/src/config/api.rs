//! Order API Config

use std::time::Duration;

use clap::Args;

/// Order API settings.
#[derive(Debug, Args)]
pub struct ApiConfig {
    /// Base URL of the order API
    #[arg(long, env = "WASHDAY_API_URL", default_value = "http://localhost:5000/api")]
    pub api_url: String,

    /// Request timeout in seconds
    #[arg(long, env = "WASHDAY_API_TIMEOUT_SECONDS", default_value_t = 15u64)]
    pub api_timeout_seconds: u64,
}

impl ApiConfig {
    /// Request timeout.
    #[must_use]
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.api_timeout_seconds)
    }

    /// Base URL without a trailing slash.
    #[must_use]
    pub fn base_url(&self) -> &str {
        self.api_url.trim_end_matches('/')
    }
}
