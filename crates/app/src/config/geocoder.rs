//! Geocoder Config

use std::time::Duration;

use clap::Args;

/// Reverse geocoder settings.
#[derive(Debug, Args)]
pub struct GeocoderConfig {
    /// Reverse geocoding endpoint
    #[arg(
        long,
        env = "WASHDAY_GEOCODER_URL",
        default_value = "https://nominatim.openstreetmap.org/reverse"
    )]
    pub geocoder_url: String,

    /// Reverse geocode timeout in milliseconds; slower lookups fall back to coordinates
    #[arg(long, env = "WASHDAY_GEOCODE_TIMEOUT_MS", default_value_t = 5_000u64)]
    pub geocode_timeout_ms: u64,

    /// User agent sent to the geocoder
    #[arg(
        long,
        env = "WASHDAY_USER_AGENT",
        default_value = concat!("washday/", env!("CARGO_PKG_VERSION"))
    )]
    pub user_agent: String,
}

impl GeocoderConfig {
    /// Reverse geocode timeout.
    #[must_use]
    pub fn geocode_timeout(&self) -> Duration {
        Duration::from_millis(self.geocode_timeout_ms)
    }
}
