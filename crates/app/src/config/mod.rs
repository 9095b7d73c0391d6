//! Application configuration

use std::path::PathBuf;

use clap::Args;
use washday::catalog::{Catalog, CatalogError};

use crate::config::{api::ApiConfig, geocoder::GeocoderConfig, observability::LoggingConfig};

pub mod api;
pub mod geocoder;
pub mod observability;

/// Settings shared by every command.
#[derive(Debug, Args)]
pub struct AppConfig {
    /// Order API settings.
    #[command(flatten)]
    pub api: ApiConfig,

    /// Reverse geocoder settings.
    #[command(flatten)]
    pub geocoder: GeocoderConfig,

    /// Logging output settings.
    #[command(flatten)]
    pub logging: LoggingConfig,

    /// JSON file holding the signed-in customer's token and profile
    #[arg(long, env = "WASHDAY_AUTH_FILE")]
    pub auth_file: Option<PathBuf>,

    /// YAML price list replacing the built-in catalog
    #[arg(long, env = "WASHDAY_CATALOG")]
    pub catalog: Option<PathBuf>,
}

impl AppConfig {
    /// Load the configured catalog, or the built-in one.
    ///
    /// # Errors
    ///
    /// Returns a [`CatalogError`] if the catalog file cannot be read or is invalid.
    pub fn load_catalog(&self) -> Result<Catalog, CatalogError> {
        match &self.catalog {
            Some(path) => Catalog::load(path),
            None => Catalog::standard(),
        }
    }
}
