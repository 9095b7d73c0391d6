//! Position and reverse geocoding collaborators.

use async_trait::async_trait;
use reqwest::{Client, Response};
use serde::Deserialize;
use washday::location::{Coordinates, LocationError, LookupFailed, PositionSource, ReverseGeocoder};

use crate::config::geocoder::GeocoderConfig;

/// Reverse geocoder backed by a Nominatim `reverse` endpoint.
#[derive(Debug, Clone)]
pub struct NominatimGeocoder {
    url: String,
    http: Client,
}

impl NominatimGeocoder {
    /// Create a geocoder for the configured endpoint.
    ///
    /// The per-lookup deadline is enforced by the location capture itself.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be built.
    pub fn new(config: &GeocoderConfig) -> Result<Self, reqwest::Error> {
        let http = Client::builder().user_agent(&config.user_agent).build()?;

        Ok(Self {
            url: config.geocoder_url.clone(),
            http,
        })
    }
}

#[derive(Debug, Deserialize)]
struct ReverseResponse {
    #[serde(default)]
    display_name: Option<String>,
}

#[async_trait]
impl ReverseGeocoder for NominatimGeocoder {
    async fn reverse_geocode(&self, coordinates: Coordinates) -> Result<String, LookupFailed> {
        let latitude = coordinates.latitude.to_string();
        let longitude = coordinates.longitude.to_string();

        let response = self
            .http
            .get(&self.url)
            .query(&[
                ("format", "json"),
                ("lat", latitude.as_str()),
                ("lon", longitude.as_str()),
            ])
            .send()
            .await
            .and_then(Response::error_for_status)
            .map_err(|error| LookupFailed(error.to_string()))?;

        let body: ReverseResponse = response
            .json()
            .await
            .map_err(|error| LookupFailed(error.to_string()))?;

        body.display_name
            .filter(|name| !name.trim().is_empty())
            .ok_or_else(|| LookupFailed("no display name for coordinates".to_string()))
    }
}

/// Reverse geocoder that never resolves, so captures use formatted coordinates.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoGeocoder;

#[async_trait]
impl ReverseGeocoder for NoGeocoder {
    async fn reverse_geocode(&self, _coordinates: Coordinates) -> Result<String, LookupFailed> {
        Err(LookupFailed("reverse geocoding disabled".to_string()))
    }
}

/// Device position supplied up front, e.g. from command-line coordinates.
#[derive(Debug, Clone, Copy, Default)]
pub struct FixedPosition(Option<Coordinates>);

impl FixedPosition {
    /// A source answering with `coordinates`, or failing when there are none.
    pub fn new(coordinates: Option<Coordinates>) -> Self {
        Self(coordinates)
    }
}

#[async_trait]
impl PositionSource for FixedPosition {
    async fn current_position(&self) -> Result<Coordinates, LocationError> {
        self.0.ok_or(LocationError::Unsupported)
    }
}
