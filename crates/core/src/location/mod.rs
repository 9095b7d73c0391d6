//! Live Location
//!
//! A booking must carry the customer's live location. It is captured in two steps: a
//! device position query, then a best-effort reverse geocode of the coordinates.

use std::fmt;

use async_trait::async_trait;
use jiff::Timestamp;
use mockall::automock;
use thiserror::Error;

mod capture;

pub use capture::{CaptureOutcome, CapturePolicy, GeolocationProvider, LocationCell, Locator};

/// Latitude and longitude in decimal degrees.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Coordinates {
    /// Degrees north.
    pub latitude: f64,

    /// Degrees east.
    pub longitude: f64,
}

impl Coordinates {
    /// Create coordinates.
    pub fn new(latitude: f64, longitude: f64) -> Self {
        Self {
            latitude,
            longitude,
        }
    }

    /// Address text used when reverse geocoding is unavailable.
    pub fn fallback_address(&self) -> String {
        format!("Lat: {}, Lng: {}", self.latitude, self.longitude)
    }
}

impl fmt::Display for Coordinates {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}, {}", self.latitude, self.longitude)
    }
}

/// A successfully captured live location.
#[derive(Debug, Clone, PartialEq)]
pub struct GeoCapture {
    coordinates: Coordinates,
    resolved_address: String,
    captured_at: Timestamp,
}

impl GeoCapture {
    /// Create a capture.
    pub fn new(coordinates: Coordinates, resolved_address: String, captured_at: Timestamp) -> Self {
        Self {
            coordinates,
            resolved_address,
            captured_at,
        }
    }

    /// Device coordinates.
    pub fn coordinates(&self) -> Coordinates {
        self.coordinates
    }

    /// Reverse geocoded address, or formatted coordinates when lookup failed.
    pub fn resolved_address(&self) -> &str {
        &self.resolved_address
    }

    /// When the position was captured.
    pub fn captured_at(&self) -> Timestamp {
        self.captured_at
    }
}

/// Device location could not be determined.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum LocationError {
    /// The platform has no geolocation capability.
    #[error("geolocation is not supported on this device")]
    Unsupported,

    /// The user or platform refused the location request.
    #[error("location access was denied; enable location services")]
    Denied,

    /// The query ran but produced no position.
    #[error("unable to get location: {0}")]
    Unavailable(String),
}

/// Reverse geocoding failed.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("reverse geocode lookup failed: {0}")]
pub struct LookupFailed(pub String);

/// Source of the device's current position.
#[automock]
#[async_trait]
pub trait PositionSource: Send + Sync {
    /// Query the current position.
    async fn current_position(&self) -> Result<Coordinates, LocationError>;
}

/// Resolves coordinates into a display address.
#[automock]
#[async_trait]
pub trait ReverseGeocoder: Send + Sync {
    /// Look up a display address for the coordinates.
    async fn reverse_geocode(&self, coordinates: Coordinates) -> Result<String, LookupFailed>;
}
