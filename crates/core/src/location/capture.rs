//! Location capture sequencing

use std::{
    fmt,
    sync::{
        Arc, PoisonError, RwLock,
        atomic::{AtomicU64, Ordering},
    },
    time::Duration,
};

use jiff::Timestamp;
use tokio::time::timeout;
use tracing::{debug, warn};

use super::{Coordinates, GeoCapture, LocationError, PositionSource, ReverseGeocoder};

/// Reverse geocode lookups slower than this fall back to coordinates.
pub const DEFAULT_GEOCODE_TIMEOUT: Duration = Duration::from_secs(5);

/// Which of several overlapping captures gets to write its result.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum CapturePolicy {
    /// A completion never replaces a capture issued after it; stale completions are
    /// discarded. A newer capture that fails leaves the older result standing.
    #[default]
    LatestIssued,

    /// Every completion writes, so the last one to finish wins.
    LastCompleted,
}

/// Device position source plus reverse geocoder, with capture options.
#[derive(Clone)]
pub struct GeolocationProvider {
    positions: Arc<dyn PositionSource>,
    geocoder: Arc<dyn ReverseGeocoder>,
    geocode_timeout: Duration,
    policy: CapturePolicy,
}

impl GeolocationProvider {
    /// Create a provider with the default timeout and [`CapturePolicy::LatestIssued`].
    pub fn new(positions: Arc<dyn PositionSource>, geocoder: Arc<dyn ReverseGeocoder>) -> Self {
        Self {
            positions,
            geocoder,
            geocode_timeout: DEFAULT_GEOCODE_TIMEOUT,
            policy: CapturePolicy::default(),
        }
    }

    /// Set the reverse geocode timeout.
    #[must_use]
    pub fn with_geocode_timeout(mut self, geocode_timeout: Duration) -> Self {
        self.geocode_timeout = geocode_timeout;
        self
    }

    /// Set the overlapping capture policy.
    #[must_use]
    pub fn with_policy(mut self, policy: CapturePolicy) -> Self {
        self.policy = policy;
        self
    }

    /// Overlapping capture policy.
    pub fn policy(&self) -> CapturePolicy {
        self.policy
    }

    /// Reverse geocode timeout.
    pub fn geocode_timeout(&self) -> Duration {
        self.geocode_timeout
    }
}

impl fmt::Debug for GeolocationProvider {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GeolocationProvider")
            .field("geocode_timeout", &self.geocode_timeout)
            .field("policy", &self.policy)
            .finish_non_exhaustive()
    }
}

#[derive(Debug, Default)]
struct CaptureSlot {
    issued: AtomicU64,
    latest: RwLock<Stored>,
}

/// The applied capture and the sequence number of the request that wrote it.
#[derive(Debug, Default)]
struct Stored {
    sequence: u64,
    capture: Option<GeoCapture>,
}

/// Shared holder of a session's latest [`GeoCapture`].
///
/// Cloning shares the same slot, so a capture running on another task writes into the
/// session that issued it.
#[derive(Debug, Clone, Default)]
pub struct LocationCell(Arc<CaptureSlot>);

impl LocationCell {
    /// Create an empty cell.
    pub fn new() -> Self {
        Self::default()
    }

    /// The current capture, if any.
    pub fn get(&self) -> Option<GeoCapture> {
        self.0
            .latest
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .capture
            .clone()
    }

    /// Drop the current capture.
    pub fn clear(&self) {
        self.0
            .latest
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .capture = None;
    }

    /// Number of captures issued against this cell.
    pub fn issued(&self) -> u64 {
        self.0.issued.load(Ordering::SeqCst)
    }

    fn issue(&self) -> u64 {
        self.0.issued.fetch_add(1, Ordering::SeqCst).saturating_add(1)
    }

    fn store(&self, sequence: u64, capture: GeoCapture, policy: CapturePolicy) -> bool {
        let mut stored = self.0.latest.write().unwrap_or_else(PoisonError::into_inner);

        if policy == CapturePolicy::LatestIssued && sequence < stored.sequence {
            return false;
        }

        stored.sequence = stored.sequence.max(sequence);
        stored.capture = Some(capture);

        true
    }
}

/// Result of a completed capture.
#[derive(Debug, Clone, PartialEq)]
pub enum CaptureOutcome {
    /// The capture was written to the session.
    Applied(GeoCapture),

    /// A capture issued later had already been written, so this result was discarded.
    Superseded(GeoCapture),
}

impl CaptureOutcome {
    /// The captured location, whether or not it was applied.
    pub fn capture(&self) -> &GeoCapture {
        match self {
            Self::Applied(capture) | Self::Superseded(capture) => capture,
        }
    }

    /// Check if the capture was written to the session.
    pub fn is_applied(&self) -> bool {
        matches!(self, Self::Applied(_))
    }
}

/// Runs location captures for one session.
///
/// A locator owns clones of the provider and the session's [`LocationCell`], so it can be
/// moved onto another task while the session keeps being edited.
#[derive(Debug, Clone)]
pub struct Locator {
    provider: GeolocationProvider,
    cell: LocationCell,
}

impl Locator {
    /// Create a locator writing into `cell`.
    pub fn new(provider: GeolocationProvider, cell: LocationCell) -> Self {
        Self { provider, cell }
    }

    /// Capture the device location and write it to the session.
    ///
    /// Reverse geocoding failures and timeouts fall back to formatted coordinates and
    /// never fail the capture.
    ///
    /// # Errors
    ///
    /// Returns a [`LocationError`] if the device position could not be determined. Any
    /// earlier capture is left in place.
    pub async fn capture(&self) -> Result<CaptureOutcome, LocationError> {
        let sequence = self.cell.issue();

        debug!(sequence, "location capture issued");

        let coordinates = self
            .provider
            .positions
            .current_position()
            .await
            .inspect_err(|error| warn!(sequence, %error, "device location unavailable"))?;

        let resolved_address = self.resolve(sequence, coordinates).await;

        let capture = GeoCapture::new(coordinates, resolved_address, Timestamp::now());

        if self
            .cell
            .store(sequence, capture.clone(), self.provider.policy)
        {
            debug!(sequence, "location capture applied");

            Ok(CaptureOutcome::Applied(capture))
        } else {
            debug!(sequence, "location capture superseded by a newer request");

            Ok(CaptureOutcome::Superseded(capture))
        }
    }

    async fn resolve(&self, sequence: u64, coordinates: Coordinates) -> String {
        let lookup = self.provider.geocoder.reverse_geocode(coordinates);

        match timeout(self.provider.geocode_timeout, lookup).await {
            Ok(Ok(address)) => address,
            Ok(Err(error)) => {
                warn!(sequence, %error, "reverse geocode failed, using coordinates");

                coordinates.fallback_address()
            }
            Err(_elapsed) => {
                warn!(
                    sequence,
                    timeout_ms = self.provider.geocode_timeout.as_millis(),
                    "reverse geocode timed out, using coordinates"
                );

                coordinates.fallback_address()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use async_trait::async_trait;
    use testresult::TestResult;

    use crate::location::{LookupFailed, MockPositionSource, MockReverseGeocoder};

    use super::*;

    fn positions_at(coordinates: Coordinates) -> MockPositionSource {
        let mut positions = MockPositionSource::new();
        positions
            .expect_current_position()
            .returning(move || Ok(coordinates));
        positions
    }

    struct SlowGeocoder(Duration);

    #[async_trait]
    impl ReverseGeocoder for SlowGeocoder {
        async fn reverse_geocode(&self, _coordinates: Coordinates) -> Result<String, LookupFailed> {
            tokio::time::sleep(self.0).await;

            Ok("too late".to_string())
        }
    }

    #[tokio::test]
    async fn capture_uses_reverse_geocoded_address() -> TestResult {
        let coordinates = Coordinates::new(19.42, 72.82);
        let mut geocoder = MockReverseGeocoder::new();
        geocoder
            .expect_reverse_geocode()
            .times(1)
            .returning(|_| Ok("Nallasopara West, Palghar".to_string()));

        let cell = LocationCell::new();
        let provider =
            GeolocationProvider::new(Arc::new(positions_at(coordinates)), Arc::new(geocoder));

        let outcome = Locator::new(provider, cell.clone()).capture().await?;

        assert!(outcome.is_applied());
        assert_eq!(
            cell.get().map(|capture| capture.resolved_address().to_string()),
            Some("Nallasopara West, Palghar".to_string())
        );

        Ok(())
    }

    #[tokio::test]
    async fn failed_lookup_falls_back_to_coordinates() -> TestResult {
        let coordinates = Coordinates::new(19.42, 72.82);
        let mut geocoder = MockReverseGeocoder::new();
        geocoder
            .expect_reverse_geocode()
            .returning(|_| Err(LookupFailed("503".to_string())));

        let cell = LocationCell::new();
        let provider =
            GeolocationProvider::new(Arc::new(positions_at(coordinates)), Arc::new(geocoder));

        let outcome = Locator::new(provider, cell).capture().await?;

        assert_eq!(
            outcome.capture().resolved_address(),
            "Lat: 19.42, Lng: 72.82"
        );

        Ok(())
    }

    #[tokio::test(start_paused = true)]
    async fn slow_lookup_falls_back_to_coordinates() -> TestResult {
        let coordinates = Coordinates::new(1.5, 2.5);
        let provider = GeolocationProvider::new(
            Arc::new(positions_at(coordinates)),
            Arc::new(SlowGeocoder(Duration::from_secs(30))),
        )
        .with_geocode_timeout(Duration::from_secs(2));

        let outcome = Locator::new(provider, LocationCell::new()).capture().await?;

        assert_eq!(outcome.capture().resolved_address(), "Lat: 1.5, Lng: 2.5");

        Ok(())
    }

    #[tokio::test]
    async fn position_failure_keeps_previous_capture() -> TestResult {
        let mut geocoder = MockReverseGeocoder::new();
        geocoder
            .expect_reverse_geocode()
            .returning(|_| Ok("First address".to_string()));

        let mut positions = MockPositionSource::new();
        let mut calls = 0;
        positions.expect_current_position().returning(move || {
            calls += 1;
            if calls == 1 {
                Ok(Coordinates::new(10.0, 20.0))
            } else {
                Err(LocationError::Denied)
            }
        });

        let cell = LocationCell::new();
        let locator = Locator::new(
            GeolocationProvider::new(Arc::new(positions), Arc::new(geocoder)),
            cell.clone(),
        );

        locator.capture().await?;
        let second = locator.capture().await;

        assert_eq!(second, Err(LocationError::Denied));
        assert_eq!(
            cell.get().map(|capture| capture.coordinates()),
            Some(Coordinates::new(10.0, 20.0))
        );
        assert_eq!(cell.issued(), 2);

        Ok(())
    }

    fn capture_at(latitude: f64) -> GeoCapture {
        GeoCapture::new(
            Coordinates::new(latitude, 0.0),
            "x".to_string(),
            Timestamp::now(),
        )
    }

    #[test]
    fn store_rejects_stale_sequence_when_latest_issued() {
        let cell = LocationCell::new();
        let first = cell.issue();
        let second = cell.issue();

        assert!(cell.store(second, capture_at(2.0), CapturePolicy::LatestIssued));
        assert!(!cell.store(first, capture_at(1.0), CapturePolicy::LatestIssued));
        assert_eq!(
            cell.get().map(|capture| capture.coordinates()),
            Some(Coordinates::new(2.0, 0.0))
        );
    }

    #[test]
    fn store_accepts_older_sequence_until_newer_one_writes() {
        let cell = LocationCell::new();
        let first = cell.issue();
        let _pending = cell.issue();

        assert!(cell.store(first, capture_at(1.0), CapturePolicy::LatestIssued));
        assert_eq!(
            cell.get().map(|capture| capture.coordinates()),
            Some(Coordinates::new(1.0, 0.0))
        );
    }

    #[test]
    fn store_accepts_stale_sequence_when_last_completed() {
        let cell = LocationCell::new();
        let first = cell.issue();
        let second = cell.issue();

        assert!(cell.store(second, capture_at(2.0), CapturePolicy::LastCompleted));
        assert!(cell.store(first, capture_at(1.0), CapturePolicy::LastCompleted));
        assert_eq!(
            cell.get().map(|capture| capture.coordinates()),
            Some(Coordinates::new(1.0, 0.0))
        );
    }
}
