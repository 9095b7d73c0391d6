//! Booking Session
//!
//! A [`BookingSession`] holds one customer's in-progress booking: the pricing mode, the
//! cart or weight selection, the live location, the pickup address choice and schedule.
//! Every edit is validated on entry and leaves the session unchanged when it fails.

use std::{future::Future, sync::Arc};

use jiff::Timestamp;
use rust_decimal::Decimal;
use tracing::debug;

use crate::{
    address::{PickupAddress, PickupAddressChoice, RegisteredAddress},
    cart::Cart,
    catalog::Catalog,
    customer::CustomerContext,
    errors::BookingError,
    location::{CaptureOutcome, GeoCapture, GeolocationProvider, LocationCell, Locator},
    money::Price,
    pricing::{PricingMode, Quote, WeightKg, WeightSelection, tariff::ServiceType},
};

mod payload;
mod validation;

pub use payload::{IdempotencyKey, OrderSelection, PayloadItem, SubmissionPayload};
pub use validation::{Violation, Violations};

/// One customer's in-progress booking.
#[derive(Debug)]
pub struct BookingSession {
    catalog: Arc<Catalog>,
    customer: CustomerContext,
    idempotency_key: IdempotencyKey,
    mode: PricingMode,
    cart: Cart,
    weight: Option<WeightSelection>,
    geolocation: GeolocationProvider,
    location: LocationCell,
    address: PickupAddressChoice,
    pickup_at: Option<Timestamp>,
    instructions: Option<String>,
}

impl BookingSession {
    /// Start an empty per-kg booking with the registered address selected.
    pub fn new(
        catalog: Arc<Catalog>,
        customer: CustomerContext,
        geolocation: GeolocationProvider,
    ) -> Self {
        let idempotency_key = IdempotencyKey::new();

        debug!(customer = %customer.id(), %idempotency_key, "booking session started");

        Self {
            catalog,
            customer,
            idempotency_key,
            mode: PricingMode::default(),
            cart: Cart::new(),
            weight: None,
            geolocation,
            location: LocationCell::new(),
            address: PickupAddressChoice::default(),
            pickup_at: None,
            instructions: None,
        }
    }

    /// Switch pricing mode. Data entered for the other mode is kept but stops counting.
    pub fn set_mode(&mut self, mode: PricingMode) {
        self.mode = mode;
    }

    /// Add one piece of a catalog item, returning the new quantity.
    ///
    /// # Errors
    ///
    /// Returns [`BookingError::UnknownItem`] if the catalog has no such item.
    pub fn add_item(&mut self, name: &str) -> Result<u32, BookingError> {
        let item = self
            .catalog
            .get(name)
            .ok_or_else(|| BookingError::UnknownItem(name.to_string()))?;

        Ok(self.cart.add(item))
    }

    /// Adjust an item's quantity by `delta`.
    ///
    /// Returns the new quantity, or `None` if the line dropped to zero and was removed.
    ///
    /// # Errors
    ///
    /// Returns [`BookingError::UnknownItem`] if the item is not in the cart.
    pub fn change_quantity(&mut self, name: &str, delta: i64) -> Result<Option<u32>, BookingError> {
        Ok(self.cart.change_quantity(name, delta)?)
    }

    /// Remove an item from the cart. Returns whether it was present.
    pub fn remove_item(&mut self, name: &str) -> bool {
        self.cart.remove(name).is_some()
    }

    /// Choose the per-kg service and weight.
    ///
    /// # Errors
    ///
    /// Returns [`BookingError::InvalidWeight`] if the weight is not strictly positive; the
    /// previous selection is kept.
    pub fn set_weight(
        &mut self,
        service_type: ServiceType,
        weight_kg: Decimal,
    ) -> Result<(), BookingError> {
        let weight = WeightKg::new(weight_kg)?;

        self.weight = Some(WeightSelection::new(service_type, weight));

        Ok(())
    }

    /// Forget the per-kg selection.
    pub fn clear_weight(&mut self) {
        self.weight = None;
    }

    /// Price of the active mode's selection; zero when nothing is selected.
    pub fn compute_price(&self) -> Price {
        self.quote().total()
    }

    /// Price breakdown of the active mode's selection.
    pub fn quote(&self) -> Quote {
        Quote::new(
            self.mode,
            &self.cart,
            self.weight.as_ref(),
            self.catalog.tariff(),
        )
    }

    /// A locator writing into this session's location.
    pub fn locator(&self) -> Locator {
        Locator::new(self.geolocation.clone(), self.location.clone())
    }

    /// Capture the live location.
    ///
    /// The returned future borrows nothing from the session, so it can be spawned while the
    /// session keeps being edited. Overlapping captures are resolved by the provider's
    /// [`CapturePolicy`](crate::location::CapturePolicy).
    pub fn capture_location(
        &self,
    ) -> impl Future<Output = Result<CaptureOutcome, BookingError>> + Send + use<> {
        let locator = self.locator();

        async move { Ok(locator.capture().await?) }
    }

    /// Latest applied location capture.
    pub fn geo(&self) -> Option<GeoCapture> {
        self.location.get()
    }

    /// Drop the captured location.
    pub fn clear_location(&self) {
        self.location.clear();
    }

    /// Choose the pickup address.
    pub fn set_address_choice(&mut self, choice: PickupAddressChoice) {
        self.address = choice;
    }

    /// Set the pickup time.
    ///
    /// # Errors
    ///
    /// Returns [`BookingError::InvalidSchedule`] if the time is in the past.
    pub fn set_schedule(&mut self, pickup_at: Timestamp) -> Result<(), BookingError> {
        self.set_schedule_at(pickup_at, Timestamp::now())
    }

    /// Set the pickup time, checked against `now`.
    ///
    /// # Errors
    ///
    /// Returns [`BookingError::InvalidSchedule`] if `pickup_at` is before `now`.
    pub fn set_schedule_at(
        &mut self,
        pickup_at: Timestamp,
        now: Timestamp,
    ) -> Result<(), BookingError> {
        if pickup_at < now {
            return Err(BookingError::InvalidSchedule {
                requested: pickup_at,
                now,
            });
        }

        self.pickup_at = Some(pickup_at);

        Ok(())
    }

    /// Set care instructions. Blank text clears them.
    pub fn set_instructions(&mut self, instructions: Option<String>) {
        self.instructions = instructions
            .map(|text| text.trim().to_string())
            .filter(|text| !text.is_empty());
    }

    /// Every unmet precondition for submission.
    pub fn validate(&self) -> Violations {
        self.validate_at(Timestamp::now())
    }

    /// Every unmet precondition for submission, with the schedule checked against `now`.
    pub fn validate_at(&self, now: Timestamp) -> Violations {
        let mut violations = Violations::new();

        if self.location.get().is_none() {
            violations.push(Violation::MissingLocation);
        }

        match self.mode {
            PricingMode::PerPiece if self.cart.is_empty() => violations.push(Violation::EmptyCart),
            PricingMode::PerWeight if self.weight.is_none() => {
                violations.push(Violation::MissingWeight);
            }
            _ => {}
        }

        if matches!(&self.address, PickupAddressChoice::Custom(custom) if custom.is_blank()) {
            violations.push(Violation::IncompleteAddress);
        }

        match self.pickup_at {
            None => violations.push(Violation::MissingSchedule),
            Some(pickup_at) if pickup_at < now => violations.push(Violation::ScheduleInPast),
            Some(_) => {}
        }

        violations
    }

    /// Assemble the payload for submission.
    ///
    /// # Errors
    ///
    /// Returns [`BookingError::IncompleteSession`] listing every violation if the session
    /// is not valid, or [`BookingError::MissingRegisteredAddress`] if the registered
    /// address was chosen and `registered` is `None`.
    pub fn build_submission_payload(
        &self,
        registered: Option<&RegisteredAddress>,
    ) -> Result<SubmissionPayload, BookingError> {
        self.build_submission_payload_at(registered, Timestamp::now())
    }

    /// Assemble the payload for submission, with the schedule checked against `now`.
    ///
    /// # Errors
    ///
    /// See [`BookingSession::build_submission_payload`].
    pub fn build_submission_payload_at(
        &self,
        registered: Option<&RegisteredAddress>,
        now: Timestamp,
    ) -> Result<SubmissionPayload, BookingError> {
        let violations = self.validate_at(now);

        if !violations.is_empty() {
            return Err(BookingError::IncompleteSession(violations));
        }

        let pickup_address = PickupAddress::resolve(&self.address, registered)?;

        let location = self
            .location
            .get()
            .ok_or_else(|| BookingError::IncompleteSession(Violation::MissingLocation.into()))?;

        let pickup_at = self
            .pickup_at
            .ok_or_else(|| BookingError::IncompleteSession(Violation::MissingSchedule.into()))?;

        let selection = match self.mode {
            PricingMode::PerPiece => OrderSelection::PerPiece {
                items: self.cart.lines().iter().map(PayloadItem::from).collect(),
            },
            PricingMode::PerWeight => {
                let weight = self.weight.ok_or_else(|| {
                    BookingError::IncompleteSession(Violation::MissingWeight.into())
                })?;

                OrderSelection::PerWeight {
                    service_type: weight.service_type(),
                    weight: weight.weight(),
                }
            }
        };

        Ok(SubmissionPayload::new(
            self.idempotency_key,
            self.customer.id().clone(),
            selection,
            self.compute_price(),
            pickup_address,
            location,
            pickup_at,
            self.instructions.clone(),
        ))
    }

    /// Catalog the session prices against.
    pub fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    /// Customer making the booking.
    pub fn customer(&self) -> &CustomerContext {
        &self.customer
    }

    /// Duplicate-suppression key sent with every submission of this session.
    pub fn idempotency_key(&self) -> IdempotencyKey {
        self.idempotency_key
    }

    /// Active pricing mode.
    pub fn mode(&self) -> PricingMode {
        self.mode
    }

    /// Per-piece cart.
    pub fn cart(&self) -> &Cart {
        &self.cart
    }

    /// Per-kg selection.
    pub fn weight(&self) -> Option<&WeightSelection> {
        self.weight.as_ref()
    }

    /// Pickup address choice.
    pub fn address_choice(&self) -> &PickupAddressChoice {
        &self.address
    }

    /// Requested pickup time.
    pub fn pickup_at(&self) -> Option<Timestamp> {
        self.pickup_at
    }

    /// Care instructions.
    pub fn instructions(&self) -> Option<&str> {
        self.instructions.as_deref()
    }
}

#[cfg(test)]
mod tests {
    use jiff::{SignedDuration, Timestamp};
    use testresult::TestResult;

    use crate::{
        address::CustomAddress,
        customer::CustomerId,
        location::{Coordinates, LocationError, MockPositionSource, MockReverseGeocoder},
        money::rupees,
    };

    use super::*;

    fn provider() -> GeolocationProvider {
        let mut positions = MockPositionSource::new();
        positions
            .expect_current_position()
            .returning(|| Ok(Coordinates::new(19.42, 72.82)));

        let mut geocoder = MockReverseGeocoder::new();
        geocoder
            .expect_reverse_geocode()
            .returning(|_| Ok("Nallasopara West".to_string()));

        GeolocationProvider::new(Arc::new(positions), Arc::new(geocoder))
    }

    fn session() -> Result<BookingSession, crate::catalog::CatalogError> {
        Ok(BookingSession::new(
            Arc::new(Catalog::standard()?),
            CustomerContext::new(CustomerId::new("c-1"), "Asha"),
            provider(),
        ))
    }

    fn registered() -> RegisteredAddress {
        RegisteredAddress {
            street: "12 Link Road".to_string(),
            area: "Achole".to_string(),
            city: "Nallasopara".to_string(),
            pincode: "401209".to_string(),
        }
    }

    #[test]
    fn new_session_defaults_to_per_weight() -> TestResult {
        let session = session()?;

        assert_eq!(session.mode(), PricingMode::PerWeight);
        assert_eq!(session.address_choice(), &PickupAddressChoice::UseRegistered);
        assert_eq!(session.compute_price(), rupees(0));

        Ok(())
    }

    #[test]
    fn unknown_item_is_rejected_without_changes() -> TestResult {
        let mut session = session()?;

        let result = session.add_item("Tuxedo");

        assert!(matches!(result, Err(BookingError::UnknownItem(ref name)) if name == "Tuxedo"));
        assert!(session.cart().is_empty());

        Ok(())
    }

    #[test]
    fn invalid_weight_keeps_previous_selection() -> TestResult {
        let mut session = session()?;
        session.set_weight(ServiceType::WashIron, Decimal::from(3))?;

        let result = session.set_weight(ServiceType::WashDry, Decimal::ZERO);

        assert!(matches!(result, Err(BookingError::InvalidWeight(_))));
        assert_eq!(
            session.weight().map(WeightSelection::service_type),
            Some(ServiceType::WashIron)
        );
        assert_eq!(session.compute_price(), rupees(447));

        Ok(())
    }

    #[test]
    fn past_schedule_is_rejected() -> TestResult {
        let mut session = session()?;
        let now = Timestamp::now();
        let earlier = now.checked_sub(SignedDuration::from_hours(1))?;

        let result = session.set_schedule_at(earlier, now);

        assert!(matches!(result, Err(BookingError::InvalidSchedule { .. })));
        assert_eq!(session.pickup_at(), None);

        Ok(())
    }

    #[test]
    fn schedule_that_became_stale_is_reported() -> TestResult {
        let mut session = session()?;
        let now = Timestamp::now();
        let pickup = now.checked_add(SignedDuration::from_mins(30))?;
        session.set_schedule_at(pickup, now)?;

        let later = pickup.checked_add(SignedDuration::from_mins(1))?;

        assert!(session.validate_at(later).contains(Violation::ScheduleInPast));

        Ok(())
    }

    #[test]
    fn blank_instructions_are_cleared() -> TestResult {
        let mut session = session()?;

        session.set_instructions(Some("  ".to_string()));
        assert_eq!(session.instructions(), None);

        session.set_instructions(Some(" Use mild detergent ".to_string()));
        assert_eq!(session.instructions(), Some("Use mild detergent"));

        Ok(())
    }

    #[test]
    fn fresh_session_lists_every_violation() -> TestResult {
        let session = session()?;

        let violations = session.validate();

        assert_eq!(
            violations.iter().collect::<Vec<_>>(),
            [
                Violation::MissingLocation,
                Violation::MissingWeight,
                Violation::MissingSchedule
            ]
        );

        Ok(())
    }

    #[tokio::test]
    async fn capture_location_populates_geo() -> TestResult {
        let session = session()?;

        let outcome = session.capture_location().await?;

        assert!(outcome.is_applied());
        assert_eq!(
            session.geo().map(|geo| geo.resolved_address().to_string()),
            Some("Nallasopara West".to_string())
        );

        Ok(())
    }

    #[tokio::test]
    async fn denied_location_maps_to_location_unavailable() -> TestResult {
        let mut positions = MockPositionSource::new();
        positions
            .expect_current_position()
            .returning(|| Err(LocationError::Denied));

        let session = BookingSession::new(
            Arc::new(Catalog::standard()?),
            CustomerContext::new(CustomerId::new("c-1"), "Asha"),
            GeolocationProvider::new(Arc::new(positions), Arc::new(MockReverseGeocoder::new())),
        );

        let result = session.capture_location().await;

        assert!(matches!(
            result,
            Err(BookingError::LocationUnavailable(LocationError::Denied))
        ));
        assert!(session.geo().is_none());

        Ok(())
    }

    #[tokio::test]
    async fn payload_for_custom_address_keeps_landmark() -> TestResult {
        let mut session = session()?;
        let now = Timestamp::now();
        session.capture_location().await?;
        session.set_weight(ServiceType::WashDry, Decimal::new(25, 1))?;
        session.set_schedule_at(now.checked_add(SignedDuration::from_hours(2))?, now)?;
        session.set_address_choice(PickupAddressChoice::Custom(CustomAddress::new(
            "Flat 4, Station Road",
            Some("Opp. bus depot".to_string()),
        )));

        let payload = session.build_submission_payload_at(Some(&registered()), now)?;

        assert_eq!(payload.pickup_address().full_address(), "Flat 4, Station Road");
        assert_eq!(payload.pickup_address().landmark(), Some("Opp. bus depot"));
        assert_eq!(payload.total_price().to_minor_units(), 24_750);
        assert_eq!(payload.idempotency_key(), session.idempotency_key());

        Ok(())
    }

    #[tokio::test]
    async fn registered_choice_without_address_fails() -> TestResult {
        let mut session = session()?;
        let now = Timestamp::now();
        session.capture_location().await?;
        session.set_weight(ServiceType::WashIron, Decimal::from(2))?;
        session.set_schedule_at(now.checked_add(SignedDuration::from_hours(2))?, now)?;

        let result = session.build_submission_payload_at(None, now);

        assert!(matches!(result, Err(BookingError::MissingRegisteredAddress)));

        Ok(())
    }
}
