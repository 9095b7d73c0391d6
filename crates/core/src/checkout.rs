//! Checkout
//!
//! Turns a finished [`BookingSession`] into a submitted order. The session is consumed on
//! success and handed back on failure, so the customer can correct it and resubmit with the
//! same idempotency key.

use std::{fmt, sync::Arc};

use thiserror::Error;
use tracing::{info, warn};

use crate::{
    address::{AddressSource, PickupAddressChoice},
    errors::BookingError,
    orders::{OrderSubmitter, SubmittedOrder},
    session::BookingSession,
};

/// A submission that did not go through, with the session it came from.
#[derive(Debug, Error)]
#[error("{error}")]
pub struct Rejected {
    /// The session, unchanged.
    pub session: Box<BookingSession>,

    /// Why the submission failed.
    #[source]
    pub error: BookingError,
}

impl Rejected {
    fn new(session: BookingSession, error: BookingError) -> Self {
        Self {
            session: Box::new(session),
            error,
        }
    }

    /// Take the session back for another attempt.
    pub fn into_session(self) -> BookingSession {
        *self.session
    }
}

/// Submits booking sessions to the order API.
#[derive(Clone)]
pub struct Checkout {
    addresses: Arc<dyn AddressSource>,
    orders: Arc<dyn OrderSubmitter>,
}

impl Checkout {
    /// Create a checkout over the given collaborators.
    pub fn new(addresses: Arc<dyn AddressSource>, orders: Arc<dyn OrderSubmitter>) -> Self {
        Self { addresses, orders }
    }

    /// Validate, assemble and submit the session once.
    ///
    /// Nothing is sent unless every precondition holds. A failed registered address lookup
    /// only matters when the registered address was chosen.
    ///
    /// # Errors
    ///
    /// Returns [`Rejected`] carrying the session and a [`BookingError`] when the session is
    /// incomplete, the address cannot be resolved, or the order API refuses the booking.
    pub async fn submit(&self, session: BookingSession) -> Result<SubmittedOrder, Rejected> {
        let violations = session.validate();

        if !violations.is_empty() {
            warn!(%violations, "booking is incomplete, not submitting");

            return Err(Rejected::new(
                session,
                BookingError::IncompleteSession(violations),
            ));
        }

        let lookup = self
            .addresses
            .registered_address(session.customer().id())
            .await;

        let registered = match lookup {
            Ok(registered) => registered,
            Err(error) if *session.address_choice() == PickupAddressChoice::UseRegistered => {
                return Err(Rejected::new(session, error.into()));
            }
            Err(error) => {
                warn!(%error, "registered address lookup failed, continuing with custom address");

                None
            }
        };

        let payload = match session.build_submission_payload(registered.as_ref()) {
            Ok(payload) => payload,
            Err(error) => return Err(Rejected::new(session, error)),
        };

        match self.orders.submit(&payload).await {
            Ok(order) => {
                info!(
                    order_number = %order.order_number,
                    mode = %payload.mode(),
                    total = %payload.total_price(),
                    idempotency_key = %payload.idempotency_key(),
                    "booking submitted"
                );

                Ok(order)
            }
            Err(error) => {
                warn!(%error, idempotency_key = %payload.idempotency_key(), "booking submission failed");

                Err(Rejected::new(session, error.into()))
            }
        }
    }
}

impl fmt::Debug for Checkout {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Checkout").finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use jiff::{SignedDuration, Timestamp};
    use rust_decimal::Decimal;
    use testresult::TestResult;

    use crate::{
        address::{AddressSourceError, CustomAddress, MockAddressSource, RegisteredAddress},
        catalog::Catalog,
        customer::{CustomerContext, CustomerId},
        location::{Coordinates, GeolocationProvider, MockPositionSource, MockReverseGeocoder},
        orders::{MockOrderSubmitter, OrderStatus, SubmissionError},
        pricing::tariff::ServiceType,
        session::Violation,
    };

    use super::*;

    fn registered() -> RegisteredAddress {
        RegisteredAddress {
            street: "12 Link Road".to_string(),
            area: "Achole".to_string(),
            city: "Nallasopara".to_string(),
            pincode: "401209".to_string(),
        }
    }

    async fn ready_session() -> TestResult<BookingSession> {
        let mut positions = MockPositionSource::new();
        positions
            .expect_current_position()
            .returning(|| Ok(Coordinates::new(19.42, 72.82)));

        let mut geocoder = MockReverseGeocoder::new();
        geocoder
            .expect_reverse_geocode()
            .returning(|_| Ok("Nallasopara West".to_string()));

        let mut session = BookingSession::new(
            Arc::new(Catalog::standard()?),
            CustomerContext::new(CustomerId::new("c-1"), "Asha"),
            GeolocationProvider::new(Arc::new(positions), Arc::new(geocoder)),
        );

        session.capture_location().await?;
        session.set_weight(ServiceType::WashIron, Decimal::from(5))?;
        session.set_schedule(Timestamp::now().checked_add(SignedDuration::from_hours(3))?)?;

        Ok(session)
    }

    fn addresses_returning(address: Option<RegisteredAddress>) -> MockAddressSource {
        let mut addresses = MockAddressSource::new();
        addresses
            .expect_registered_address()
            .returning(move |_| Ok(address.clone()));
        addresses
    }

    fn accepted() -> SubmittedOrder {
        SubmittedOrder {
            order_id: "66f0c1".to_string(),
            order_number: "ORD-1001".to_string(),
            status: OrderStatus::Pending,
            created_at: Timestamp::UNIX_EPOCH,
        }
    }

    #[tokio::test]
    async fn submits_valid_session_once() -> TestResult {
        let session = ready_session().await?;

        let mut orders = MockOrderSubmitter::new();
        orders
            .expect_submit()
            .times(1)
            .withf(|payload| payload.total_price().to_minor_units() == 74_500)
            .returning(|_| Ok(accepted()));

        let checkout = Checkout::new(
            Arc::new(addresses_returning(Some(registered()))),
            Arc::new(orders),
        );

        let order = checkout.submit(session).await?;

        assert_eq!(order.order_number, "ORD-1001");

        Ok(())
    }

    #[tokio::test]
    async fn incomplete_session_is_not_sent() -> TestResult {
        let session = BookingSession::new(
            Arc::new(Catalog::standard()?),
            CustomerContext::new(CustomerId::new("c-1"), "Asha"),
            GeolocationProvider::new(
                Arc::new(MockPositionSource::new()),
                Arc::new(MockReverseGeocoder::new()),
            ),
        );

        let mut orders = MockOrderSubmitter::new();
        orders.expect_submit().never();

        let checkout = Checkout::new(Arc::new(MockAddressSource::new()), Arc::new(orders));

        let Err(rejected) = checkout.submit(session).await else {
            panic!("Expected rejection");
        };

        assert!(matches!(
            rejected.error,
            BookingError::IncompleteSession(ref violations) if violations.contains(Violation::MissingLocation)
        ));

        Ok(())
    }

    #[tokio::test]
    async fn endpoint_rejection_returns_session() -> TestResult {
        let session = ready_session().await?;
        let key = session.idempotency_key();

        let mut orders = MockOrderSubmitter::new();
        orders.expect_submit().times(1).returning(|_| {
            Err(SubmissionError::Validation {
                message: "Pickup outside service area".to_string(),
            })
        });

        let checkout = Checkout::new(
            Arc::new(addresses_returning(Some(registered()))),
            Arc::new(orders),
        );

        let Err(rejected) = checkout.submit(session).await else {
            panic!("Expected rejection");
        };

        assert!(matches!(
            rejected.error,
            BookingError::Validation { ref message } if message == "Pickup outside service area"
        ));
        assert_eq!(rejected.into_session().idempotency_key(), key);

        Ok(())
    }

    #[tokio::test]
    async fn lookup_failure_is_fatal_for_registered_choice() -> TestResult {
        let session = ready_session().await?;

        let mut addresses = MockAddressSource::new();
        addresses
            .expect_registered_address()
            .returning(|_| Err(AddressSourceError("profile service down".to_string())));

        let mut orders = MockOrderSubmitter::new();
        orders.expect_submit().never();

        let checkout = Checkout::new(Arc::new(addresses), Arc::new(orders));

        let Err(rejected) = checkout.submit(session).await else {
            panic!("Expected rejection");
        };

        assert!(matches!(rejected.error, BookingError::AddressLookup(_)));

        Ok(())
    }

    #[tokio::test]
    async fn lookup_failure_is_ignored_for_custom_address() -> TestResult {
        let mut session = ready_session().await?;
        session.set_address_choice(PickupAddressChoice::Custom(CustomAddress::new(
            "Flat 4, Station Road",
            None,
        )));

        let mut addresses = MockAddressSource::new();
        addresses
            .expect_registered_address()
            .returning(|_| Err(AddressSourceError("profile service down".to_string())));

        let mut orders = MockOrderSubmitter::new();
        orders
            .expect_submit()
            .times(1)
            .withf(|payload| payload.pickup_address().registered().is_none())
            .returning(|_| Ok(accepted()));

        let checkout = Checkout::new(Arc::new(addresses), Arc::new(orders));

        checkout.submit(session).await?;

        Ok(())
    }
}
