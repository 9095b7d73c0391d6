//! Booking errors

use jiff::Timestamp;
use thiserror::Error;

use crate::{
    address::{AddressError, AddressSourceError},
    cart::CartError,
    location::LocationError,
    orders::SubmissionError,
    pricing::InvalidWeight,
    session::{Violation, Violations},
};

/// Errors reported by booking session operations.
///
/// Every variant is recoverable: the session is left unchanged and the customer can be
/// re-prompted.
#[derive(Debug, Error)]
pub enum BookingError {
    /// The item is not in the catalog, or not in the cart.
    #[error("unknown item: {0}")]
    UnknownItem(String),

    /// The weight is zero or negative.
    #[error(transparent)]
    InvalidWeight(#[from] InvalidWeight),

    /// The pickup time is earlier than now.
    #[error("pickup time {requested} is in the past (now {now})")]
    InvalidSchedule {
        /// Requested pickup time.
        requested: Timestamp,
        /// Time of the check.
        now: Timestamp,
    },

    /// The device location could not be determined.
    #[error(transparent)]
    LocationUnavailable(#[from] LocationError),

    /// Submission was attempted while preconditions are unmet.
    #[error("booking is incomplete: {0}")]
    IncompleteSession(Violations),

    /// The registered address was chosen but the customer has none.
    #[error("no registered address on file; enter a pickup address")]
    MissingRegisteredAddress,

    /// The registered address could not be looked up.
    #[error(transparent)]
    AddressLookup(#[from] AddressSourceError),

    /// The order API rejected the booking.
    #[error("order rejected: {message}")]
    Validation {
        /// Reason given by the API.
        message: String,
    },

    /// The order API could not accept the booking.
    #[error(transparent)]
    Submission(SubmissionError),
}

impl From<CartError> for BookingError {
    fn from(error: CartError) -> Self {
        match error {
            CartError::UnknownItem(name) => Self::UnknownItem(name),
        }
    }
}

impl From<AddressError> for BookingError {
    fn from(error: AddressError) -> Self {
        match error {
            AddressError::MissingRegisteredAddress => Self::MissingRegisteredAddress,
            AddressError::Incomplete => Self::IncompleteSession(Violation::IncompleteAddress.into()),
        }
    }
}

impl From<SubmissionError> for BookingError {
    fn from(error: SubmissionError) -> Self {
        match error {
            SubmissionError::Validation { message } => Self::Validation { message },
            other => Self::Submission(other),
        }
    }
}
