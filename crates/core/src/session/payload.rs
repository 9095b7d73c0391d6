//! Submission payload

use std::fmt;

use jiff::Timestamp;
use uuid::Uuid;

use crate::{
    address::PickupAddress,
    cart::CartLine,
    catalog::Category,
    customer::CustomerId,
    location::GeoCapture,
    money::Price,
    pricing::{PricingMode, WeightKg, tariff::ServiceType},
};

/// Key identifying one booking attempt, so the order API can drop duplicate submissions.
///
/// A session keeps the same key for its whole lifetime, so resubmitting after a failure
/// reuses it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct IdempotencyKey(Uuid);

impl IdempotencyKey {
    /// Generate a new time-ordered key.
    pub fn new() -> Self {
        Self(Uuid::now_v7())
    }

    /// Underlying UUID.
    pub fn as_uuid(&self) -> Uuid {
        self.0
    }
}

impl Default for IdempotencyKey {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for IdempotencyKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// One priced item of a per-piece order.
#[derive(Debug, Clone, PartialEq)]
pub struct PayloadItem {
    /// Catalog item name.
    pub name: String,

    /// Catalog category.
    pub category: Category,

    /// Price per piece.
    pub unit_price: Price,

    /// Display unit, e.g. `pair`.
    pub unit: Option<String>,

    /// Number of pieces, at least one.
    pub quantity: u32,
}

impl From<&CartLine> for PayloadItem {
    fn from(line: &CartLine) -> Self {
        Self {
            name: line.name().to_string(),
            category: line.category(),
            unit_price: line.unit_price(),
            unit: line.unit().map(str::to_string),
            quantity: line.quantity(),
        }
    }
}

/// What is being ordered, for the active pricing mode only.
#[derive(Debug, Clone, PartialEq)]
pub enum OrderSelection {
    /// Itemised order.
    PerPiece {
        /// Cart contents.
        items: Vec<PayloadItem>,
    },

    /// Bulk order by weight.
    PerWeight {
        /// Chosen service.
        service_type: ServiceType,
        /// Estimated weight.
        weight: WeightKg,
    },
}

impl OrderSelection {
    /// Pricing mode of the selection.
    pub fn mode(&self) -> PricingMode {
        match self {
            Self::PerPiece { .. } => PricingMode::PerPiece,
            Self::PerWeight { .. } => PricingMode::PerWeight,
        }
    }
}

/// A validated booking, ready to hand to an [`OrderSubmitter`](crate::orders::OrderSubmitter).
///
/// Only produced by a session whose preconditions all hold; the total always matches the
/// session's price at assembly time.
#[derive(Debug, Clone, PartialEq)]
pub struct SubmissionPayload {
    idempotency_key: IdempotencyKey,
    customer: CustomerId,
    selection: OrderSelection,
    total_price: Price,
    pickup_address: PickupAddress,
    location: GeoCapture,
    pickup_at: Timestamp,
    instructions: Option<String>,
}

impl SubmissionPayload {
    #[expect(clippy::too_many_arguments, reason = "assembled in one place by the session")]
    pub(crate) fn new(
        idempotency_key: IdempotencyKey,
        customer: CustomerId,
        selection: OrderSelection,
        total_price: Price,
        pickup_address: PickupAddress,
        location: GeoCapture,
        pickup_at: Timestamp,
        instructions: Option<String>,
    ) -> Self {
        Self {
            idempotency_key,
            customer,
            selection,
            total_price,
            pickup_address,
            location,
            pickup_at,
            instructions,
        }
    }

    /// Duplicate-suppression key of the issuing session.
    pub fn idempotency_key(&self) -> IdempotencyKey {
        self.idempotency_key
    }

    /// Customer placing the order.
    pub fn customer(&self) -> &CustomerId {
        &self.customer
    }

    /// Pricing mode.
    pub fn mode(&self) -> PricingMode {
        self.selection.mode()
    }

    /// Items or weight being ordered.
    pub fn selection(&self) -> &OrderSelection {
        &self.selection
    }

    /// Order total.
    pub fn total_price(&self) -> Price {
        self.total_price
    }

    /// Resolved pickup address.
    pub fn pickup_address(&self) -> &PickupAddress {
        &self.pickup_address
    }

    /// Live location at booking time.
    pub fn location(&self) -> &GeoCapture {
        &self.location
    }

    /// Requested pickup time.
    pub fn pickup_at(&self) -> Timestamp {
        self.pickup_at
    }

    /// Care instructions, if any.
    pub fn instructions(&self) -> Option<&str> {
        self.instructions.as_deref()
    }
}
