//! Pricing
//!
//! A booking is priced either per piece (sum of cart lines) or per kg (weight times the
//! tariff rate of the chosen service). Only the active mode contributes to the price.

use std::fmt;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use smallvec::SmallVec;
use thiserror::Error;

use crate::{
    cart::{Cart, CartLine},
    money::{self, Price},
};

pub mod tariff;

use tariff::{ServiceType, Tariff};

/// How a booking is priced.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum PricingMode {
    /// Bulk laundry priced by weight.
    #[default]
    #[serde(rename = "per-kg")]
    PerWeight,

    /// Individually priced items.
    PerPiece,
}

impl PricingMode {
    /// Wire identifier (`per-kg`, `per-piece`).
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::PerWeight => "per-kg",
            Self::PerPiece => "per-piece",
        }
    }
}

impl fmt::Display for PricingMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A weight that is not strictly positive.
#[derive(Debug, Error, PartialEq, Eq)]
#[error("weight must be greater than zero, got {0} kg")]
pub struct InvalidWeight(pub Decimal);

/// A strictly positive weight in kilograms.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct WeightKg(Decimal);

impl WeightKg {
    /// Validate a weight.
    ///
    /// # Errors
    ///
    /// Returns [`InvalidWeight`] if the value is zero or negative.
    pub fn new(value: Decimal) -> Result<Self, InvalidWeight> {
        if value <= Decimal::ZERO {
            return Err(InvalidWeight(value));
        }

        Ok(Self(value.normalize()))
    }

    /// Weight in kilograms.
    pub fn get(self) -> Decimal {
        self.0
    }
}

impl TryFrom<Decimal> for WeightKg {
    type Error = InvalidWeight;

    fn try_from(value: Decimal) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl fmt::Display for WeightKg {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} kg", self.0)
    }
}

/// Service and weight for a per-kg booking.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WeightSelection {
    service_type: ServiceType,
    weight: WeightKg,
}

impl WeightSelection {
    /// Create a selection.
    pub fn new(service_type: ServiceType, weight: WeightKg) -> Self {
        Self {
            service_type,
            weight,
        }
    }

    /// Chosen service.
    pub fn service_type(&self) -> ServiceType {
        self.service_type
    }

    /// Estimated weight.
    pub fn weight(&self) -> WeightKg {
        self.weight
    }

    /// Weight multiplied by the service's per-kg rate.
    pub fn price(&self, tariff: &Tariff) -> Price {
        money::scaled(&tariff.rate_per_kg(self.service_type), self.weight.get())
    }
}

/// One row of a price breakdown.
#[derive(Debug, Clone, PartialEq)]
pub struct QuoteLine {
    /// Item name or service label.
    pub label: String,

    /// Price per piece or per kg.
    pub unit_price: Price,

    /// Pieces or kilograms.
    pub quantity: Decimal,

    /// `unit_price * quantity`.
    pub subtotal: Price,
}

impl From<&CartLine> for QuoteLine {
    fn from(line: &CartLine) -> Self {
        Self {
            label: line.name().to_string(),
            unit_price: line.unit_price(),
            quantity: Decimal::from(line.quantity()),
            subtotal: line.subtotal(),
        }
    }
}

/// Price breakdown for the active pricing mode.
#[derive(Debug, Clone, PartialEq)]
pub struct Quote {
    mode: PricingMode,
    lines: SmallVec<[QuoteLine; 8]>,
    total: Price,
}

impl Quote {
    /// Quote the cart or the weight selection, depending on `mode`.
    pub fn new(
        mode: PricingMode,
        cart: &Cart,
        weight: Option<&WeightSelection>,
        tariff: &Tariff,
    ) -> Self {
        let lines: SmallVec<[QuoteLine; 8]> = match mode {
            PricingMode::PerPiece => cart.lines().iter().map(QuoteLine::from).collect(),
            PricingMode::PerWeight => weight
                .map(|selection| {
                    let service_type = selection.service_type();

                    QuoteLine {
                        label: service_type.label().to_string(),
                        unit_price: tariff.rate_per_kg(service_type),
                        quantity: selection.weight().get(),
                        subtotal: selection.price(tariff),
                    }
                })
                .into_iter()
                .collect(),
        };

        let total = money::sum(lines.iter().map(|line| &line.subtotal));

        Self { mode, lines, total }
    }

    /// Mode this quote was computed for.
    pub fn mode(&self) -> PricingMode {
        self.mode
    }

    /// Breakdown rows.
    pub fn lines(&self) -> &[QuoteLine] {
        &self.lines
    }

    /// Total price; zero when nothing has been selected yet.
    pub fn total(&self) -> Price {
        self.total
    }

    /// Check if nothing has been selected for the active mode.
    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }
}
