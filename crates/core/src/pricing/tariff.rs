//! Per-kg Tariff

use std::{fmt, str::FromStr};

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::money::Price;

/// Weight-based laundry service.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ServiceType {
    /// Wash and tumble dry.
    WashDry,

    /// Wash and press.
    #[default]
    WashIron,
}

impl ServiceType {
    /// Every weight-based service, in display order.
    pub const ALL: [Self; 2] = [Self::WashDry, Self::WashIron];

    /// Wire identifier (`wash-dry`, `wash-iron`).
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::WashDry => "wash-dry",
            Self::WashIron => "wash-iron",
        }
    }

    /// Human readable label.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::WashDry => "Wash + Dry",
            Self::WashIron => "Wash + Iron",
        }
    }
}

impl fmt::Display for ServiceType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Unrecognised service type identifier.
#[derive(Debug, Error, PartialEq, Eq)]
#[error("unknown service type: {0} (expected wash-dry or wash-iron)")]
pub struct UnknownServiceType(pub String);

impl FromStr for ServiceType {
    type Err = UnknownServiceType;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value {
            "wash-dry" => Ok(Self::WashDry),
            "wash-iron" => Ok(Self::WashIron),
            other => Err(UnknownServiceType(other.to_string())),
        }
    }
}

/// Per-kg rate table.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Tariff {
    wash_dry: Price,
    wash_iron: Price,
}

impl Tariff {
    /// Creates a tariff from per-kg rates.
    pub fn new(wash_dry: Price, wash_iron: Price) -> Self {
        Self {
            wash_dry,
            wash_iron,
        }
    }

    /// Rate charged per kg for the given service.
    pub fn rate_per_kg(&self, service_type: ServiceType) -> Price {
        match service_type {
            ServiceType::WashDry => self.wash_dry,
            ServiceType::WashIron => self.wash_iron,
        }
    }
}

#[cfg(test)]
mod tests {
    use crate::money::rupees;

    use super::*;

    #[test]
    fn rate_per_kg_selects_service_rate() {
        let tariff = Tariff::new(rupees(99), rupees(149));

        assert_eq!(tariff.rate_per_kg(ServiceType::WashDry), rupees(99));
        assert_eq!(tariff.rate_per_kg(ServiceType::WashIron), rupees(149));
    }

    #[test]
    fn service_type_parses_wire_names() {
        for service_type in ServiceType::ALL {
            assert_eq!(service_type.as_str().parse(), Ok(service_type));
        }
    }

    #[test]
    fn service_type_rejects_unknown_names() {
        let result = "dry-clean".parse::<ServiceType>();

        assert_eq!(result, Err(UnknownServiceType("dry-clean".to_string())));
    }

    #[test]
    fn service_type_deserializes_from_kebab_case() -> Result<(), serde_norway::Error> {
        let parsed: ServiceType = serde_norway::from_str("wash-dry")?;

        assert_eq!(parsed, ServiceType::WashDry);

        Ok(())
    }
}
