//! Catalog YAML documents

use serde::Deserialize;

use crate::{
    catalog::{CatalogError, CatalogItem, Category},
    money::parse_price,
    pricing::tariff::Tariff,
};

/// Catalog document as written in YAML.
#[derive(Debug, Deserialize)]
pub(crate) struct CatalogFixture {
    /// Per-kg rates.
    pub tariff: TariffFixture,

    /// Piece items, in display order.
    pub items: Vec<CatalogItemFixture>,
}

/// Per-kg rates (e.g. `wash-dry: 99 INR`).
#[derive(Debug, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub(crate) struct TariffFixture {
    pub wash_dry: String,
    pub wash_iron: String,
}

/// A single piece item.
#[derive(Debug, Deserialize)]
pub(crate) struct CatalogItemFixture {
    pub name: String,
    pub category: Category,
    pub price: String,
    #[serde(default)]
    pub unit: Option<String>,
}

impl TryFrom<TariffFixture> for Tariff {
    type Error = CatalogError;

    fn try_from(fixture: TariffFixture) -> Result<Self, Self::Error> {
        let wash_dry = parse_price(&fixture.wash_dry)?;
        let wash_iron = parse_price(&fixture.wash_iron)?;

        for (service, rate) in [("wash-dry", &wash_dry), ("wash-iron", &wash_iron)] {
            if rate.to_minor_units() <= 0 {
                return Err(CatalogError::NonPositivePrice(service.to_string()));
            }
        }

        Ok(Tariff::new(wash_dry, wash_iron))
    }
}

impl TryFrom<CatalogItemFixture> for CatalogItem {
    type Error = CatalogError;

    fn try_from(fixture: CatalogItemFixture) -> Result<Self, Self::Error> {
        let name = fixture.name.trim().to_string();

        if name.is_empty() {
            return Err(CatalogError::MissingName);
        }

        let unit_price = parse_price(&fixture.price)?;

        if unit_price.to_minor_units() <= 0 {
            return Err(CatalogError::NonPositivePrice(name));
        }

        let unit = fixture
            .unit
            .map(|unit| unit.trim().to_string())
            .filter(|unit| !unit.is_empty());

        Ok(CatalogItem {
            name,
            category: fixture.category,
            unit_price,
            unit,
        })
    }
}
