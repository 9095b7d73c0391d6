//! Catalog
//!
//! Static reference data for piece pricing and the per-kg tariff. A catalog is loaded once
//! from YAML and shared read-only between booking sessions.

use std::{fmt, fs, path::Path};

use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::{
    money::{Price, PriceParseError},
    pricing::tariff::Tariff,
};

mod fixture;

use fixture::CatalogFixture;

/// The standard catalog shipped with the crate.
const STANDARD_CATALOG_YAML: &str = include_str!("../../fixtures/catalog/standard.yml");

/// Catalog loading errors
#[derive(Debug, Error)]
pub enum CatalogError {
    /// IO error reading a catalog file
    #[error("failed to read catalog file: {0}")]
    Io(#[from] std::io::Error),

    /// YAML parsing error
    #[error("failed to parse catalog YAML: {0}")]
    Yaml(#[from] serde_norway::Error),

    /// A price could not be parsed
    #[error(transparent)]
    Price(#[from] PriceParseError),

    /// A price or rate was zero or negative
    #[error("price for {0} must be positive")]
    NonPositivePrice(String),

    /// An item had a blank name
    #[error("catalog item is missing a name")]
    MissingName,

    /// Two items share a name
    #[error("duplicate catalog item: {0}")]
    DuplicateItem(String),
}

/// Catalog section an item is listed under.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Category {
    /// Garments.
    Clothing,

    /// Bedding, linen and curtains.
    Household,

    /// Shoe cleaning.
    Shoes,
}

impl Category {
    /// Every category, in display order.
    pub const ALL: [Self; 3] = [Self::Clothing, Self::Household, Self::Shoes];

    /// Human readable label.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Clothing => "Clothing Items",
            Self::Household => "Household Items",
            Self::Shoes => "Shoe Cleaning",
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// An item that can be booked per piece.
#[derive(Debug, Clone, PartialEq)]
pub struct CatalogItem {
    name: String,
    category: Category,
    unit_price: Price,
    unit: Option<String>,
}

impl CatalogItem {
    /// Item name, unique within its catalog.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Catalog section.
    pub fn category(&self) -> Category {
        self.category
    }

    /// Price per piece (or per display unit).
    pub fn unit_price(&self) -> Price {
        self.unit_price
    }

    /// Optional display unit, e.g. `pair`.
    pub fn unit(&self) -> Option<&str> {
        self.unit.as_deref()
    }
}

/// Immutable catalog of piece items plus the per-kg tariff.
#[derive(Debug, Clone)]
pub struct Catalog {
    items: Vec<CatalogItem>,
    index: FxHashMap<String, usize>,
    tariff: Tariff,
}

impl Catalog {
    /// Load the standard catalog embedded in the crate.
    ///
    /// # Errors
    ///
    /// Returns an error if the embedded document is malformed.
    pub fn standard() -> Result<Self, CatalogError> {
        Self::from_yaml(STANDARD_CATALOG_YAML)
    }

    /// Load a catalog from a YAML file.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed, or fails validation.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, CatalogError> {
        let contents = fs::read_to_string(path)?;

        Self::from_yaml(&contents)
    }

    /// Parse a catalog from a YAML document.
    ///
    /// # Errors
    ///
    /// Returns an error if the document cannot be parsed, a price is invalid or
    /// non-positive, or two items share a name.
    pub fn from_yaml(yaml: &str) -> Result<Self, CatalogError> {
        let fixture: CatalogFixture = serde_norway::from_str(yaml)?;

        let tariff = Tariff::try_from(fixture.tariff)?;

        let items = fixture
            .items
            .into_iter()
            .map(CatalogItem::try_from)
            .collect::<Result<Vec<_>, _>>()?;

        Self::new(items, tariff)
    }

    /// Build a catalog from items and a tariff.
    ///
    /// # Errors
    ///
    /// Returns [`CatalogError::DuplicateItem`] if two items share a name.
    pub fn new(items: Vec<CatalogItem>, tariff: Tariff) -> Result<Self, CatalogError> {
        let mut index = FxHashMap::default();

        for (position, item) in items.iter().enumerate() {
            if index.insert(item.name.clone(), position).is_some() {
                return Err(CatalogError::DuplicateItem(item.name.clone()));
            }
        }

        Ok(Self {
            items,
            index,
            tariff,
        })
    }

    /// Look up an item by name.
    pub fn get(&self, name: &str) -> Option<&CatalogItem> {
        self.index
            .get(name)
            .and_then(|position| self.items.get(*position))
    }

    /// All items, in catalog order.
    pub fn items(&self) -> &[CatalogItem] {
        &self.items
    }

    /// Items listed under the given category, in catalog order.
    pub fn in_category(&self, category: Category) -> impl Iterator<Item = &CatalogItem> {
        self.items
            .iter()
            .filter(move |item| item.category == category)
    }

    /// Per-kg tariff.
    pub fn tariff(&self) -> &Tariff {
        &self.tariff
    }

    /// Number of items.
    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// Check if the catalog has no piece items.
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}
