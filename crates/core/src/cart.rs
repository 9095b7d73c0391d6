//! Cart
//!
//! Piece-priced lines keyed by catalog item name. A line always has a quantity of at
//! least one; reducing it to zero removes the line.

use std::num::NonZeroU32;

use thiserror::Error;

use crate::{
    catalog::{CatalogItem, Category},
    money::{self, Price},
};

/// Errors related to cart line changes.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum CartError {
    /// No line exists for the named item.
    #[error("no cart line for item {0:?}")]
    UnknownItem(String),
}

/// A catalog item with a quantity.
#[derive(Debug, Clone, PartialEq)]
pub struct CartLine {
    name: String,
    category: Category,
    unit_price: Price,
    unit: Option<String>,
    quantity: NonZeroU32,
}

impl CartLine {
    fn new(item: &CatalogItem) -> Self {
        Self {
            name: item.name().to_string(),
            category: item.category(),
            unit_price: item.unit_price(),
            unit: item.unit().map(str::to_string),
            quantity: NonZeroU32::MIN,
        }
    }

    /// Catalog item name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Catalog section of the item.
    pub fn category(&self) -> Category {
        self.category
    }

    /// Price per piece.
    pub fn unit_price(&self) -> Price {
        self.unit_price
    }

    /// Display unit of the item, e.g. `pair`.
    pub fn unit(&self) -> Option<&str> {
        self.unit.as_deref()
    }

    /// Number of pieces, always at least one.
    pub fn quantity(&self) -> u32 {
        self.quantity.get()
    }

    /// Unit price multiplied by quantity.
    pub fn subtotal(&self) -> Price {
        money::times(&self.unit_price, self.quantity.get())
    }
}

/// Ordered collection of cart lines, at most one per item name.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Cart {
    lines: Vec<CartLine>,
}

impl Cart {
    /// Create an empty cart.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add one piece of the item, inserting a new line if needed.
    ///
    /// Returns the line's new quantity.
    pub fn add(&mut self, item: &CatalogItem) -> u32 {
        if let Some(line) = self.line_mut(item.name()) {
            line.quantity = line.quantity.saturating_add(1);

            return line.quantity.get();
        }

        self.lines.push(CartLine::new(item));

        NonZeroU32::MIN.get()
    }

    /// Adjust a line's quantity by `delta`, removing it when the result is zero or less.
    ///
    /// Returns the new quantity, or `None` if the line was removed.
    ///
    /// # Errors
    ///
    /// Returns [`CartError::UnknownItem`] if there is no line for `name`.
    pub fn change_quantity(&mut self, name: &str, delta: i64) -> Result<Option<u32>, CartError> {
        let position = self
            .position(name)
            .ok_or_else(|| CartError::UnknownItem(name.to_string()))?;

        let line = self
            .lines
            .get_mut(position)
            .ok_or_else(|| CartError::UnknownItem(name.to_string()))?;

        let requested = i64::from(line.quantity.get()).saturating_add(delta);
        let clamped = u32::try_from(requested.max(0)).unwrap_or(u32::MAX);

        if let Some(quantity) = NonZeroU32::new(clamped) {
            line.quantity = quantity;

            Ok(Some(quantity.get()))
        } else {
            self.lines.remove(position);

            Ok(None)
        }
    }

    /// Remove the line for `name`, returning it if it was present.
    pub fn remove(&mut self, name: &str) -> Option<CartLine> {
        self.position(name).map(|position| self.lines.remove(position))
    }

    /// Get the line for `name`.
    pub fn get(&self, name: &str) -> Option<&CartLine> {
        self.lines.iter().find(|line| line.name == name)
    }

    /// Lines in insertion order.
    pub fn lines(&self) -> &[CartLine] {
        &self.lines
    }

    /// Sum of line subtotals; zero for an empty cart.
    pub fn subtotal(&self) -> Price {
        let subtotals: Vec<Price> = self.lines.iter().map(CartLine::subtotal).collect();

        money::sum(&subtotals)
    }

    /// Total number of pieces across all lines.
    pub fn pieces(&self) -> u64 {
        self.lines.iter().map(|line| u64::from(line.quantity.get())).sum()
    }

    /// Get the number of lines in the cart.
    pub fn len(&self) -> usize {
        self.lines.len()
    }

    /// Check if the cart is empty.
    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    fn position(&self, name: &str) -> Option<usize> {
        self.lines.iter().position(|line| line.name == name)
    }

    fn line_mut(&mut self, name: &str) -> Option<&mut CartLine> {
        self.lines.iter_mut().find(|line| line.name == name)
    }
}
