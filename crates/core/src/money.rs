//! Money

use rust_decimal::{Decimal, RoundingStrategy, prelude::ToPrimitive};
use rusty_money::{
    Money,
    iso::{self, Currency},
};
use thiserror::Error;

/// Currency every catalog price, tariff rate and order total is expressed in.
pub const CURRENCY: &Currency = iso::INR;

/// Minor units (paise) per rupee.
const MINOR_PER_MAJOR: i64 = 100;

/// A price in the booking currency.
pub type Price = Money<'static, Currency>;

/// Errors raised while parsing a price string.
#[derive(Debug, Error, PartialEq)]
pub enum PriceParseError {
    /// The string was not in `AMOUNT CURRENCY` form or the amount was not a number.
    #[error("invalid price format: {0}")]
    InvalidFormat(String),

    /// The currency code is not the booking currency.
    #[error("unsupported currency code: {0}")]
    UnsupportedCurrency(String),
}

/// A whole-rupee price.
pub fn rupees(amount: i64) -> Price {
    Money::from_minor(amount.saturating_mul(MINOR_PER_MAJOR), CURRENCY)
}

/// A zero price.
pub fn zero() -> Price {
    Money::from_minor(0, CURRENCY)
}

/// Multiplies a price by a whole quantity, saturating on overflow.
pub fn times(price: &Price, quantity: u32) -> Price {
    Money::from_minor(
        price.to_minor_units().saturating_mul(i64::from(quantity)),
        CURRENCY,
    )
}

/// Multiplies a price by a decimal factor, rounding to whole paise (half away from zero).
pub fn scaled(price: &Price, factor: Decimal) -> Price {
    let minor = Decimal::from(price.to_minor_units())
        .checked_mul(factor)
        .map(|value| value.round_dp_with_strategy(0, RoundingStrategy::MidpointAwayFromZero))
        .and_then(|value| value.to_i64())
        .unwrap_or(i64::MAX);

    Money::from_minor(minor, CURRENCY)
}

/// Sums prices in minor units, saturating on overflow.
pub fn sum<'a>(prices: impl IntoIterator<Item = &'a Price>) -> Price {
    let minor = prices
        .into_iter()
        .fold(0_i64, |acc, price| acc.saturating_add(price.to_minor_units()));

    Money::from_minor(minor, CURRENCY)
}

/// A price from a rupee amount, rounded to whole paise (half away from zero).
pub fn from_rupees(amount: Decimal) -> Price {
    scaled(&rupees(1), amount)
}

/// Whole-rupee value of a price as a decimal (paise kept as the fractional part).
pub fn to_rupees(price: &Price) -> Decimal {
    Decimal::new(price.to_minor_units(), 2)
}

/// Parse a price string (e.g. `"29 INR"` or `"12.50 INR"`).
///
/// # Errors
///
/// Returns an error if the string is not in `AMOUNT CURRENCY` form, the amount is not a
/// decimal number, or the currency is not INR.
pub fn parse_price(s: &str) -> Result<Price, PriceParseError> {
    let mut parts = s.split_whitespace();

    let (Some(amount), Some(code), None) = (parts.next(), parts.next(), parts.next()) else {
        return Err(PriceParseError::InvalidFormat(format!(
            "expected 'AMOUNT CURRENCY', got: {s}"
        )));
    };

    if code != CURRENCY.iso_alpha_code {
        return Err(PriceParseError::UnsupportedCurrency(code.to_string()));
    }

    let amount = amount
        .parse::<Decimal>()
        .map_err(|_err| PriceParseError::InvalidFormat(s.to_string()))?;

    let minor = amount
        .checked_mul(Decimal::from(MINOR_PER_MAJOR))
        .and_then(|value| value.round_dp(0).to_i64())
        .ok_or_else(|| PriceParseError::InvalidFormat(s.to_string()))?;

    Ok(Money::from_minor(minor, CURRENCY))
}
