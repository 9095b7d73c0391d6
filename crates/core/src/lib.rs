//! Washday
//!
//! Washday is the booking engine behind a laundry pickup service: catalog and tariff,
//! per-piece and per-kg pricing, live location capture, pickup address resolution and
//! order submission.

pub mod address;
pub mod cart;
pub mod catalog;
pub mod checkout;
pub mod customer;
pub mod errors;
pub mod location;
pub mod money;
pub mod orders;
pub mod pricing;
pub mod session;
pub mod tracking;
