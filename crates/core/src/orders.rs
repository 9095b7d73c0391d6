//! Orders
//!
//! Boundary types for the order API: what a submission returns, how it can fail, and the
//! read-only view used for tracking.

use std::{fmt, str::FromStr};

use async_trait::async_trait;
use jiff::Timestamp;
use mockall::automock;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::{money::Price, session::SubmissionPayload};

/// Lifecycle status of a persisted order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum OrderStatus {
    /// Placed, awaiting pickup.
    Pending,

    /// Collected from the customer.
    PickedUp,

    /// Being washed.
    Processing,

    /// Ready for delivery.
    Ready,

    /// Returned to the customer.
    Delivered,

    /// Cancelled before completion.
    Cancelled,
}

impl OrderStatus {
    /// Wire identifier.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::PickedUp => "picked-up",
            Self::Processing => "processing",
            Self::Ready => "ready",
            Self::Delivered => "delivered",
            Self::Cancelled => "cancelled",
        }
    }

    /// Check if the order is still in progress.
    #[must_use]
    pub const fn is_active(self) -> bool {
        !matches!(self, Self::Delivered | Self::Cancelled)
    }
}

impl fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Unrecognised order status.
#[derive(Debug, Error, PartialEq, Eq)]
#[error("unknown order status: {0}")]
pub struct UnknownOrderStatus(pub String);

impl FromStr for OrderStatus {
    type Err = UnknownOrderStatus;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value {
            "pending" => Ok(Self::Pending),
            "picked-up" => Ok(Self::PickedUp),
            "processing" => Ok(Self::Processing),
            "ready" => Ok(Self::Ready),
            "delivered" => Ok(Self::Delivered),
            "cancelled" => Ok(Self::Cancelled),
            other => Err(UnknownOrderStatus(other.to_string())),
        }
    }
}

/// An order accepted by the order API.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubmittedOrder {
    /// Persistent identifier.
    pub order_id: String,

    /// Customer-facing order number used for tracking.
    pub order_number: String,

    /// Status at creation.
    pub status: OrderStatus,

    /// Creation time.
    pub created_at: Timestamp,
}

/// The order API did not accept a submission.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum SubmissionError {
    /// The API rejected the payload.
    #[error("order rejected: {message}")]
    Validation {
        /// Reason given by the API.
        message: String,
    },

    /// The customer's credentials were refused.
    #[error("not signed in or session expired")]
    Unauthorized,

    /// The API could not be reached or returned an unexpected response.
    #[error("order service unavailable: {0}")]
    Unavailable(String),
}

/// Accepts assembled booking payloads.
#[automock]
#[async_trait]
pub trait OrderSubmitter: Send + Sync {
    /// Submit a payload once. Implementations must not retry.
    async fn submit(&self, payload: &SubmissionPayload) -> Result<SubmittedOrder, SubmissionError>;
}

/// Read-only view of an order for tracking.
#[derive(Debug, Clone, PartialEq)]
pub struct TrackedOrder {
    /// Customer-facing order number.
    pub order_number: String,

    /// Service identifier as stored (`wash-iron`, `per-piece`, ...).
    pub service_type: String,

    /// Estimated weight for per-kg orders.
    pub total_weight: Option<Decimal>,

    /// Order total.
    pub total_price: Price,

    /// Current status.
    pub status: OrderStatus,

    /// Scheduled pickup.
    pub pickup_date: Option<Timestamp>,

    /// Expected or actual delivery.
    pub delivery_date: Option<Timestamp>,

    /// Care instructions given at booking.
    pub special_instructions: Option<String>,
}

/// Tracking lookup failed.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum TrackingError {
    /// No order has that number.
    #[error("order {0} not found")]
    NotFound(String),

    /// The API could not be reached or returned an unexpected response.
    #[error("order service unavailable: {0}")]
    Unavailable(String),
}

/// Looks up orders by order number.
#[automock]
#[async_trait]
pub trait OrderTracker: Send + Sync {
    /// Fetch the current view of an order.
    async fn track(&self, order_number: &str) -> Result<TrackedOrder, TrackingError>;
}
