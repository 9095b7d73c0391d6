//! Order API response bodies.

use jiff::Timestamp;
use rust_decimal::Decimal;
use serde::Deserialize;
use washday::{
    money,
    orders::{OrderStatus, SubmittedOrder, TrackedOrder},
};

/// Error body returned with non-2xx responses.
#[derive(Debug, Default, Deserialize)]
pub(crate) struct ErrorBody {
    #[serde(default)]
    pub(crate) message: Option<String>,
}

impl ErrorBody {
    /// Parse an error body, tolerating empty or non-JSON text.
    pub(crate) fn parse(text: &str) -> Self {
        serde_json::from_str(text).unwrap_or_default()
    }
}

/// Order document returned by `POST /orders`.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct CreatedOrder {
    #[serde(rename = "_id")]
    id: String,
    order_number: String,
    #[serde(default = "pending")]
    status: OrderStatus,
    #[serde(default)]
    created_at: Option<Timestamp>,
}

fn pending() -> OrderStatus {
    OrderStatus::Pending
}

impl From<CreatedOrder> for SubmittedOrder {
    fn from(order: CreatedOrder) -> Self {
        Self {
            order_id: order.id,
            order_number: order.order_number,
            status: order.status,
            created_at: order.created_at.unwrap_or_else(Timestamp::now),
        }
    }
}

/// Order document returned by `GET /orders/track/{orderNumber}`.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct TrackedOrderBody {
    order_number: String,
    service_type: String,
    #[serde(default)]
    total_weight: Option<Decimal>,
    total_price: Decimal,
    status: OrderStatus,
    #[serde(default)]
    pickup_date: Option<Timestamp>,
    #[serde(default)]
    delivery_date: Option<Timestamp>,
    #[serde(default)]
    special_instructions: Option<String>,
}

impl From<TrackedOrderBody> for TrackedOrder {
    fn from(body: TrackedOrderBody) -> Self {
        Self {
            order_number: body.order_number,
            service_type: body.service_type,
            total_weight: body.total_weight.filter(|weight| !weight.is_zero()),
            total_price: money::from_rupees(body.total_price),
            status: body.status,
            pickup_date: body.pickup_date,
            delivery_date: body.delivery_date,
            special_instructions: body
                .special_instructions
                .filter(|text| !text.trim().is_empty()),
        }
    }
}
