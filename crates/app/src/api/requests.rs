//! Order API request bodies.

use jiff::Timestamp;
use rust_decimal::{Decimal, prelude::ToPrimitive};
use serde::Serialize;
use washday::{
    catalog::Category,
    money::{self, Price},
    pricing::PricingMode,
    session::{OrderSelection, PayloadItem, SubmissionPayload},
};

/// Body of `POST /orders`.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateOrderRequest {
    pub(crate) idempotency_key: String,
    pub(crate) pricing_mode: PricingMode,
    pub(crate) service_type: &'static str,
    pub(crate) total_weight: f64,
    pub(crate) items: Vec<OrderItem>,
    pub(crate) total_price: f64,
    pub(crate) pickup_address: PickupAddressBody,
    pub(crate) live_location: LiveLocationBody,
    pub(crate) pickup_date: Timestamp,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub(crate) special_instructions: Option<String>,
}

/// One entry of the `items` array.
#[derive(Debug, Clone, Serialize)]
#[serde(untagged)]
pub(crate) enum OrderItem {
    Piece {
        name: String,
        category: Category,
        price: f64,
        #[serde(skip_serializing_if = "Option::is_none")]
        unit: Option<String>,
        quantity: u32,
    },
    Bulk {
        #[serde(rename = "type")]
        kind: &'static str,
        weight: f64,
    },
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct PickupAddressBody {
    #[serde(skip_serializing_if = "Option::is_none")]
    street: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    area: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    city: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pincode: Option<String>,
    full_address: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    landmark: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
pub(crate) struct LiveLocationBody {
    latitude: f64,
    longitude: f64,
    address: String,
    timestamp: Timestamp,
}

fn decimal_number(value: Decimal) -> f64 {
    value.to_f64().unwrap_or_default()
}

fn price_number(price: &Price) -> f64 {
    decimal_number(money::to_rupees(price))
}

impl From<&PayloadItem> for OrderItem {
    fn from(item: &PayloadItem) -> Self {
        Self::Piece {
            name: item.name.clone(),
            category: item.category,
            price: price_number(&item.unit_price),
            unit: item.unit.clone(),
            quantity: item.quantity,
        }
    }
}

impl From<&SubmissionPayload> for CreateOrderRequest {
    fn from(payload: &SubmissionPayload) -> Self {
        let (service_type, total_weight, items) = match payload.selection() {
            OrderSelection::PerPiece { items } => (
                PricingMode::PerPiece.as_str(),
                0.0,
                items.iter().map(OrderItem::from).collect(),
            ),
            OrderSelection::PerWeight {
                service_type,
                weight,
            } => {
                let weight = decimal_number(weight.get());

                (
                    service_type.as_str(),
                    weight,
                    vec![OrderItem::Bulk {
                        kind: "clothes",
                        weight,
                    }],
                )
            }
        };

        let address = payload.pickup_address();
        let registered = address.registered();
        let location = payload.location();
        let coordinates = location.coordinates();

        Self {
            idempotency_key: payload.idempotency_key().to_string(),
            pricing_mode: payload.mode(),
            service_type,
            total_weight,
            items,
            total_price: price_number(&payload.total_price()),
            pickup_address: PickupAddressBody {
                street: registered.map(|fields| fields.street.clone()),
                area: registered.map(|fields| fields.area.clone()),
                city: registered.map(|fields| fields.city.clone()),
                pincode: registered.map(|fields| fields.pincode.clone()),
                full_address: address.full_address().to_string(),
                landmark: address.landmark().map(str::to_string),
            },
            live_location: LiveLocationBody {
                latitude: coordinates.latitude,
                longitude: coordinates.longitude,
                address: location.resolved_address().to_string(),
                timestamp: location.captured_at(),
            },
            pickup_date: payload.pickup_at(),
            special_instructions: payload.instructions().map(str::to_string),
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use jiff::SignedDuration;
    use serde_json::{Value, json};
    use testresult::TestResult;
    use washday::{
        address::{CustomAddress, PickupAddressChoice, RegisteredAddress},
        catalog::Catalog,
        customer::{CustomerContext, CustomerId},
        location::{Coordinates, GeolocationProvider},
        pricing::tariff::ServiceType,
        session::BookingSession,
    };

    use crate::geocoding::{FixedPosition, NoGeocoder};

    use super::*;

    fn registered() -> RegisteredAddress {
        RegisteredAddress {
            street: "B-204, Shanti Nagar".to_string(),
            area: "Achole".to_string(),
            city: "Nallasopara".to_string(),
            pincode: "401209".to_string(),
        }
    }

    async fn session() -> TestResult<BookingSession> {
        let provider = GeolocationProvider::new(
            Arc::new(FixedPosition::new(Some(Coordinates::new(19.5, 72.75)))),
            Arc::new(NoGeocoder),
        );

        let mut session = BookingSession::new(
            Arc::new(Catalog::standard()?),
            CustomerContext::new(CustomerId::new("64b7f0c2a1"), "Asha Patil"),
            provider,
        );

        session.capture_location().await?;
        session.set_schedule(Timestamp::now().checked_add(SignedDuration::from_hours(6))?)?;

        Ok(session)
    }

    #[tokio::test]
    async fn per_weight_request_matches_wire_shape() -> TestResult {
        let mut session = session().await?;
        session.set_weight(ServiceType::WashIron, Decimal::new(25, 1))?;

        let payload = session.build_submission_payload(Some(&registered()))?;
        let body = serde_json::to_value(CreateOrderRequest::from(&payload))?;

        assert_eq!(body["pricingMode"], json!("per-kg"));
        assert_eq!(body["serviceType"], json!("wash-iron"));
        assert_eq!(body["totalWeight"], json!(2.5));
        assert_eq!(body["items"], json!([{ "type": "clothes", "weight": 2.5 }]));
        assert_eq!(body["totalPrice"], json!(372.5));
        assert_eq!(
            body["pickupAddress"]["fullAddress"],
            json!("B-204, Shanti Nagar, Achole, Nallasopara - 401209")
        );
        assert_eq!(body["pickupAddress"]["pincode"], json!("401209"));
        assert_eq!(body["liveLocation"]["address"], json!("Lat: 19.5, Lng: 72.75"));
        assert_eq!(
            body["idempotencyKey"],
            json!(session.idempotency_key().to_string())
        );
        assert_eq!(body.get("specialInstructions"), None);

        Ok(())
    }

    #[tokio::test]
    async fn per_piece_request_lists_items() -> TestResult {
        let mut session = session().await?;
        session.set_mode(PricingMode::PerPiece);
        session.add_item("Shirt (Ironed)")?;
        session.add_item("Shirt (Ironed)")?;
        session.add_item("Normal Cleaning")?;
        session.set_address_choice(PickupAddressChoice::Custom(CustomAddress::new(
            "Flat 12, Sai Darshan, Tulinj Road",
            Some("Near Tulinj police station".to_string()),
        )));
        session.set_instructions(Some("Fold, do not hang".to_string()));

        let payload = session.build_submission_payload(Some(&registered()))?;
        let body = serde_json::to_value(CreateOrderRequest::from(&payload))?;

        assert_eq!(body["pricingMode"], json!("per-piece"));
        assert_eq!(body["serviceType"], json!("per-piece"));
        assert_eq!(body["totalWeight"], json!(0.0));
        assert_eq!(
            body["items"],
            json!([
                { "name": "Shirt (Ironed)", "category": "clothing", "price": 29.0, "quantity": 2 },
                { "name": "Normal Cleaning", "category": "shoes", "price": 249.0, "unit": "pair", "quantity": 1 }
            ])
        );
        assert_eq!(body["totalPrice"], json!(307.0));
        assert_eq!(
            body["pickupAddress"]["landmark"],
            json!("Near Tulinj police station")
        );
        assert_eq!(body["pickupAddress"]["city"], json!("Nallasopara"));
        assert_eq!(body["specialInstructions"], json!("Fold, do not hang"));
        assert!(matches!(body["pickupDate"], Value::String(_)));

        Ok(())
    }
}
