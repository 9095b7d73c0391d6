//! Pickup Address

use async_trait::async_trait;
use mockall::automock;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::customer::CustomerId;

/// Address stored on the customer's account.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RegisteredAddress {
    /// House, building and street.
    #[serde(default)]
    pub street: String,

    /// Locality.
    #[serde(default)]
    pub area: String,

    /// City.
    #[serde(default)]
    pub city: String,

    /// Postal code.
    #[serde(default)]
    pub pincode: String,
}

impl RegisteredAddress {
    /// Single-line form, e.g. `"12 Link Road, Achole, Nallasopara - 401209"`.
    pub fn full_address(&self) -> String {
        format!(
            "{}, {}, {} - {}",
            self.street, self.area, self.city, self.pincode
        )
    }

    /// Check if every field is blank.
    pub fn is_blank(&self) -> bool {
        [&self.street, &self.area, &self.city, &self.pincode]
            .iter()
            .all(|field| field.trim().is_empty())
    }
}

/// A pickup address typed in for one booking.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CustomAddress {
    full_address: String,
    landmark: Option<String>,
}

impl CustomAddress {
    /// Create a custom address. Blank landmarks are dropped.
    pub fn new(full_address: impl Into<String>, landmark: Option<String>) -> Self {
        Self {
            full_address: full_address.into(),
            landmark: landmark.filter(|landmark| !landmark.trim().is_empty()),
        }
    }

    /// Full address text as entered.
    pub fn full_address(&self) -> &str {
        &self.full_address
    }

    /// Optional nearby landmark.
    pub fn landmark(&self) -> Option<&str> {
        self.landmark.as_deref()
    }

    /// Check if the full address is blank.
    pub fn is_blank(&self) -> bool {
        self.full_address.trim().is_empty()
    }
}

/// Where the order should be picked up from.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum PickupAddressChoice {
    /// The address stored on the customer's account.
    #[default]
    UseRegistered,

    /// An address entered for this booking only.
    Custom(CustomAddress),
}

/// Resolving a pickup address failed.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum AddressError {
    /// The registered address was chosen but the customer has none.
    #[error("no registered address on file")]
    MissingRegisteredAddress,

    /// The custom address is blank.
    #[error("pickup address is incomplete")]
    Incomplete,
}

/// Fully resolved pickup address sent with an order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PickupAddress {
    registered: Option<RegisteredAddress>,
    full_address: String,
    landmark: Option<String>,
}

impl PickupAddress {
    /// Resolve a choice against the customer's registered address.
    ///
    /// Registered fields are carried along whenever available, including for custom
    /// addresses. A registered address with every field blank counts as absent.
    ///
    /// # Errors
    ///
    /// Returns [`AddressError::MissingRegisteredAddress`] when the registered address was
    /// chosen but is absent, or [`AddressError::Incomplete`] when a custom address is blank.
    pub fn resolve(
        choice: &PickupAddressChoice,
        registered: Option<&RegisteredAddress>,
    ) -> Result<Self, AddressError> {
        let registered = registered.filter(|address| !address.is_blank());

        match choice {
            PickupAddressChoice::UseRegistered => {
                let registered = registered.ok_or(AddressError::MissingRegisteredAddress)?;

                Ok(Self {
                    full_address: registered.full_address(),
                    registered: Some(registered.clone()),
                    landmark: None,
                })
            }
            PickupAddressChoice::Custom(custom) => {
                if custom.is_blank() {
                    return Err(AddressError::Incomplete);
                }

                Ok(Self {
                    registered: registered.cloned(),
                    full_address: custom.full_address().trim().to_string(),
                    landmark: custom.landmark().map(|landmark| landmark.trim().to_string()),
                })
            }
        }
    }

    /// Registered address fields, when known.
    pub fn registered(&self) -> Option<&RegisteredAddress> {
        self.registered.as_ref()
    }

    /// Full address text.
    pub fn full_address(&self) -> &str {
        &self.full_address
    }

    /// Optional landmark (custom addresses only).
    pub fn landmark(&self) -> Option<&str> {
        self.landmark.as_deref()
    }
}

/// Address lookup failed.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("registered address lookup failed: {0}")]
pub struct AddressSourceError(pub String);

/// Source of a customer's registered address.
#[automock]
#[async_trait]
pub trait AddressSource: Send + Sync {
    /// The customer's stored address, if they have one.
    async fn registered_address(
        &self,
        customer: &CustomerId,
    ) -> Result<Option<RegisteredAddress>, AddressSourceError>;
}
