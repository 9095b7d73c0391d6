//! Customer Context

use std::fmt;

use serde::{Deserialize, Serialize};

/// Identifier the order API assigns to a customer account.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CustomerId(String);

impl CustomerId {
    /// Wrap an identifier.
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// The raw identifier.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for CustomerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// The signed-in customer a booking session is made for.
///
/// Passed explicitly into each session and collaborator call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CustomerContext {
    id: CustomerId,
    name: String,
}

impl CustomerContext {
    /// Create a context.
    pub fn new(id: CustomerId, name: impl Into<String>) -> Self {
        Self {
            id,
            name: name.into(),
        }
    }

    /// Customer identifier.
    pub fn id(&self) -> &CustomerId {
        &self.id
    }

    /// Display name.
    pub fn name(&self) -> &str {
        &self.name
    }
}
