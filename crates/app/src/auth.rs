//! Signed-in customer session.
//!
//! The login is persisted by the web client as `{ "user": {...}, "token": "...",
//! "isAuthenticated": true }`. It is read once from a file and passed explicitly to the
//! collaborators that need it.

use std::{fmt, fs, io, path::Path};

use async_trait::async_trait;
use jiff::Timestamp;
use serde::Deserialize;
use thiserror::Error;
use washday::{
    address::{AddressSource, AddressSourceError, RegisteredAddress},
    customer::{CustomerContext, CustomerId},
};
use zeroize::Zeroize;

/// Bearer token for the order API.
#[derive(Clone, Deserialize)]
#[serde(transparent)]
pub struct ApiToken(String);

impl ApiToken {
    /// Wrap a raw token.
    pub fn new(token: impl Into<String>) -> Self {
        Self(token.into())
    }

    /// Raw token for the `Authorization` header.
    pub fn expose(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for ApiToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("ApiToken(**redacted**)")
    }
}

impl Drop for ApiToken {
    fn drop(&mut self) {
        self.0.zeroize();
    }
}

/// Customer profile stored with the login.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserProfile {
    /// Account identifier.
    #[serde(rename = "_id")]
    pub id: String,

    /// Display name.
    pub name: String,

    /// Email address.
    #[serde(default)]
    pub email: Option<String>,

    /// Phone number.
    #[serde(default)]
    pub phone: Option<String>,

    /// Account role.
    #[serde(default)]
    pub role: Option<String>,

    /// Stored pickup address.
    #[serde(default)]
    pub address: Option<RegisteredAddress>,

    /// Account creation time.
    #[serde(default)]
    pub created_at: Option<Timestamp>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct StoredLogin {
    #[serde(default)]
    user: Option<UserProfile>,

    #[serde(default)]
    token: Option<ApiToken>,
}

/// Errors raised while reading the persisted login.
#[derive(Debug, Error)]
pub enum AuthFileError {
    /// The file could not be read.
    #[error("failed to read auth file: {0}")]
    Io(#[from] io::Error),

    /// The file is not a valid login document.
    #[error("failed to parse auth file: {0}")]
    Json(#[from] serde_json::Error),

    /// The file holds a signed-out state.
    #[error("not signed in; log in on the web client first")]
    SignedOut,
}

/// A signed-in customer.
#[derive(Debug, Clone)]
pub struct AuthSession {
    token: ApiToken,
    user: UserProfile,
}

impl AuthSession {
    /// Create a session from its parts.
    pub fn new(token: ApiToken, user: UserProfile) -> Self {
        Self { token, user }
    }

    /// Read a persisted login from `path`.
    ///
    /// # Errors
    ///
    /// Returns an [`AuthFileError`] if the file cannot be read or parsed, or holds no
    /// signed-in customer.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, AuthFileError> {
        Self::from_json(&fs::read_to_string(path)?)
    }

    /// Parse a persisted login document.
    ///
    /// # Errors
    ///
    /// Returns an [`AuthFileError`] if the document is invalid or signed out.
    pub fn from_json(json: &str) -> Result<Self, AuthFileError> {
        let stored: StoredLogin = serde_json::from_str(json)?;

        match (stored.token, stored.user) {
            (Some(token), Some(user)) if !token.expose().trim().is_empty() => {
                Ok(Self::new(token, user))
            }
            _ => Err(AuthFileError::SignedOut),
        }
    }

    /// Bearer token.
    pub fn token(&self) -> &ApiToken {
        &self.token
    }

    /// Customer profile.
    pub fn user(&self) -> &UserProfile {
        &self.user
    }

    /// Booking identity of the customer.
    pub fn customer(&self) -> CustomerContext {
        CustomerContext::new(CustomerId::new(self.user.id.clone()), self.user.name.clone())
    }

    /// Stored pickup address, ignoring one with every field blank.
    pub fn registered_address(&self) -> Option<&RegisteredAddress> {
        self.user
            .address
            .as_ref()
            .filter(|address| !address.is_blank())
    }
}

/// [`AddressSource`] answering from the signed-in customer's profile.
#[derive(Debug, Clone)]
pub struct SessionAddressSource {
    customer: CustomerId,
    address: Option<RegisteredAddress>,
}

impl SessionAddressSource {
    /// Create a source for the session's customer.
    pub fn new(session: &AuthSession) -> Self {
        Self {
            customer: CustomerId::new(session.user.id.clone()),
            address: session.registered_address().cloned(),
        }
    }
}

#[async_trait]
impl AddressSource for SessionAddressSource {
    async fn registered_address(
        &self,
        customer: &CustomerId,
    ) -> Result<Option<RegisteredAddress>, AddressSourceError> {
        if *customer != self.customer {
            return Err(AddressSourceError(format!(
                "no profile loaded for customer {customer}"
            )));
        }

        Ok(self.address.clone())
    }
}
