//! Order API client.

use async_trait::async_trait;
use reqwest::{Client, RequestBuilder, Response, StatusCode};
use thiserror::Error;
use tracing::debug;
use washday::{
    orders::{
        OrderSubmitter, OrderTracker, SubmissionError, SubmittedOrder, TrackedOrder,
        TrackingError,
    },
    session::SubmissionPayload,
};

use crate::{
    api::{
        requests::CreateOrderRequest,
        responses::{CreatedOrder, ErrorBody, TrackedOrderBody},
    },
    auth::ApiToken,
    config::api::ApiConfig,
};

pub mod requests;
mod responses;

/// Header carrying the booking's duplicate-suppression key.
pub const IDEMPOTENCY_KEY_HEADER: &str = "Idempotency-Key";

const DEFAULT_REJECTION: &str = "Failed to create order";

/// Errors raised while building the client.
#[derive(Debug, Error)]
pub enum ApiError {
    /// The HTTP client could not be constructed.
    #[error("http error: {0}")]
    Http(#[from] reqwest::Error),
}

/// HTTP client for the order API.
#[derive(Debug, Clone)]
pub struct ApiClient {
    base_url: String,
    token: Option<ApiToken>,
    http: Client,
}

impl ApiClient {
    /// Create a client. Requests carry `token` as a bearer credential when given.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be built.
    pub fn new(config: &ApiConfig, token: Option<ApiToken>) -> Result<Self, ApiError> {
        let http = Client::builder().timeout(config.timeout()).build()?;

        Ok(Self {
            base_url: config.base_url().to_string(),
            token,
            http,
        })
    }

    fn authorized(&self, request: RequestBuilder) -> RequestBuilder {
        match &self.token {
            Some(token) => request.bearer_auth(token.expose()),
            None => request,
        }
    }
}

async fn error_message(response: Response) -> Option<String> {
    let text = response.text().await.unwrap_or_default();

    ErrorBody::parse(&text).message
}

/// Map a non-success submission status and its error message.
pub(crate) fn submission_error(status: StatusCode, message: Option<String>) -> SubmissionError {
    match status {
        StatusCode::BAD_REQUEST | StatusCode::UNPROCESSABLE_ENTITY => SubmissionError::Validation {
            message: message.unwrap_or_else(|| DEFAULT_REJECTION.to_string()),
        },
        StatusCode::UNAUTHORIZED => SubmissionError::Unauthorized,
        _ => SubmissionError::Unavailable(match message {
            Some(message) => format!("status {status}: {message}"),
            None => format!("status {status}"),
        }),
    }
}

/// Map a non-success tracking status and its error message.
pub(crate) fn tracking_error(
    status: StatusCode,
    order_number: &str,
    message: Option<String>,
) -> TrackingError {
    match status {
        StatusCode::NOT_FOUND => TrackingError::NotFound(order_number.to_string()),
        _ => TrackingError::Unavailable(match message {
            Some(message) => format!("status {status}: {message}"),
            None => format!("status {status}"),
        }),
    }
}

#[async_trait]
impl OrderSubmitter for ApiClient {
    async fn submit(&self, payload: &SubmissionPayload) -> Result<SubmittedOrder, SubmissionError> {
        let url = format!("{}/orders", self.base_url);
        let body = CreateOrderRequest::from(payload);
        let idempotency_key = payload.idempotency_key().to_string();

        debug!(%url, %idempotency_key, "submitting order");

        let response = self
            .authorized(self.http.post(&url))
            .header(IDEMPOTENCY_KEY_HEADER, &idempotency_key)
            .json(&body)
            .send()
            .await
            .map_err(|error| SubmissionError::Unavailable(error.to_string()))?;

        let status = response.status();

        if !status.is_success() {
            return Err(submission_error(status, error_message(response).await));
        }

        let created: CreatedOrder = response
            .json()
            .await
            .map_err(|error| SubmissionError::Unavailable(format!("unexpected response: {error}")))?;

        Ok(created.into())
    }
}

#[async_trait]
impl OrderTracker for ApiClient {
    async fn track(&self, order_number: &str) -> Result<TrackedOrder, TrackingError> {
        let url = format!("{}/orders/track/{order_number}", self.base_url);

        debug!(%url, "tracking order");

        let response = self
            .authorized(self.http.get(&url))
            .send()
            .await
            .map_err(|error| TrackingError::Unavailable(error.to_string()))?;

        let status = response.status();

        if !status.is_success() {
            return Err(tracking_error(
                status,
                order_number,
                error_message(response).await,
            ));
        }

        let body: TrackedOrderBody = response
            .json()
            .await
            .map_err(|error| TrackingError::Unavailable(format!("unexpected response: {error}")))?;

        Ok(body.into())
    }
}
