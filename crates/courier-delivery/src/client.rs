//! HTTP client for message delivery with a per-attempt timeout.
//!
//! Performs exactly one delivery attempt: the payload bytes are posted to
//! the resolved destination unchanged, with the caller's credential
//! forwarded verbatim. Failures are categorized for the retry scheduler;
//! the client never decides retry vs. drop itself.

use std::time::Duration;

use bytes::Bytes;
use courier_core::MessageId;
use tracing::{info_span, Instrument};

use crate::error::{DeliveryError, Result};

/// Configuration for the delivery client.
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// Timeout applied to each delivery attempt.
    pub timeout: Duration,
    /// User agent string for outbound requests.
    pub user_agent: String,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            timeout: Duration::from_secs(crate::DEFAULT_TIMEOUT_SECONDS),
            user_agent: "Courier-Relay/1.0".to_string(),
        }
    }
}

/// HTTP client shared by all delivery tasks.
///
/// Wraps a pooled `reqwest::Client` so concurrent attempts reuse
/// connections. Cloning is cheap and shares the pool.
#[derive(Debug, Clone)]
pub struct DeliveryClient {
    client: reqwest::Client,
    config: ClientConfig,
}

/// One delivery attempt for one message.
#[derive(Debug, Clone)]
pub struct DeliveryRequest {
    /// Message being delivered.
    pub message_id: MessageId,
    /// Resolved destination URL.
    pub url: String,
    /// Original payload bytes, forwarded unchanged.
    pub body: Bytes,
    /// Caller's credential, forwarded verbatim.
    pub auth_header: String,
    /// Attempt number for this delivery (1-based).
    pub attempt_number: u32,
}

/// Successful outcome of a delivery attempt.
#[derive(Debug, Clone)]
pub struct DeliveryResponse {
    /// HTTP status code (2xx).
    pub status_code: u16,
    /// Total duration of the request.
    pub duration: Duration,
}

impl DeliveryClient {
    /// Creates a new delivery client with the given configuration.
    ///
    /// # Errors
    ///
    /// Returns `DeliveryError::Configuration` if the underlying HTTP
    /// client cannot be built with the provided settings.
    pub fn new(config: ClientConfig) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(config.timeout)
            .user_agent(&config.user_agent)
            .build()
            .map_err(|e| {
                DeliveryError::configuration(format!("failed to build HTTP client: {e}"))
            })?;

        Ok(Self { client, config })
    }

    /// Creates a delivery client with default configuration.
    pub fn with_defaults() -> Result<Self> {
        Self::new(ClientConfig::default())
    }

    /// Attempts exactly one delivery to the destination.
    ///
    /// # Errors
    ///
    /// Returns a categorized error on failure:
    /// - `Network` for connection failures
    /// - `Timeout` when the per-attempt timeout elapses
    /// - `Status` for any non-2xx response
    pub async fn deliver(&self, request: DeliveryRequest) -> Result<DeliveryResponse> {
        let start_time = std::time::Instant::now();

        let span = info_span!(
            "message_delivery",
            message_id = %request.message_id,
            url = %request.url,
            attempt = request.attempt_number
        );

        async move {
            tracing::debug!("starting delivery attempt");

            let response = self
                .client
                .post(&request.url)
                .body(request.body.clone())
                .header("content-type", "application/json")
                .header("authorization", &request.auth_header)
                .header("X-Courier-Message-Id", request.message_id.to_string())
                .header("X-Courier-Attempt", request.attempt_number.to_string())
                .send()
                .await
                .map_err(|e| {
                    let duration = start_time.elapsed();
                    tracing::warn!(duration_ms = duration.as_millis(), "request failed: {}", e);

                    if e.is_timeout() {
                        DeliveryError::timeout(self.config.timeout.as_secs())
                    } else if e.is_connect() {
                        DeliveryError::network(format!("connection failed: {e}"))
                    } else {
                        DeliveryError::network(e.to_string())
                    }
                })?;

            let duration = start_time.elapsed();
            let status_code = response.status().as_u16();

            if response.status().is_success() {
                tracing::info!(
                    status = status_code,
                    duration_ms = duration.as_millis(),
                    "message delivered"
                );
                return Ok(DeliveryResponse { status_code, duration });
            }

            let body = read_truncated_body(response).await;
            tracing::warn!(status = status_code, "non-success response from destination");

            Err(DeliveryError::status(status_code, body))
        }
        .instrument(span)
        .await
    }
}

/// Reads a response body for error context, truncated for log hygiene.
async fn read_truncated_body(response: reqwest::Response) -> String {
    const MAX_BODY_SIZE: usize = 1024;

    match response.bytes().await {
        Ok(bytes) if bytes.len() > MAX_BODY_SIZE => {
            format!("{}... (truncated)", String::from_utf8_lossy(&bytes[..MAX_BODY_SIZE]))
        },
        Ok(bytes) => String::from_utf8_lossy(&bytes).into_owned(),
        Err(e) => format!("[failed to read response body: {e}]"),
    }
}
