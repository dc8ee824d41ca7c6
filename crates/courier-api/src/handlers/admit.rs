//! Message admission handler.
//!
//! Wraps the inbound payload into a message record, enqueues it, and
//! acknowledges immediately. The caller is told the message is *queued*,
//! not delivered; delivery is fire-and-forget from its perspective.

use std::sync::Arc;

use axum::{
    extract::{Extension, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use bytes::Bytes;
use courier_core::Message;
use courier_delivery::RelayEngine;
use serde::Serialize;
use tracing::{info, instrument, warn};

use crate::middleware::auth::AuthHeader;

/// Acknowledgment returned for an admitted message.
#[derive(Debug, Serialize)]
pub struct AdmitResponse {
    /// Ack text including the assigned message ID
    pub message: String,
}

/// Error body for rejected admissions.
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    /// Human-readable error description
    pub error: String,
}

/// Admits a message into the delivery queue.
///
/// The credential was already presence-checked by the auth middleware;
/// its verbatim value arrives as a request extension and is carried on
/// every delivery attempt. The response never waits on delivery.
///
/// # Errors
///
/// Returns 503 when a configured queue capacity bound is reached; the
/// message is not enqueued.
#[instrument(
    name = "admit_message",
    skip(engine, auth_header, body),
    fields(payload_bytes = body.len())
)]
pub async fn admit_message(
    State(engine): State<Arc<RelayEngine>>,
    Extension(AuthHeader(auth_header)): Extension<AuthHeader>,
    body: Bytes,
) -> Response {
    let message = Message::new(body, auth_header);
    let message_id = message.id;

    info!(message_id = %message_id, "message received");

    match engine.admit(message) {
        Ok(()) => {
            info!(
                message_id = %message_id,
                queue_depth = engine.queue_depth(),
                "message queued"
            );
            (
                StatusCode::OK,
                Json(AdmitResponse { message: format!("Message {message_id} queued") }),
            )
                .into_response()
        },
        Err(full) => {
            warn!(message_id = %message_id, capacity = full.capacity, "admission rejected");
            (StatusCode::SERVICE_UNAVAILABLE, Json(ErrorResponse { error: full.to_string() }))
                .into_response()
        },
    }
}
