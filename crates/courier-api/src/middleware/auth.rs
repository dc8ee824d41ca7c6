//! Credential-presence middleware for admission.
//!
//! The relay does not validate credentials; it only requires one to be
//! present, and forwards it downstream verbatim. Requests without a
//! non-empty `Authorization` header are rejected synchronously and never
//! enqueued.

use axum::{
    body::Body,
    http::{HeaderMap, Request, StatusCode},
    middleware::Next,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;

/// The verbatim `Authorization` value, injected as a request extension
/// for the admission handler.
#[derive(Debug, Clone)]
pub struct AuthHeader(pub String);

/// Extracts a non-empty Authorization header value, verbatim.
fn extract_auth_header(headers: &HeaderMap) -> Option<String> {
    headers
        .get("authorization")
        .and_then(|v| v.to_str().ok())
        .filter(|s| !s.is_empty())
        .map(String::from)
}

/// Errors that can occur during the credential presence check.
#[derive(Debug)]
pub enum AuthError {
    /// The Authorization header is missing or empty.
    MissingHeader,
}

impl IntoResponse for AuthError {
    fn into_response(self) -> Response {
        match self {
            Self::MissingHeader => (
                StatusCode::FORBIDDEN,
                Json(json!({ "error": "Missing Authorization header" })),
            )
                .into_response(),
        }
    }
}

/// Axum middleware enforcing credential presence on admission.
pub async fn require_auth(mut req: Request<Body>, next: Next) -> Result<Response, AuthError> {
    let auth_header = extract_auth_header(req.headers()).ok_or(AuthError::MissingHeader)?;

    req.extensions_mut().insert(AuthHeader(auth_header));

    Ok(next.run(req).await)
}
