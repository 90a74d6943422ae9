//! Webhook callback handler
//!
//! Each delivery is decoded, authenticated against the client secret, and
//! recorded with exactly one log append whatever the outcome. A 401 tells
//! the provider's queue to retry; a 200 acknowledges the delivery.

use std::fmt::Write;

use axum::body::Body;
use axum::http::{HeaderMap, Request, StatusCode};
use axum::response::{IntoResponse, Response};
use hyper::ext::ReasonPhrase;
use tracing::{error, info, warn};
use weebly_auth::{ATTEMPT_HEADER, WebhookEvent};

use crate::error::{Error, Result};
use crate::{AppState, metrics};

/// Largest accepted delivery body
const MAX_BODY_BYTES: usize = 1024 * 1024;

const HMAC_INVALID_REASON: &[u8] = b"HMAC Invalid";

const MISMATCH_ENTRY: &str =
    "\nA new webhook was received, but its calculated hmac didn't match what was passed.\n";

const MALFORMED_ENTRY: &str = "\nA new webhook was received, but its body could not be decoded.\n";

/// Request headers copied into the log for accepted deliveries.
const TRACKED_HEADERS: [&str; 6] = [
    "Content-Length",
    "Content-Type",
    "Accept",
    "Host",
    "User-Agent",
    ATTEMPT_HEADER,
];

/// POST /webhooks/callback
pub async fn callback(state: &AppState, request: Request<Body>) -> Response {
    let (parts, body) = request.into_parts();
    let secret = state.credentials.client_secret.expose().as_bytes();

    let outcome = match axum::body::to_bytes(body, MAX_BODY_BYTES).await {
        Ok(bytes) => authenticate(&bytes, secret),
        Err(e) => Err(Error::MalformedPayload(format!("reading body: {e}"))),
    };

    match outcome {
        Ok(event) => {
            info!(event = %event.event, client_id = %event.client_id, "valid webhook received");
            metrics::record_webhook("valid");
            append(state, &valid_entry(&parts.headers, &event)).await;
            StatusCode::OK.into_response()
        }
        Err(Error::HmacMismatch) => {
            warn!("webhook HMAC mismatch");
            metrics::record_webhook("invalid_hmac");
            append(state, MISMATCH_ENTRY).await;
            hmac_invalid()
        }
        Err(Error::MalformedPayload(reason)) => {
            warn!(%reason, "rejecting malformed webhook");
            metrics::record_webhook("malformed");
            append(state, MALFORMED_ENTRY).await;
            (StatusCode::BAD_REQUEST, "Malformed webhook payload").into_response()
        }
    }
}

/// 401 whose status line reads `401 HMAC Invalid`.
fn hmac_invalid() -> Response {
    let mut response = (StatusCode::UNAUTHORIZED, "HMAC Invalid").into_response();
    response
        .extensions_mut()
        .insert(ReasonPhrase::from_static(HMAC_INVALID_REASON));
    response
}

/// Decode a delivery and check its signature.
fn authenticate(body: &[u8], secret: &[u8]) -> Result<WebhookEvent> {
    let event =
        WebhookEvent::from_slice(body).map_err(|e| Error::MalformedPayload(e.to_string()))?;
    if !event.verify(secret) {
        return Err(Error::HmacMismatch);
    }
    Ok(event)
}

fn valid_entry(headers: &HeaderMap, event: &WebhookEvent) -> String {
    let mut entry = String::from("\nA valid webhook was received:\nHeaders:\n");
    for name in TRACKED_HEADERS {
        let value = headers
            .get(name)
            .and_then(|v| v.to_str().ok())
            .unwrap_or("-");
        let _ = writeln!(entry, "  {name}: {value}");
    }
    entry.push_str("Data:\n");
    match serde_json::to_string_pretty(event) {
        Ok(data) => entry.push_str(&data),
        Err(e) => {
            let _ = write!(entry, "<unprintable: {e}>");
        }
    }
    entry.push('\n');
    entry
}

async fn append(state: &AppState, entry: &str) {
    if let Err(e) = state.log.append(entry).await {
        error!(path = %state.log.path().display(), error = %e, "failed to append to message log");
        metrics::record_log_error("append");
    }
}
