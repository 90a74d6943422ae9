//! Service-specific error types

use thiserror::Error;

/// Reasons a webhook delivery is rejected.
///
/// These never propagate out of the handler; each maps to an HTTP status
/// and a fixed log entry.
#[derive(Error, Debug)]
pub enum Error {
    #[error("malformed webhook payload: {0}")]
    MalformedPayload(String),

    #[error("webhook HMAC did not match")]
    HmacMismatch,
}

/// Result alias using service Error
pub type Result<T> = std::result::Result<T, Error>;
