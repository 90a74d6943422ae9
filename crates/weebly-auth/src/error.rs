//! Error types for provider operations

/// Errors from calls to the Weebly endpoints.
///
/// HTTP status codes are not inspected: a 4xx/5xx with a JSON body decodes
/// normally and callers check the decoded fields.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("HTTP request failed: {0}")]
    Http(String),

    #[error("response decode failed: {0}")]
    Decode(String),
}

/// Result alias for provider operations.
pub type Result<T> = std::result::Result<T, Error>;
