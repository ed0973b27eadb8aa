//! Error types for the shop API client.
//!
//! `HttpError` is the one failure the smoke test reports inline; every other
//! variant aborts the run and is printed by the top-level guard.

use thiserror::Error;

/// Errors returned by `ShopClient` and `Transport` implementations.
#[derive(Debug, Error)]
pub enum ApiError {
    /// The server answered with a status other than the expected one.
    #[error("HTTP {status}: {body}")]
    HttpError { status: u16, body: String },

    /// The response body could not be deserialized into the expected type.
    #[error("deserialization failed: {0}")]
    DeserializationError(String),

    /// The request payload could not be serialized to JSON.
    #[error("serialization failed: {0}")]
    SerializationError(String),

    /// No response was obtained (connection refused, DNS failure, bad URL).
    #[error("transport failed: {0}")]
    TransportError(String),
}

/// Errors that escape a verification flow.
#[derive(Debug, Error)]
pub enum VerifyError {
    #[error(transparent)]
    Api(#[from] ApiError),

    /// Writing the console report failed.
    #[error("console write failed: {0}")]
    Output(#[from] std::io::Error),
}
