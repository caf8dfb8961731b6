//! Error types for the NYT API client.
//!
//! # Design
//! Validation failures (`Configuration`, `InvalidArgument`) are raised before
//! any request is built, so a caller never sees a partial side effect. Every
//! non-2xx response lands in `HttpError` with the raw status code and body,
//! untranslated. `Transport` covers failures of the HTTP collaborator itself
//! (DNS, connection refused, timeouts) where no response exists.

use thiserror::Error;

/// Errors returned by `NytClient` and `NytApi`.
#[derive(Debug, Error)]
pub enum ApiError {
    /// No usable API key was supplied when constructing the client.
    #[error("configuration error: {0}")]
    Configuration(String),

    /// A parameter is outside its allowed values or a mutually exclusive
    /// parameter set was not satisfied.
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    /// The server returned a non-2xx status.
    #[error("HTTP {status}: {body}")]
    HttpError { status: u16, body: String },

    /// The request could not be executed at all.
    #[error("transport failed: {0}")]
    Transport(String),

    /// The response body was not the JSON shape the endpoint returns.
    #[error("deserialization failed: {0}")]
    Deserialization(String),

    /// The envelope did not contain the field holding the results.
    #[error("response is missing field `{0}`")]
    MissingField(String),
}

impl ApiError {
    pub(crate) fn invalid(msg: impl Into<String>) -> Self {
        ApiError::InvalidArgument(msg.into())
    }
}
