//! Error types for the HTTP client.
//!
//! # Design
//! Transport failures keep their source error boxed so any `Transport`
//! implementation can report through the same variant. Non-2xx statuses are
//! not errors: they come back as ordinary responses. `Decode` and
//! `UnexpectedJson` are only produced by the JSON views of a body, never by
//! the request itself.

use thiserror::Error;

/// Errors returned by `HttpClient`, `Session` and `Response` views.
#[derive(Debug, Error)]
pub enum HttpError {
    /// The target URL could not be parsed as an absolute URL.
    #[error("invalid url `{url}`: {source}")]
    InvalidUrl {
        url: String,
        #[source]
        source: url::ParseError,
    },

    /// Network, DNS, TLS or timeout failure inside the transfer library.
    #[error("transport failure: {0}")]
    Transport(#[source] Box<dyn std::error::Error + Send + Sync>),

    /// The request data could not be encoded as JSON.
    #[error("failed to encode request body: {0}")]
    Encode(#[source] serde_json::Error),

    /// The response body is not valid JSON for the requested view.
    #[error("failed to decode response body: {0}")]
    Decode(#[source] serde_json::Error),

    /// The body is valid JSON but not of the requested shape.
    #[error("response body is not a JSON {expected}")]
    UnexpectedJson { expected: &'static str },

    /// A session accessor was used before any request succeeded.
    #[error("no response has been received yet")]
    NoResponse,
}

impl HttpError {
    /// Wrap any error raised by a transfer library.
    pub fn transport<E>(err: E) -> Self
    where
        E: Into<Box<dyn std::error::Error + Send + Sync>>,
    {
        HttpError::Transport(err.into())
    }
}
