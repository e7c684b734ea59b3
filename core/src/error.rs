//! Error types for the fetch adapter.
//!
//! # Design
//! `TransportError` covers everything that goes wrong before a response can
//! be handed to the adapter: the request never left, the connection failed,
//! or the body could not be read. Those errors are never routed through
//! `Adapter::handle_response`.
//!
//! `AjaxError` is what `FetchAdapter::ajax` rejects with. `Rejected` carries
//! whatever the adapter built from an HTTP error response (or a 2xx body it
//! flagged as an error), so the data-access layer gets its own error type
//! back unchanged.

use thiserror::Error;

/// Failures raised by the transport itself, before or while reading a
/// response.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TransportError {
    /// The server could not be reached (DNS, refused, reset).
    #[error("connection error: {0}")]
    Connection(String),

    /// The request failed for any other transport reason.
    #[error("request failed: {0}")]
    Request(String),

    /// The response body could not be read.
    #[error("failed to read response body: {0}")]
    Body(String),

    /// The response body was read but is not valid JSON.
    #[error("invalid JSON body: {0}")]
    Json(String),

    #[error("invalid URL {url}: {message}")]
    InvalidUrl { url: String, message: String },

    #[error("invalid HTTP method: {0}")]
    InvalidMethod(String),

    #[error("invalid header {name}: {message}")]
    InvalidHeader { name: String, message: String },
}

impl From<reqwest::Error> for TransportError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_connect() {
            TransportError::Connection(err.to_string())
        } else if err.is_body() || err.is_decode() {
            TransportError::Body(err.to_string())
        } else {
            TransportError::Request(err.to_string())
        }
    }
}

impl From<serde_json::Error> for TransportError {
    fn from(err: serde_json::Error) -> Self {
        TransportError::Json(err.to_string())
    }
}

/// Outcome of a failed `ajax` call.
#[derive(Debug, Error)]
pub enum AjaxError<R> {
    /// The transport failed; no response reached the adapter.
    #[error("transport error: {0}")]
    Transport(TransportError),

    /// A 2xx response arrived but its body could not be parsed.
    #[error("invalid response body: {0}")]
    InvalidBody(TransportError),

    /// The adapter's `handle_response` produced this value for an HTTP error
    /// or flagged it as an adapter error.
    #[error("request rejected by adapter")]
    Rejected(R),
}

impl<R> AjaxError<R> {
    /// The adapter-built error value, if this is a rejection.
    pub fn into_rejected(self) -> Option<R> {
        match self {
            AjaxError::Rejected(value) => Some(value),
            _ => None,
        }
    }

    pub fn is_transport(&self) -> bool {
        matches!(self, AjaxError::Transport(_))
    }
}
