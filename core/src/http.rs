//! Fetch-style response types.
//!
//! # Design
//! `RawResponse` mirrors what a fetch client hands back: status, status
//! text, an iterable header collection, and a body that is only read when
//! asked for. The body sits behind the `ResponseBody` trait so the reqwest
//! transport can stream it lazily while custom transports and tests can
//! supply an in-memory buffer.

use std::fmt;

use async_trait::async_trait;
use bytes::Bytes;
use reqwest::StatusCode;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::TransportError;

/// The `{ url, method }` record passed to every `handle_response` call.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RequestData {
    pub url: String,
    pub method: String,
}

/// A response body that is materialized on demand.
#[async_trait]
pub trait ResponseBody: Send {
    async fn bytes(self: Box<Self>) -> Result<Bytes, TransportError>;
}

#[async_trait]
impl ResponseBody for Bytes {
    async fn bytes(self: Box<Self>) -> Result<Bytes, TransportError> {
        Ok(*self)
    }
}

/// A response as returned by an [`HttpTransport`](crate::HttpTransport).
pub struct RawResponse {
    status: u16,
    status_text: String,
    headers: Vec<(String, String)>,
    body: Box<dyn ResponseBody>,
}

impl RawResponse {
    pub fn new(
        status: u16,
        status_text: impl Into<String>,
        headers: Vec<(String, String)>,
        body: impl ResponseBody + 'static,
    ) -> Self {
        Self {
            status,
            status_text: status_text.into(),
            headers,
            body: Box::new(body),
        }
    }

    /// Build a response around an in-memory body. The status text is the
    /// canonical reason phrase for `status`.
    pub fn from_parts(status: u16, headers: Vec<(String, String)>, body: impl Into<Bytes>) -> Self {
        let status_text = StatusCode::from_u16(status)
            .ok()
            .and_then(|code| code.canonical_reason())
            .unwrap_or_default();
        Self::new(status, status_text, headers, body.into())
    }

    pub fn with_status_text(mut self, status_text: impl Into<String>) -> Self {
        self.status_text = status_text.into();
        self
    }

    pub fn status(&self) -> u16 {
        self.status
    }

    pub fn status_text(&self) -> &str {
        &self.status_text
    }

    /// Whether the status is in the 2xx range.
    pub fn ok(&self) -> bool {
        (200..300).contains(&self.status)
    }

    /// The header collection in the order the transport produced it.
    pub fn headers(&self) -> &[(String, String)] {
        &self.headers
    }

    pub async fn bytes(self) -> Result<Bytes, TransportError> {
        self.body.bytes().await
    }

    pub async fn text(self) -> Result<String, TransportError> {
        let bytes = self.bytes().await?;
        String::from_utf8(bytes.to_vec()).map_err(|e| TransportError::Body(e.to_string()))
    }

    /// Read the whole body and parse it as JSON. An empty body is an error.
    pub async fn json(self) -> Result<Value, TransportError> {
        let bytes = self.bytes().await?;
        Ok(serde_json::from_slice(&bytes)?)
    }
}

impl fmt::Debug for RawResponse {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RawResponse")
            .field("status", &self.status)
            .field("status_text", &self.status_text)
            .field("headers", &self.headers)
            .finish_non_exhaustive()
    }
}
