//! Fetch-style HTTP transport.
//!
//! # Design
//! `HttpTransport` is the single I/O seam: it takes a translated
//! `TransportOptions` and returns a `RawResponse` or a `TransportError`. It
//! does not look at the status code, retry, or time out; classifying the
//! response is `FetchAdapter`'s job.
//!
//! `ReqwestTransport` is the production implementation. Relative URLs such
//! as `/items` are resolved against an optional base URL. Response headers
//! are folded the way fetch's `Headers` iterates them: one entry per
//! lowercase name, repeated values joined with `", "`, sorted by name.

use std::collections::BTreeMap;

use async_trait::async_trait;
use bytes::Bytes;
use hyper::ext::ReasonPhrase;
use reqwest::header::{HeaderMap, HeaderName, HeaderValue};
use reqwest::{Client, Method};
use serde_json::Value;
use tracing::{debug, trace};
use url::Url;

use crate::error::TransportError;
use crate::headers::{insert_header, Headers};
use crate::http::{RawResponse, ResponseBody};
use crate::options::TransportOptions;

/// Sends a translated request and hands back the raw response.
#[async_trait]
pub trait HttpTransport: Send + Sync {
    async fn send(&self, request: &TransportOptions) -> Result<RawResponse, TransportError>;
}

/// `HttpTransport` backed by a `reqwest::Client`.
///
/// The `credentials` policy of a request is carried through for custom
/// transports but has no effect here: the client keeps no cookie store.
#[derive(Debug, Clone, Default)]
pub struct ReqwestTransport {
    client: Client,
    base_url: Option<Url>,
    default_headers: Headers,
}

impl ReqwestTransport {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_client(client: Client) -> Self {
        Self {
            client,
            ..Self::default()
        }
    }

    /// Resolve relative request URLs against `base_url`.
    pub fn with_base_url(mut self, base_url: &str) -> Result<Self, TransportError> {
        let url = Url::parse(base_url).map_err(|e| TransportError::InvalidUrl {
            url: base_url.to_string(),
            message: e.to_string(),
        })?;
        self.base_url = Some(url);
        Ok(self)
    }

    /// Add a header sent with every request. Request headers of the same
    /// name replace it.
    pub fn with_default_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        insert_header(&mut self.default_headers, name, value);
        self
    }

    fn resolve_url(&self, url: &str) -> Result<Url, TransportError> {
        let resolved = match &self.base_url {
            Some(base) => base.join(url),
            None => Url::parse(url),
        };
        resolved.map_err(|e| TransportError::InvalidUrl {
            url: url.to_string(),
            message: e.to_string(),
        })
    }

    /// Request headers replace defaults whose names match in any case.
    fn request_headers(&self, request: &TransportOptions) -> Result<HeaderMap, TransportError> {
        let mut map = HeaderMap::with_capacity(self.default_headers.len());
        let request_headers = request.headers.iter().flatten();
        for (name, value) in self.default_headers.iter().chain(request_headers) {
            let header_name =
                HeaderName::from_bytes(name.as_bytes()).map_err(|e| TransportError::InvalidHeader {
                    name: name.clone(),
                    message: e.to_string(),
                })?;
            let header_value =
                HeaderValue::from_str(value).map_err(|e| TransportError::InvalidHeader {
                    name: name.clone(),
                    message: e.to_string(),
                })?;
            map.insert(header_name, header_value);
        }
        Ok(map)
    }
}

#[async_trait]
impl HttpTransport for ReqwestTransport {
    async fn send(&self, request: &TransportOptions) -> Result<RawResponse, TransportError> {
        let url = self.resolve_url(&request.url)?;
        let method = Method::from_bytes(request.method.as_bytes())
            .map_err(|_| TransportError::InvalidMethod(request.method.clone()))?;
        let headers = self.request_headers(request)?;

        debug!(%method, %url, "sending request");
        trace!(credentials = ?request.credentials, has_body = request.body.is_some());

        let mut builder = self.client.request(method, url).headers(headers);
        if let Some(body) = &request.body {
            builder = builder.body(encode_body(body));
        }

        let response = builder.send().await?;
        let status = response.status();
        debug!(status = status.as_u16(), "received response");

        let status_text = match response.extensions().get::<ReasonPhrase>() {
            Some(reason) => String::from_utf8_lossy(reason.as_bytes()).into_owned(),
            None => status.canonical_reason().unwrap_or_default().to_string(),
        };

        Ok(RawResponse::new(
            status.as_u16(),
            status_text,
            fold_headers(response.headers()),
            ReqwestBody(response),
        ))
    }
}

struct ReqwestBody(reqwest::Response);

#[async_trait]
impl ResponseBody for ReqwestBody {
    async fn bytes(self: Box<Self>) -> Result<Bytes, TransportError> {
        let ReqwestBody(response) = *self;
        Ok(response.bytes().await?)
    }
}

/// String bodies go out as-is; any other value is written as JSON text.
fn encode_body(body: &Value) -> Vec<u8> {
    match body {
        Value::String(s) => s.clone().into_bytes(),
        other => other.to_string().into_bytes(),
    }
}

fn fold_headers(headers: &HeaderMap) -> Vec<(String, String)> {
    let mut folded: BTreeMap<String, String> = BTreeMap::new();
    for (name, value) in headers {
        let value = String::from_utf8_lossy(value.as_bytes());
        folded
            .entry(name.as_str().to_string())
            .and_modify(|existing| {
                existing.push_str(", ");
                existing.push_str(&value);
            })
            .or_insert_with(|| value.into_owned());
    }
    folded.into_iter().collect()
}
