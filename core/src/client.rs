//! The `ajax` entry point.
//!
//! # Design
//! `FetchAdapter` composes an `Adapter` (request building and response
//! interpretation) with an `HttpTransport` (I/O). One `ajax` call goes
//! through these steps and ends in exactly one of two outcomes:
//!
//! 1. record `{ url, method }` as the `RequestData` for the hooks;
//! 2. ask the adapter for request options and translate them for fetch;
//! 3. send through the transport;
//! 4. transport failure → `ajax_error` with the transport error, which is
//!    returned unchanged;
//! 5. 2xx response → `ajax_success` (may still reject if the adapter flags
//!    the body); any other status → `ajax_error` with the response.
//!
//! The status is checked before headers are normalized, and the body is
//! read before `handle_response` runs. The adapter holds no per-call state,
//! so concurrent `ajax` calls are independent.

use serde_json::Value;
use tracing::{trace, warn};

use crate::adapter::{Adapter, AdapterOutcome};
use crate::error::{AjaxError, TransportError};
use crate::headers::headers_to_object;
use crate::http::{RawResponse, RequestData};
use crate::options::{mung_options_for_fetch, RequestOptions};
use crate::transport::HttpTransport;

/// Result of [`FetchAdapter::ajax`].
pub type AjaxResult<R> = Result<R, AjaxError<R>>;

/// Why a request failed, as handed to [`FetchAdapter::ajax_error`].
#[derive(Debug)]
pub enum Failure<'a> {
    /// The transport failed before a response existed.
    Transport(TransportError),
    /// A response arrived with a non-2xx status.
    Status(&'a RawResponse),
}

/// Bridges an [`Adapter`] onto a fetch-style [`HttpTransport`].
#[derive(Debug, Clone)]
pub struct FetchAdapter<A, T> {
    adapter: A,
    transport: T,
}

impl<A, T> FetchAdapter<A, T>
where
    A: Adapter,
    T: HttpTransport,
{
    pub fn new(adapter: A, transport: T) -> Self {
        Self { adapter, transport }
    }

    pub fn adapter(&self) -> &A {
        &self.adapter
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    /// Issue a request and resolve it into the adapter's value.
    pub async fn ajax(
        &self,
        url: &str,
        method: &str,
        options: RequestOptions,
    ) -> AjaxResult<A::Response> {
        let request_data = RequestData {
            url: url.to_string(),
            method: method.to_string(),
        };

        let options = self.adapter.ajax_options(url, method, options);

        let response = match self.ajax_request(options).await {
            Ok(response) => response,
            Err(err) => return Err(self.ajax_error(Failure::Transport(err), &request_data)),
        };

        if response.ok() {
            self.ajax_success(response, &request_data).await
        } else {
            Err(self.ajax_error(Failure::Status(&response), &request_data))
        }
    }

    /// Translate options for fetch and send them.
    pub async fn ajax_request(&self, options: RequestOptions) -> Result<RawResponse, TransportError> {
        let options = mung_options_for_fetch(options);
        trace!(?options, "translated request options");
        self.transport.send(&options).await
    }

    /// Handle a 2xx response.
    ///
    /// Resolves with the adapter's value unless the adapter marks it as an
    /// error. A body that is not JSON rejects with
    /// [`AjaxError::InvalidBody`] before the adapter is consulted.
    pub async fn ajax_success(
        &self,
        response: RawResponse,
        request_data: &RequestData,
    ) -> AjaxResult<A::Response> {
        let status = response.status();
        let headers = headers_to_object(response.headers().iter().cloned());

        let body = response.json().await.map_err(|err| {
            warn!(url = %request_data.url, status, error = %err, "response body is not JSON");
            AjaxError::InvalidBody(err)
        })?;

        let handled = self
            .adapter
            .handle_response(status, &headers, body, request_data);

        if handled.is_adapter_error() {
            warn!(url = %request_data.url, status, "adapter rejected successful response");
            Err(AjaxError::Rejected(handled))
        } else {
            Ok(handled)
        }
    }

    /// Build the rejection value for a failed request.
    ///
    /// Transport errors come back as-is. For an HTTP error the adapter
    /// receives the parsed status text as payload, or `null` when the
    /// adapter extracts nothing from it. A panic inside a hook is not caught.
    pub fn ajax_error(
        &self,
        failure: Failure<'_>,
        request_data: &RequestData,
    ) -> AjaxError<A::Response> {
        match failure {
            Failure::Transport(err) => {
                warn!(url = %request_data.url, method = %request_data.method, error = %err, "transport error");
                AjaxError::Transport(err)
            }
            Failure::Status(response) => {
                let status = response.status();
                warn!(url = %request_data.url, method = %request_data.method, status, "request failed");

                let headers = headers_to_object(response.headers().iter().cloned());
                let payload = self
                    .adapter
                    .parse_error_response(response.status_text())
                    .unwrap_or(Value::Null);

                AjaxError::Rejected(
                    self.adapter
                        .handle_response(status, &headers, payload, request_data),
                )
            }
        }
    }
}
