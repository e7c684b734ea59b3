//! Fetch-style transport for an XHR-style data-access layer.
//!
//! # Overview
//! A data-access layer that expects `ajax(url, method, options)` to resolve
//! to a parsed body (jQuery style) is bridged onto an async fetch-style HTTP
//! client. The crate translates in both directions:
//!
//! - request options → fetch request: method from `type`, default
//!   credentials and `Content-Type`, GET/HEAD data as a jQuery-compatible
//!   query string, other methods' data verbatim as the body;
//! - fetch response → adapter hooks: header collection flattened into a map,
//!   body parsed as JSON, and failures split into transport errors (returned
//!   as-is) and HTTP errors (routed through `Adapter::handle_response`).
//!
//! # Design
//! - `Adapter` is the explicit capability interface of the data-access
//!   layer; `FetchAdapter` takes one at construction.
//! - `HttpTransport` is the I/O seam; `ReqwestTransport` is the shipped
//!   implementation and tests plug in their own.
//! - Everything lives for one call. `FetchAdapter` keeps no per-request
//!   state, so concurrent calls never interact.

pub mod adapter;
pub mod client;
pub mod error;
pub mod headers;
pub mod http;
pub mod options;
pub mod query;
pub mod transport;

pub use adapter::{Adapter, AdapterOutcome};
pub use client::{AjaxResult, Failure, FetchAdapter};
pub use error::{AjaxError, TransportError};
pub use headers::{headers_to_object, Headers};
pub use http::{RawResponse, RequestData, ResponseBody};
pub use options::{mung_options_for_fetch, Credentials, RequestOptions, TransportOptions};
pub use query::serialize_query_params;
pub use transport::{HttpTransport, ReqwestTransport};
