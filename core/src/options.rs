//! Translation of jQuery-style request options into a fetch-style request.
//!
//! # Design
//! `RequestOptions` is the loose option bag the data-access layer produces
//! (`type`, `headers`, `data`). `mung_options_for_fetch` turns it into a
//! `TransportOptions` descriptor that a fetch-style transport can send
//! without further interpretation:
//!
//! - GET/HEAD requests never carry a body; their `data` becomes a query
//!   string appended to the URL with `?`.
//! - Every other method carries `data` verbatim as the body. Nothing is
//!   JSON-stringified here.
//! - A JSON `Content-Type` is injected when headers are given without one.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::headers::{has_header, Headers};
use crate::query::serialize_query_params;

/// Header name checked (case-insensitively) and injected by
/// [`mung_options_for_fetch`].
pub const CONTENT_TYPE: &str = "Content-Type";

/// Value of the injected `Content-Type` header.
pub const DEFAULT_CONTENT_TYPE: &str = "application/json; charset=utf-8";

/// Cookie/credential policy of a fetch request.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Credentials {
    Omit,
    #[default]
    SameOrigin,
    Include,
}

/// Caller-supplied request options, in the shape of a jQuery `ajax` hash.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RequestOptions {
    #[serde(default)]
    pub url: String,
    /// The jQuery-style method field (`type`). Takes precedence over
    /// `method`.
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub method_type: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub method: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub headers: Option<Headers>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub credentials: Option<Credentials>,
}

impl RequestOptions {
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            ..Self::default()
        }
    }

    pub fn with_type(mut self, method: impl Into<String>) -> Self {
        self.method_type = Some(method.into());
        self
    }

    pub fn with_data(mut self, data: Value) -> Self {
        self.data = Some(data);
        self
    }

    pub fn with_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers
            .get_or_insert_with(Headers::new)
            .insert(name.into(), value.into());
        self
    }

    pub fn with_credentials(mut self, credentials: Credentials) -> Self {
        self.credentials = Some(credentials);
        self
    }
}

/// A request ready for a fetch-style transport.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TransportOptions {
    pub url: String,
    pub method: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub headers: Option<Headers>,
    #[serde(default)]
    pub credentials: Credentials,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub body: Option<Value>,
}

impl TransportOptions {
    /// GET and HEAD requests cannot carry a body.
    pub fn is_bodyless(&self) -> bool {
        is_bodyless_method(&self.method)
    }
}

/// Translate jQuery-style options into a fetch-style request descriptor.
///
/// The method comes from `type`, then `method`, then defaults to `GET`, and
/// is uppercased. Empty `data` (see [`has_entries`]) is dropped.
pub fn mung_options_for_fetch(options: RequestOptions) -> TransportOptions {
    let RequestOptions {
        mut url,
        method_type,
        method,
        headers,
        data,
        credentials,
    } = options;

    let method = method_type
        .or(method)
        .unwrap_or_else(|| "GET".to_string())
        .to_ascii_uppercase();

    let headers = headers.map(|mut headers| {
        if !has_header(&headers, CONTENT_TYPE) {
            headers.insert(CONTENT_TYPE.to_string(), DEFAULT_CONTENT_TYPE.to_string());
        }
        headers
    });

    let mut body = None;
    if let Some(data) = data.filter(has_entries) {
        if is_bodyless_method(&method) {
            url.push('?');
            url.push_str(&serialize_query_params(&data));
        } else {
            body = Some(data);
        }
    }

    TransportOptions {
        url,
        method,
        headers,
        credentials: credentials.unwrap_or_default(),
        body,
    }
}

/// Whether request data has anything to send: objects and arrays with
/// entries, and non-empty strings. Numbers, booleans and `null` have no
/// enumerable keys and count as empty.
pub fn has_entries(data: &Value) -> bool {
    match data {
        Value::Object(map) => !map.is_empty(),
        Value::Array(items) => !items.is_empty(),
        Value::String(s) => !s.is_empty(),
        Value::Null | Value::Bool(_) | Value::Number(_) => false,
    }
}

pub(crate) fn is_bodyless_method(method: &str) -> bool {
    method.eq_ignore_ascii_case("GET") || method.eq_ignore_ascii_case("HEAD")
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn get_data_becomes_query_string() {
        let opts = RequestOptions::new("/items")
            .with_type("GET")
            .with_data(json!({"q": "x"}));
        let out = mung_options_for_fetch(opts);
        assert_eq!(out.url, "/items?q=x");
        assert_eq!(out.method, "GET");
        assert!(out.body.is_none());
    }

    #[test]
    fn head_data_becomes_query_string() {
        let opts = RequestOptions::new("/items")
            .with_type("HEAD")
            .with_data(json!({"page": 2}));
        let out = mung_options_for_fetch(opts);
        assert_eq!(out.url, "/items?page=2");
        assert!(out.body.is_none());
    }

    #[test]
    fn post_data_becomes_body_verbatim() {
        let opts = RequestOptions::new("/items")
            .with_type("POST")
            .with_data(json!({"q": "x"}));
        let out = mung_options_for_fetch(opts);
        assert_eq!(out.url, "/items");
        assert_eq!(out.body, Some(json!({"q": "x"})));
    }

    #[test]
    fn string_body_is_not_reencoded() {
        let opts = RequestOptions::new("/items")
            .with_type("PUT")
            .with_data(json!(r#"{"a":1}"#));
        let out = mung_options_for_fetch(opts);
        assert_eq!(out.body, Some(Value::String(r#"{"a":1}"#.to_string())));
    }

    #[test]
    fn empty_data_is_dropped() {
        for data in [json!({}), json!([]), json!(""), json!(7), json!(true), Value::Null] {
            let get = mung_options_for_fetch(
                RequestOptions::new("/items").with_type("GET").with_data(data.clone()),
            );
            assert_eq!(get.url, "/items");
            let post = mung_options_for_fetch(
                RequestOptions::new("/items").with_type("POST").with_data(data),
            );
            assert!(post.body.is_none());
        }
    }

    #[test]
    fn existing_query_string_is_not_merged() {
        let opts = RequestOptions::new("/items?sort=name")
            .with_type("GET")
            .with_data(json!({"q": "x"}));
        assert_eq!(mung_options_for_fetch(opts).url, "/items?sort=name?q=x");
    }

    #[test]
    fn type_wins_over_method_and_is_uppercased() {
        let mut opts = RequestOptions::new("/items").with_type("patch");
        opts.method = Some("DELETE".to_string());
        assert_eq!(mung_options_for_fetch(opts).method, "PATCH");

        let mut opts = RequestOptions::new("/items");
        opts.method = Some("delete".to_string());
        assert_eq!(mung_options_for_fetch(opts).method, "DELETE");

        assert_eq!(mung_options_for_fetch(RequestOptions::new("/items")).method, "GET");
    }

    #[test]
    fn lowercase_get_still_uses_query_string() {
        let opts = RequestOptions::new("/items")
            .with_type("get")
            .with_data(json!({"q": "x"}));
        let out = mung_options_for_fetch(opts);
        assert_eq!(out.url, "/items?q=x");
        assert!(out.body.is_none());
    }

    #[test]
    fn content_type_injected_when_headers_lack_one() {
        let opts = RequestOptions::new("/items").with_header("Accept", "application/json");
        let headers = mung_options_for_fetch(opts).headers.unwrap();
        assert_eq!(headers[CONTENT_TYPE], DEFAULT_CONTENT_TYPE);
        assert_eq!(headers["Accept"], "application/json");
    }

    #[test]
    fn content_type_kept_in_either_case() {
        let opts = RequestOptions::new("/items").with_header("content-type", "text/plain");
        let headers = mung_options_for_fetch(opts).headers.unwrap();
        assert_eq!(headers.len(), 1);
        assert_eq!(headers["content-type"], "text/plain");

        let opts = RequestOptions::new("/items").with_header("Content-Type", "text/csv");
        let headers = mung_options_for_fetch(opts).headers.unwrap();
        assert_eq!(headers.len(), 1);
        assert_eq!(headers[CONTENT_TYPE], "text/csv");
    }

    #[test]
    fn no_headers_means_no_content_type() {
        let out = mung_options_for_fetch(RequestOptions::new("/items"));
        assert!(out.headers.is_none());
    }

    #[test]
    fn credentials_default_to_same_origin() {
        let out = mung_options_for_fetch(RequestOptions::new("/items"));
        assert_eq!(out.credentials, Credentials::SameOrigin);

        let out = mung_options_for_fetch(
            RequestOptions::new("/items").with_credentials(Credentials::Include),
        );
        assert_eq!(out.credentials, Credentials::Include);
    }

    #[test]
    fn options_deserialize_from_jquery_hash() {
        let opts: RequestOptions = serde_json::from_value(json!({
            "url": "/items",
            "type": "GET",
            "credentials": "include",
            "data": {"q": "x"}
        }))
        .unwrap();
        assert_eq!(opts.method_type.as_deref(), Some("GET"));
        assert_eq!(opts.credentials, Some(Credentials::Include));
        let out = serde_json::to_value(mung_options_for_fetch(opts)).unwrap();
        assert_eq!(
            out,
            json!({"url": "/items?q=x", "method": "GET", "credentials": "include"})
        );
    }
}
