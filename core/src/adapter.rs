//! The data-access layer's side of the bridge.
//!
//! # Design
//! `FetchAdapter` does not know how requests are built for a given model or
//! how responses become domain values. It asks an `Adapter` for three
//! things: the request options for a call (`ajax_options`), the value a
//! response turns into (`handle_response`), and a best-effort error payload
//! for failed responses (`parse_error_response`).
//!
//! `handle_response` returns one type for both outcomes. Whether a value is
//! an error is decided by `AdapterOutcome::is_adapter_error`, so an adapter
//! can reject a well-formed 2xx body (e.g. a JSON error envelope).

use serde_json::Value;

use crate::headers::{insert_header, Headers};
use crate::http::RequestData;
use crate::options::{is_bodyless_method, RequestOptions};

/// Marker check on values returned by [`Adapter::handle_response`].
pub trait AdapterOutcome {
    fn is_adapter_error(&self) -> bool;
}

/// A JSON value is an adapter error when it carries `"isAdapterError": true`.
impl AdapterOutcome for Value {
    fn is_adapter_error(&self) -> bool {
        self.get("isAdapterError")
            .and_then(Value::as_bool)
            .unwrap_or(false)
    }
}

impl<T, E> AdapterOutcome for Result<T, E> {
    fn is_adapter_error(&self) -> bool {
        self.is_err()
    }
}

/// Hooks supplied by the data-access layer.
pub trait Adapter: Send + Sync {
    type Response: AdapterOutcome + Send;

    /// Headers added to every request built by the default
    /// [`ajax_options`](Adapter::ajax_options). Caller headers win.
    fn headers(&self) -> Option<Headers> {
        None
    }

    /// Build the request options for one call.
    ///
    /// The default sets `url` and `type`, JSON-encodes `data` into a string
    /// for every method but GET and HEAD (so it travels verbatim as the
    /// body), and merges [`headers`](Adapter::headers) under the caller's
    /// headers. Header names are compared case-insensitively.
    fn ajax_options(&self, url: &str, method: &str, options: RequestOptions) -> RequestOptions {
        let mut options = RequestOptions {
            url: url.to_string(),
            method_type: Some(method.to_string()),
            ..options
        };

        if !is_bodyless_method(method) {
            if let Some(data) = options.data.take() {
                options.data = Some(Value::String(data.to_string()));
            }
        }

        if let Some(mut headers) = self.headers() {
            for (name, value) in options.headers.take().into_iter().flatten() {
                insert_header(&mut headers, name, value);
            }
            options.headers = Some(headers);
        }

        options
    }

    /// Turn a response (or an error payload) into the adapter's value.
    fn handle_response(
        &self,
        status: u16,
        headers: &Headers,
        payload: Value,
        request: &RequestData,
    ) -> Self::Response;

    /// Extract an error payload from a failed response's status text.
    ///
    /// The default parses the text as JSON and falls back to the raw text.
    /// An empty status text yields `None`.
    fn parse_error_response(&self, status_text: &str) -> Option<Value> {
        if status_text.is_empty() {
            return None;
        }
        Some(
            serde_json::from_str(status_text)
                .unwrap_or_else(|_| Value::String(status_text.to_string())),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    struct Plain;

    impl Adapter for Plain {
        type Response = Value;

        fn handle_response(&self, _: u16, _: &Headers, payload: Value, _: &RequestData) -> Value {
            payload
        }
    }

    struct WithHeaders;

    impl Adapter for WithHeaders {
        type Response = Value;

        fn headers(&self) -> Option<Headers> {
            Some(Headers::from([
                ("Accept".to_string(), "application/vnd.api+json".to_string()),
                ("X-Client".to_string(), "adapter".to_string()),
            ]))
        }

        fn handle_response(&self, _: u16, _: &Headers, payload: Value, _: &RequestData) -> Value {
            payload
        }
    }

    #[test]
    fn value_marker() {
        assert!(json!({"isAdapterError": true}).is_adapter_error());
        assert!(!json!({"isAdapterError": false}).is_adapter_error());
        assert!(!json!({"isAdapterError": "yes"}).is_adapter_error());
        assert!(!json!({"data": []}).is_adapter_error());
        assert!(!Value::Null.is_adapter_error());
    }

    #[test]
    fn result_marker() {
        let ok: Result<u8, String> = Ok(1);
        let err: Result<u8, String> = Err("invalid".to_string());
        assert!(!ok.is_adapter_error());
        assert!(err.is_adapter_error());
    }

    #[test]
    fn default_options_keep_get_data_structured() {
        let opts = Plain.ajax_options(
            "/items",
            "GET",
            RequestOptions::default().with_data(json!({"q": "x"})),
        );
        assert_eq!(opts.url, "/items");
        assert_eq!(opts.method_type.as_deref(), Some("GET"));
        assert_eq!(opts.data, Some(json!({"q": "x"})));
        assert!(opts.headers.is_none());
    }

    #[test]
    fn default_options_encode_body_data() {
        let opts = Plain.ajax_options(
            "/items",
            "POST",
            RequestOptions::default().with_data(json!({"q": "x"})),
        );
        assert_eq!(opts.data, Some(Value::String(r#"{"q":"x"}"#.to_string())));
    }

    #[test]
    fn default_options_merge_adapter_headers_under_caller() {
        let opts = WithHeaders.ajax_options(
            "/items",
            "GET",
            RequestOptions::default().with_header("X-Client", "caller"),
        );
        let headers = opts.headers.unwrap();
        assert_eq!(headers["Accept"], "application/vnd.api+json");
        assert_eq!(headers["X-Client"], "caller");
    }

    #[test]
    fn default_options_caller_header_wins_in_any_case() {
        let opts = WithHeaders.ajax_options(
            "/items",
            "GET",
            RequestOptions::default()
                .with_header("accept", "text/csv")
                .with_header("x-client", "caller"),
        );
        let headers = opts.headers.unwrap();
        assert_eq!(headers.len(), 2);
        assert_eq!(headers["accept"], "text/csv");
        assert_eq!(headers["x-client"], "caller");
    }

    #[test]
    fn default_options_lowercase_get_keeps_data_structured() {
        let opts = Plain.ajax_options(
            "/items",
            "get",
            RequestOptions::default().with_data(json!({"q": "x"})),
        );
        assert_eq!(opts.data, Some(json!({"q": "x"})));

        let opts = Plain.ajax_options(
            "/items",
            "HEAD",
            RequestOptions::default().with_data(json!({"q": "x"})),
        );
        assert_eq!(opts.data, Some(json!({"q": "x"})));
    }

    #[test]
    fn default_parse_error_response() {
        assert_eq!(Plain.parse_error_response(""), None);
        assert_eq!(Plain.parse_error_response("Not Found"), Some(json!("Not Found")));
        assert_eq!(
            Plain.parse_error_response(r#"{"errors":[{"status":"422"}]}"#),
            Some(json!({"errors": [{"status": "422"}]}))
        );
    }
}
