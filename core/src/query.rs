//! Query string serialization with jQuery `param` bracket notation.
//!
//! # Design
//! `serialize_query_params` walks a `serde_json::Value` carrying the key path
//! built so far as a `prefix`. Nested objects become `a[b]=1`, arrays of
//! scalars become `a[]=1&a[]=2`, and arrays of objects are indexed
//! (`a[0][b]=1`). Keys and values are percent-encoded individually with the
//! `encodeURIComponent` unreserved set, and `%20` is rewritten to `+` in the
//! final string (traditional form encoding).
//!
//! Object keys are visited in insertion order (`serde_json` is built with
//! `preserve_order`).

use serde_json::{Number, Value};

/// Characters `encodeURIComponent` leaves alone on top of the RFC 3986
/// unreserved set that `urlencoding` already keeps.
const EXTRA_UNRESERVED: [char; 5] = ['!', '*', '\'', '(', ')'];

/// Serialize `value` into a URL query string (without the leading `?`).
///
/// A top-level array is read as a list of `{ "name": .., "value": .. }`
/// records. A top-level object is expanded key by key and a top-level string
/// character by character (`0=a&1=b`). Numbers, booleans, `null` and empty
/// containers produce `""`.
pub fn serialize_query_params(value: &Value) -> String {
    let mut pairs = Vec::new();
    build_params("", value, &mut pairs);
    pairs.join("&").replace("%20", "+")
}

fn build_params(prefix: &str, value: &Value, pairs: &mut Vec<String>) {
    if prefix.is_empty() {
        match value {
            Value::Array(records) => {
                for record in records {
                    let name = record
                        .get("name")
                        .map(js_string)
                        .unwrap_or_else(|| "undefined".to_string());
                    add(pairs, &name, record.get("value").unwrap_or(&Value::Null));
                }
            }
            Value::Object(map) => {
                for (key, nested) in map {
                    build_params(key, nested, pairs);
                }
            }
            Value::String(s) => {
                for (index, ch) in s.chars().enumerate() {
                    add(pairs, &index.to_string(), &Value::String(ch.to_string()));
                }
            }
            _ => {}
        }
        return;
    }

    match value {
        Value::Array(items) => {
            for (index, item) in items.iter().enumerate() {
                if prefix.ends_with("[]") {
                    add(pairs, prefix, item);
                } else if is_indexed(item) {
                    build_params(&format!("{prefix}[{index}]"), item, pairs);
                } else {
                    build_params(&format!("{prefix}[]"), item, pairs);
                }
            }
        }
        Value::Object(map) => {
            for (key, nested) in map {
                build_params(&format!("{prefix}[{key}]"), nested, pairs);
            }
        }
        scalar => add(pairs, prefix, scalar),
    }
}

fn add(pairs: &mut Vec<String>, key: &str, value: &Value) {
    let value = match value {
        Value::Null => String::new(),
        other => js_string(other),
    };
    pairs.push(format!(
        "{}={}",
        encode_uri_component(key),
        encode_uri_component(&value)
    ));
}

/// Array elements that get an explicit index in their key. `null` counts as
/// an object here.
fn is_indexed(value: &Value) -> bool {
    matches!(value, Value::Object(_) | Value::Array(_) | Value::Null)
}

/// Render a value the way string coercion in a browser would.
fn js_string(value: &Value) -> String {
    match value {
        Value::Null => "null".to_string(),
        Value::Bool(b) => b.to_string(),
        Value::Number(n) => number_string(n),
        Value::String(s) => s.clone(),
        Value::Array(items) => items
            .iter()
            .map(|item| match item {
                Value::Null => String::new(),
                other => js_string(other),
            })
            .collect::<Vec<_>>()
            .join(","),
        Value::Object(_) => "[object Object]".to_string(),
    }
}

/// Shortest round-trip digits, switching to exponent form (`1e+21`,
/// `1.5e-7`) outside the decimal exponent range `-6..21`.
fn number_string(n: &Number) -> String {
    if let Some(i) = n.as_i64() {
        return i.to_string();
    }
    if let Some(u) = n.as_u64() {
        return u.to_string();
    }
    let Some(f) = n.as_f64() else {
        return n.to_string();
    };
    if f == 0.0 {
        return "0".to_string();
    }

    let scientific = format!("{f:e}");
    match scientific.split_once('e') {
        Some((_, exp)) if exp.parse::<i32>().is_ok_and(|e| (-6..21).contains(&e)) => f.to_string(),
        Some((mantissa, exp)) if !exp.starts_with('-') => format!("{mantissa}e+{exp}"),
        _ => scientific,
    }
}

fn encode_uri_component(input: &str) -> String {
    let mut encoded = String::with_capacity(input.len());
    let mut buf = [0u8; 4];
    for ch in input.chars() {
        if EXTRA_UNRESERVED.contains(&ch) {
            encoded.push(ch);
        } else {
            encoded.push_str(&urlencoding::encode(ch.encode_utf8(&mut buf)));
        }
    }
    encoded
}
