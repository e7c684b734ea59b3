//! Header collection normalization.

use std::collections::BTreeMap;

/// Plain name/value header mapping handed to adapter hooks and carried on
/// outgoing requests.
pub type Headers = BTreeMap<String, String>;

/// Collect an iterable of header pairs into a [`Headers`] mapping.
///
/// Names are kept exactly as the collection yields them. A later pair with
/// the same name replaces an earlier one.
pub fn headers_to_object<I, K, V>(headers: I) -> Headers
where
    I: IntoIterator<Item = (K, V)>,
    K: Into<String>,
    V: Into<String>,
{
    headers
        .into_iter()
        .map(|(name, value)| (name.into(), value.into()))
        .collect()
}

/// Case-insensitive header lookup.
pub(crate) fn has_header(headers: &Headers, name: &str) -> bool {
    headers.keys().any(|key| key.eq_ignore_ascii_case(name))
}

/// Insert a header, replacing any existing entry whose name matches
/// case-insensitively.
pub(crate) fn insert_header(headers: &mut Headers, name: impl Into<String>, value: impl Into<String>) {
    let name = name.into();
    headers.retain(|key, _| !key.eq_ignore_ascii_case(&name));
    headers.insert(name, value.into());
}
