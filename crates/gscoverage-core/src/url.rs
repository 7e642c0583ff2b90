//! REST endpoint URL construction.
//!
//! Path segments are percent-encoded one at a time, so a store named
//! `a b` and a workspace named `x?y` cannot break the path structure.

use percent_encoding::{AsciiSet, NON_ALPHANUMERIC, utf8_percent_encode};

/// Characters percent-encoded inside a path segment.
///
/// Unreserved characters (A-Z, a-z, 0-9, `-`, `_`, `.`, `~`) are kept, as is
/// `/` so that a segment may itself carry a sub-path.
const SEGMENT_ENCODE_SET: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'_')
    .remove(b'.')
    .remove(b'~')
    .remove(b'/');

/// Join a base URL, path segments and query parameters.
///
/// Each segment is stripped of leading and trailing slashes and encoded on its
/// own. The base is normalized to end in exactly one `/`. The query string is
/// appended only when `query` is non-empty, in the given order.
///
/// # Examples
///
/// ```
/// use gscoverage_core::url::build_url;
///
/// let url = build_url(
///     "http://localhost:8080/geoserver/rest/",
///     &["workspaces", "ceshi", "coveragestores"],
///     &[("name", "nmefc_2016072112_opdr_02")],
/// );
/// assert_eq!(
///     url,
///     "http://localhost:8080/geoserver/rest/workspaces/ceshi/coveragestores?name=nmefc_2016072112_opdr_02"
/// );
/// ```
#[must_use]
pub fn build_url<S: AsRef<str>>(base: &str, segments: &[S], query: &[(&str, &str)]) -> String {
    let mut url = String::with_capacity(base.len() + 64);
    url.push_str(base.trim_end_matches('/'));
    url.push('/');

    let path = segments
        .iter()
        .map(|s| utf8_percent_encode(s.as_ref().trim_matches('/'), SEGMENT_ENCODE_SET).to_string())
        .collect::<Vec<_>>()
        .join("/");
    url.push_str(&path);

    append_query(&url, query)
}

/// Append query parameters to a URL that may already carry some.
#[must_use]
pub fn append_query(url: &str, query: &[(&str, &str)]) -> String {
    if query.is_empty() {
        return url.to_owned();
    }
    let encoded = form_urlencoded::Serializer::new(String::new())
        .extend_pairs(query)
        .finish();
    let separator = if url.contains('?') { '&' } else { '?' };
    format!("{url}{separator}{encoded}")
}
