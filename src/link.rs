//! Query-string state: read the selected city, build shareable deep links.

use percent_encoding::{AsciiSet, NON_ALPHANUMERIC, percent_decode_str, utf8_percent_encode};

/// Fragment that opens the meteogram tab.
pub const ANCHOR: &str = "meteograma";

const SAFE: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'_')
    .remove(b'.')
    .remove(b'~');

/// Value of `key` in a query string (`?a=1&b=2`, leading `?` and trailing `#frag` allowed).
pub fn query_param(query: &str, key: &str) -> Option<String> {
    let query = query.split('#').next().unwrap_or("");
    let query = query.strip_prefix('?').unwrap_or(query);
    query.split('&').find_map(|pair| {
        let (k, v) = pair.split_once('=').unwrap_or((pair, ""));
        if decode(k) == key {
            Some(decode(v))
        } else {
            None
        }
    })
}

fn decode(s: &str) -> String {
    let s = s.replace('+', " ");
    percent_decode_str(&s).decode_utf8_lossy().into_owned()
}

/// Selected city slug from a query string, ignoring empty values.
pub fn city_from_query(query: &str) -> Option<String> {
    query_param(query, "city").filter(|s| !s.trim().is_empty())
}

/// `?model=<model>&city=<slug>#meteograma`
pub fn deep_link(model: &str, slug: &str) -> String {
    format!(
        "?model={}&city={}#{}",
        utf8_percent_encode(model, SAFE),
        utf8_percent_encode(slug, SAFE),
        ANCHOR
    )
}
