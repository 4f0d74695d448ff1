//! Hop-by-hop header filtering.
//!
//! Headers listed in RFC 2616 §13.5.1 describe a single transport hop and
//! are never forwarded, neither to the upstream nor back to the client.

use hyper::header::HeaderMap;

/// Hop-by-hop header names, lowercase.
pub const HOP_BY_HOP_HEADERS: [&str; 8] = [
    "connection",
    "keep-alive",
    "proxy-authorization",
    "proxy-connection",
    "te",
    "trailers",
    "transfer-encoding",
    "upgrade",
];

/// Whether `name` is a hop-by-hop header (case-insensitive).
pub fn is_hop_by_hop(name: &str) -> bool {
    HOP_BY_HOP_HEADERS
        .iter()
        .any(|hop| hop.eq_ignore_ascii_case(name))
}

/// Copy every end-to-end header from `src` into `dst`.
///
/// A copied name replaces whatever `dst` held for it; all of the name's
/// values in `src` come along.
pub fn copy_headers(src: &HeaderMap, dst: &mut HeaderMap) {
    for name in src.keys() {
        if is_hop_by_hop(name.as_str()) {
            continue;
        }
        let mut values = src.get_all(name).iter();
        if let Some(first) = values.next() {
            dst.insert(name.clone(), first.clone());
            for value in values {
                dst.append(name.clone(), value.clone());
            }
        }
    }
}
