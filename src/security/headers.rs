//! Header filtering for forwarded requests.
//!
//! # Responsibilities
//! - Strip hop-by-hop headers
//! - Drop the caller's `Host` and `Authorization`
//! - Restrict which upstream headers reach the caller
//!
//! # Design Decisions
//! - The caller never supplies credentials; the relay injects its own
//! - Retained headers keep their original values, repeated headers included

use axum::http::header::{self, HeaderMap, HeaderName};

/// Headers that are meaningful only for a single connection.
pub const HOP_BY_HOP_HEADERS: &[&str] = &[
    "connection",
    "keep-alive",
    "proxy-authenticate",
    "proxy-authorization",
    "te",
    "trailers",
    "transfer-encoding",
    "upgrade",
];

/// Upstream response headers passed back to the caller.
pub const EXPOSED_RESPONSE_HEADERS: [HeaderName; 3] =
    [header::CONTENT_TYPE, header::CACHE_CONTROL, header::ETAG];

/// Whether a header must not be forwarded upstream.
pub fn is_filtered(name: &str) -> bool {
    name.eq_ignore_ascii_case("host")
        || name.eq_ignore_ascii_case("authorization")
        || HOP_BY_HOP_HEADERS.iter().any(|h| name.eq_ignore_ascii_case(h))
}

/// Copy `headers`, leaving out hop-by-hop, `Host` and `Authorization`.
pub fn filter_headers(headers: &HeaderMap) -> HeaderMap {
    let mut forwarded = HeaderMap::with_capacity(headers.len());
    for (name, value) in headers {
        if is_filtered(name.as_str()) {
            continue;
        }
        forwarded.append(name.clone(), value.clone());
    }
    forwarded
}

/// Keep only the upstream response headers callers are allowed to see.
pub fn exposed_response_headers(upstream: &HeaderMap) -> HeaderMap {
    let mut exposed = HeaderMap::new();
    for name in EXPOSED_RESPONSE_HEADERS {
        if let Some(value) = upstream.get(&name) {
            exposed.insert(name, value.clone());
        }
    }
    exposed
}
