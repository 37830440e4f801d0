//! Agent card rewriting.
//!
//! The upstream agent card advertises its own endpoint in `url` fields. Those
//! are replaced with the proxy's endpoint so callers keep talking to the
//! proxy. Bodies that are not JSON, or not parseable, pass through untouched.

use axum::body::Bytes;
use serde_json::Value;

const JSON_MEDIA_TYPE: &str = "application/json";

/// Rewrite every string `url` field in a JSON body to `replacement`.
///
/// Returns the original bytes when the content type is not JSON or the body
/// does not parse.
pub fn rewrite_agent_card(body: &Bytes, content_type: Option<&str>, replacement: &str) -> Bytes {
    let is_json = content_type.is_some_and(|ct| ct.contains(JSON_MEDIA_TYPE));
    if !is_json {
        return body.clone();
    }

    let mut card: Value = match serde_json::from_slice(body) {
        Ok(v) => v,
        Err(e) => {
            tracing::debug!(error = %e, "Agent card is not valid JSON, passing through");
            return body.clone();
        }
    };

    let replaced = replace_urls(&mut card, replacement);
    tracing::debug!(replaced, "Rewrote agent card url fields");

    match serde_json::to_vec(&card) {
        Ok(encoded) => Bytes::from(encoded),
        Err(_) => body.clone(),
    }
}

/// Walk `value`, replacing string values under `url` keys. Returns the count.
fn replace_urls(value: &mut Value, replacement: &str) -> usize {
    match value {
        Value::Object(map) => {
            let mut count = 0;
            for (key, child) in map.iter_mut() {
                if key == "url" {
                    if let Value::String(s) = child {
                        *s = replacement.to_string();
                        count += 1;
                        continue;
                    }
                }
                count += replace_urls(child, replacement);
            }
            count
        }
        Value::Array(items) => items.iter_mut().map(|item| replace_urls(item, replacement)).sum(),
        _ => 0,
    }
}
