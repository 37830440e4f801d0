//! Liveness endpoint.
//!
//! `/healthz` reports that the process is serving. It does not look at the
//! agent configuration, so a misconfigured proxy still answers `ok`.

/// `GET /healthz`
pub async fn healthz() -> &'static str {
    "ok"
}
