//! Upstream host allowlist.
//!
//! Checks that the configured upstream URL uses http(s), has a host, and, when
//! an allowlist is configured, that the host is on it. An empty allowlist
//! turns the host check off: the proxy then forwards to whatever `KBN_URL`
//! names, which is an open-proxy risk operators opt out of by listing hosts.

use thiserror::Error;
use url::{ParseError, Url};

/// Why an upstream URL was rejected.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum HostValidationError {
    #[error("upstream URL could not be parsed: {0}")]
    Unparseable(String),

    #[error("upstream URL scheme '{0}' is not allowed, use http or https")]
    Scheme(String),

    #[error("upstream URL has no host")]
    MissingHost,

    #[error("upstream host '{0}' is not in the allowed hosts list")]
    NotAllowed(String),
}

/// Validate `url` against the scheme, host-presence and allowlist rules.
///
/// `allowed` holds lowercase hostnames.
pub fn validate_upstream_host(url: &str, allowed: &[String]) -> Result<(), HostValidationError> {
    let parsed = Url::parse(url).map_err(|e| match e {
        ParseError::EmptyHost => HostValidationError::MissingHost,
        other => HostValidationError::Unparseable(other.to_string()),
    })?;

    match parsed.scheme() {
        "http" | "https" => {}
        other => return Err(HostValidationError::Scheme(other.to_string())),
    }

    let host = match parsed.host_str() {
        Some(h) if !h.is_empty() => h.to_lowercase(),
        _ => return Err(HostValidationError::MissingHost),
    };

    if !allowed.is_empty() && !allowed.iter().any(|a| *a == host) {
        return Err(HostValidationError::NotAllowed(host));
    }

    Ok(())
}
