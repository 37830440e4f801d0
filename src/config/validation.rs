//! Configuration validation.
//!
//! # Responsibilities
//! - Semantic validation (serde handles syntactic)
//! - Check that required agent settings are present
//! - Validate URLs and value ranges (timeout > 0, bind address parses)
//!
//! # Design Decisions
//! - Returns all validation errors, not just first
//! - Validation is pure function: ProxyConfig → Result<(), Vec<ValidationError>>
//! - Only listener problems are fatal; the relay re-checks the rest per request

use std::net::SocketAddr;
use thiserror::Error;

use crate::config::schema::ProxyConfig;
use crate::security::allowlist::{validate_upstream_host, HostValidationError};

/// A single semantic problem with the configuration.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ValidationError {
    #[error("missing required setting {0}")]
    MissingSetting(&'static str),

    #[error("KBN_URL rejected: {0}")]
    UpstreamUrl(#[from] HostValidationError),

    #[error("PROXY_BASE_URL is not a valid URL: {0}")]
    ProxyBaseUrl(String),

    #[error("TIMEOUT_SECONDS must be a positive number, got {0}")]
    Timeout(f64),

    #[error("bind address '{0}' is not a valid socket address")]
    BindAddress(String),
}

impl ValidationError {
    /// Whether the proxy cannot start at all with this problem.
    pub fn is_fatal(&self) -> bool {
        matches!(self, ValidationError::BindAddress(_))
    }
}

/// Validate a loaded configuration.
pub fn validate_config(config: &ProxyConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();
    let agent = &config.agent;

    if agent.agent_id.as_deref().map_or(true, str::is_empty) {
        errors.push(ValidationError::MissingSetting("AGENT_ID"));
    }
    match agent.kbn_url.as_deref() {
        Some(url) if !url.is_empty() => {
            if let Err(e) = validate_upstream_host(url, &agent.allowed_hosts) {
                errors.push(e.into());
            }
        }
        _ => errors.push(ValidationError::MissingSetting("KBN_URL")),
    }
    if agent.api_key.as_ref().map_or(true, |k| k.is_empty()) {
        errors.push(ValidationError::MissingSetting("API_KEY"));
    }

    if let Err(e) = url::Url::parse(&config.public.base_url) {
        errors.push(ValidationError::ProxyBaseUrl(e.to_string()));
    }

    let secs = config.timeouts.request_secs;
    if !(secs.is_finite() && secs > 0.0) {
        errors.push(ValidationError::Timeout(secs));
    }

    if config.listener.bind_address.parse::<SocketAddr>().is_err() {
        errors.push(ValidationError::BindAddress(config.listener.bind_address.clone()));
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}
