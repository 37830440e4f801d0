//! Request relay to the upstream agent API.
//!
//! # Data Flow
//! ```text
//! inbound request (method, headers, body, route)
//!     → settings check (agent id, upstream URL, credential)
//!     → security::allowlist (upstream scheme / host)
//!     → target.rs (upstream URL)
//!     → security::headers (filter) + Authorization: ApiKey <key>
//!     → transport.rs (one call, bounded by the request timeout)
//!     → rewrite.rs (agent card route only)
//!     → RelayResponse (status, exposed headers, body)
//! ```
//!
//! # Design Decisions
//! - No state survives a request; the relay only reads its settings
//! - Every failure becomes a `RelayError` with a fixed HTTP status
//! - Nothing is retried

pub mod rewrite;
pub mod target;
pub mod transport;

use std::sync::Arc;
use std::time::Duration;

use axum::body::Bytes;
use axum::http::{header, HeaderMap, HeaderValue, Method, StatusCode};
use thiserror::Error;

use crate::config::{AgentConfig, ProxyConfig};
use crate::resilience::timeouts::with_deadline;
use crate::security::allowlist::{validate_upstream_host, HostValidationError};
use crate::security::headers::{exposed_response_headers, filter_headers};

pub use rewrite::rewrite_agent_card;
pub use target::{build_target_url, UPSTREAM_A2A_SEGMENT};
pub use transport::{OutboundRequest, ReqwestTransport, Transport, TransportError, UpstreamResponse};

/// Which of the two proxied endpoints a request came in on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Route {
    /// `GET <path>.json`: agent card metadata, rewritten on the way back.
    AgentCard,
    /// `POST <path>`: agent action, relayed verbatim.
    Action,
}

impl Route {
    pub fn as_str(&self) -> &'static str {
        match self {
            Route::AgentCard => "agent_card",
            Route::Action => "action",
        }
    }
}

/// Errors a relay attempt can end in. None of them carry the credential.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RelayError {
    #[error("Server misconfigured: missing {0}")]
    MissingSetting(&'static str),

    #[error("Server misconfigured: {0}")]
    InvalidConfig(String),

    #[error("{0}")]
    HostRejected(HostValidationError),

    #[error("Upstream timeout")]
    UpstreamTimeout,

    #[error("Upstream request failed: {0}")]
    UpstreamUnreachable(String),
}

impl RelayError {
    /// HTTP status returned to the caller for this error.
    pub fn status(&self) -> StatusCode {
        match self {
            RelayError::MissingSetting(_) | RelayError::InvalidConfig(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
            RelayError::HostRejected(_) => StatusCode::BAD_REQUEST,
            RelayError::UpstreamTimeout => StatusCode::GATEWAY_TIMEOUT,
            RelayError::UpstreamUnreachable(_) => StatusCode::BAD_GATEWAY,
        }
    }
}

impl From<HostValidationError> for RelayError {
    fn from(e: HostValidationError) -> Self {
        match e {
            // A URL that does not even parse is a deployment problem, not bad input.
            HostValidationError::Unparseable(msg) => {
                RelayError::InvalidConfig(format!("invalid KBN_URL: {}", msg))
            }
            other => RelayError::HostRejected(other),
        }
    }
}

impl From<TransportError> for RelayError {
    fn from(e: TransportError) -> Self {
        match e {
            TransportError::Timeout => RelayError::UpstreamTimeout,
            TransportError::Request(msg) => RelayError::UpstreamUnreachable(msg),
        }
    }
}

/// Response relayed back to the caller.
#[derive(Debug, Clone)]
pub struct RelayResponse {
    pub status: StatusCode,
    /// Only content-type, cache-control and etag.
    pub headers: HeaderMap,
    pub body: Bytes,
}

/// Forwards inbound requests to the configured upstream agent.
#[derive(Clone)]
pub struct Relay {
    agent: AgentConfig,
    /// Replacement for `url` fields in agent cards.
    public_agent_url: String,
    timeout: Duration,
    transport: Arc<dyn Transport>,
}

impl Relay {
    pub fn new(config: &ProxyConfig, transport: Arc<dyn Transport>) -> Self {
        Self {
            agent: config.agent.clone(),
            public_agent_url: config.public.agent_url(),
            timeout: config.timeouts.request(),
            transport,
        }
    }

    /// Relay one request to the upstream and shape the answer for the caller.
    pub async fn forward(
        &self,
        route: Route,
        method: Method,
        headers: &HeaderMap,
        body: Bytes,
    ) -> Result<RelayResponse, RelayError> {
        let agent_id = required(self.agent.agent_id.as_deref(), "AGENT_ID")?;
        let kbn_url = required(self.agent.kbn_url.as_deref(), "KBN_URL")?;
        let api_key = self
            .agent
            .api_key
            .as_ref()
            .filter(|k| !k.is_empty())
            .ok_or(RelayError::MissingSetting("API_KEY"))?;

        validate_upstream_host(kbn_url, &self.agent.allowed_hosts).map_err(|e| {
            tracing::warn!(error = %e, "Upstream host rejected");
            RelayError::from(e)
        })?;

        let url = build_target_url(kbn_url, agent_id, route)
            .map_err(|e| RelayError::InvalidConfig(e.to_string()))?;

        let mut outbound_headers = filter_headers(headers);
        let mut authorization = HeaderValue::from_str(&format!("ApiKey {}", api_key.expose()))
            .map_err(|_| RelayError::InvalidConfig("API_KEY is not a valid header value".into()))?;
        authorization.set_sensitive(true);
        outbound_headers.insert(header::AUTHORIZATION, authorization);

        tracing::debug!(route = route.as_str(), method = %method, target = %url, "Forwarding to upstream");

        let request = OutboundRequest {
            method,
            url,
            headers: outbound_headers,
            body: if body.is_empty() { None } else { Some(body) },
        };

        let upstream = with_deadline(self.timeout, self.transport.send(request))
            .await
            .map_err(|e| {
                match &e {
                    TransportError::Timeout => {
                        tracing::warn!(route = route.as_str(), timeout = ?self.timeout, "Upstream timeout")
                    }
                    TransportError::Request(msg) => {
                        tracing::error!(route = route.as_str(), error = %msg, "Upstream request failed")
                    }
                }
                RelayError::from(e)
            })?;

        let body = match route {
            Route::AgentCard => {
                rewrite_agent_card(&upstream.body, upstream.content_type(), &self.public_agent_url)
            }
            Route::Action => upstream.body.clone(),
        };

        Ok(RelayResponse {
            status: upstream.status,
            headers: exposed_response_headers(&upstream.headers),
            body,
        })
    }
}

fn required<'a>(value: Option<&'a str>, name: &'static str) -> Result<&'a str, RelayError> {
    value
        .filter(|v| !v.is_empty())
        .ok_or(RelayError::MissingSetting(name))
}
