//! Configuration schema definitions.
//!
//! This module defines the complete configuration structure for the proxy.
//! All types derive Serde traits so a TOML file can seed them before the
//! environment overlay is applied.

use serde::{Deserialize, Serialize, Serializer};
use std::fmt;
use std::time::Duration;

/// Default path the agent routes are mounted under.
pub const DEFAULT_PROXY_PATH: &str = "/elastic/agent";

/// Root configuration for the proxy.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
#[serde(default)]
pub struct ProxyConfig {
    /// Listener configuration (bind address).
    pub listener: ListenerConfig,

    /// Upstream agent settings (identifier, base URL, credential).
    pub agent: AgentConfig,

    /// How the proxy is reachable from the outside.
    pub public: PublicConfig,

    /// Timeout configuration.
    pub timeouts: TimeoutConfig,

    /// Observability settings.
    pub observability: ObservabilityConfig,

    /// Inbound request limits.
    pub security: SecurityConfig,
}

/// Listener configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ListenerConfig {
    /// Bind address (e.g., "0.0.0.0:8080").
    pub bind_address: String,
}

impl Default for ListenerConfig {
    fn default() -> Self {
        Self {
            bind_address: "0.0.0.0:8080".to_string(),
        }
    }
}

/// Upstream agent configuration.
///
/// The three required values stay optional here: a proxy with missing
/// settings still starts and answers `/healthz`, the relay reports the gap
/// per request.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
#[serde(default)]
pub struct AgentConfig {
    /// Agent identifier appended to the upstream path.
    pub agent_id: Option<String>,

    /// Upstream (Kibana) base URL.
    pub kbn_url: Option<String>,

    /// Credential sent upstream as `Authorization: ApiKey <key>`.
    pub api_key: Option<ApiKey>,

    /// Lowercase hostnames the upstream URL may point at. Empty allows any.
    pub allowed_hosts: Vec<String>,
}

/// Externally visible address of the proxy, used when rewriting agent cards.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct PublicConfig {
    /// Base URL callers use to reach the proxy.
    pub base_url: String,

    /// Path the agent routes are mounted under.
    pub path: String,
}

impl Default for PublicConfig {
    fn default() -> Self {
        Self {
            base_url: "http://127.0.0.1:8080".to_string(),
            path: DEFAULT_PROXY_PATH.to_string(),
        }
    }
}

impl PublicConfig {
    /// URL of the agent endpoint as seen by callers.
    pub fn agent_url(&self) -> String {
        format!("{}{}", self.base_url.trim_end_matches('/'), self.path)
    }
}

/// Timeout configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct TimeoutConfig {
    /// Upstream request timeout in seconds.
    pub request_secs: f64,
}

impl Default for TimeoutConfig {
    fn default() -> Self {
        Self { request_secs: 30.0 }
    }
}

impl TimeoutConfig {
    /// Request timeout as a `Duration`, falling back to the default when the
    /// configured value is not a positive finite number.
    pub fn request(&self) -> Duration {
        if self.request_secs > 0.0 {
            Duration::try_from_secs_f64(self.request_secs)
                .unwrap_or_else(|_| Duration::from_secs(30))
        } else {
            Duration::from_secs(30)
        }
    }
}

/// Observability configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ObservabilityConfig {
    /// Log level (trace, debug, info, warn, error).
    pub log_level: String,

    /// Enable metrics endpoint.
    pub metrics_enabled: bool,

    /// Metrics endpoint bind address.
    pub metrics_address: String,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            metrics_enabled: false,
            metrics_address: "0.0.0.0:9090".to_string(),
        }
    }
}

/// Inbound request limits.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct SecurityConfig {
    /// Maximum body size in bytes.
    pub max_body_size: usize,
}

impl Default for SecurityConfig {
    fn default() -> Self {
        Self {
            max_body_size: 2 * 1024 * 1024, // 2MB
        }
    }
}

/// Upstream credential. Never printed, never serialized.
#[derive(Clone, PartialEq, Eq, Deserialize)]
#[serde(transparent)]
pub struct ApiKey(String);

impl ApiKey {
    pub fn new(key: impl Into<String>) -> Self {
        Self(key.into())
    }

    /// The raw key, for building the upstream `Authorization` header only.
    pub fn expose(&self) -> &str {
        &self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl fmt::Debug for ApiKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("ApiKey(<redacted>)")
    }
}

impl Serialize for ApiKey {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str("<redacted>")
    }
}
