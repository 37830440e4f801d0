//! Configuration loading from disk and the process environment.
//!
//! An optional TOML file seeds the config, then environment variables
//! (including those from a local `.env`) override individual settings.

use std::fs;
use std::path::Path;

use crate::config::schema::{ApiKey, ProxyConfig, DEFAULT_PROXY_PATH};
use crate::config::validation::ValidationError;

/// Timeout used when `TIMEOUT_SECONDS` is set but not a number.
const UNPARSEABLE_TIMEOUT_SECS: f64 = 120.0;

/// Error type for configuration loading.
#[derive(Debug)]
pub enum ConfigError {
    Io(std::io::Error),
    Parse(toml::de::Error),
    Validation(Vec<ValidationError>),
}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConfigError::Io(e) => write!(f, "IO error: {}", e),
            ConfigError::Parse(e) => write!(f, "Parse error: {}", e),
            ConfigError::Validation(errors) => {
                write!(f, "Validation failed: ")?;
                for (i, err) in errors.iter().enumerate() {
                    if i > 0 { write!(f, ", ")?; }
                    write!(f, "{}", err)?;
                }
                Ok(())
            }
        }
    }
}

impl std::error::Error for ConfigError {}

/// Parse a TOML configuration file.
pub fn load_file(path: &Path) -> Result<ProxyConfig, ConfigError> {
    let content = fs::read_to_string(path).map_err(ConfigError::Io)?;
    let mut config: ProxyConfig = toml::from_str(&content).map_err(ConfigError::Parse)?;
    config.public.path = normalize_proxy_path(&config.public.path);
    config.agent.allowed_hosts = config
        .agent
        .allowed_hosts
        .iter()
        .flat_map(|h| parse_allowed_hosts(h))
        .collect();
    Ok(config)
}

/// Build the configuration: file first (if given), then the environment.
///
/// Semantic validation is left to the caller so a partially configured
/// proxy can still start.
pub fn load(path: Option<&Path>) -> Result<ProxyConfig, ConfigError> {
    let mut config = match path {
        Some(p) => load_file(p)?,
        None => ProxyConfig::default(),
    };
    apply_env(&mut config, |key| std::env::var(key).ok());
    Ok(config)
}

/// Overlay settings from an environment lookup function.
pub fn apply_env<F>(config: &mut ProxyConfig, lookup: F)
where
    F: Fn(&str) -> Option<String>,
{
    // Empty strings count as unset for the required values.
    let non_empty = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

    if let Some(v) = non_empty("AGENT_ID") {
        config.agent.agent_id = Some(v);
    }
    if let Some(v) = non_empty("KBN_URL") {
        config.agent.kbn_url = Some(v);
    }
    if let Some(v) = non_empty("API_KEY") {
        config.agent.api_key = Some(ApiKey::new(v));
    }
    if let Some(v) = lookup("ALLOWED_KBN_HOSTS") {
        config.agent.allowed_hosts = parse_allowed_hosts(&v);
    }

    if let Some(v) = lookup("TIMEOUT_SECONDS") {
        config.timeouts.request_secs = match v.trim().parse::<f64>() {
            Ok(secs) => secs,
            Err(_) => {
                tracing::warn!(value = %v, fallback = UNPARSEABLE_TIMEOUT_SECS, "TIMEOUT_SECONDS is not a number");
                UNPARSEABLE_TIMEOUT_SECS
            }
        };
    }

    if let Some(v) = lookup("PROXY_BASE_URL") {
        config.public.base_url = v;
    }
    if let Some(v) = lookup("AGENT_PROXY_PATH") {
        config.public.path = v;
    }
    config.public.path = normalize_proxy_path(&config.public.path);

    if let Some(v) = non_empty("BIND_ADDRESS") {
        config.listener.bind_address = v;
    }
    if let Some(v) = non_empty("LOG_LEVEL") {
        config.observability.log_level = v;
    }
    if let Some(v) = non_empty("METRICS_ADDRESS") {
        config.observability.metrics_enabled = true;
        config.observability.metrics_address = v;
    }
    if let Some(v) = non_empty("MAX_BODY_BYTES") {
        match v.trim().parse() {
            Ok(limit) => config.security.max_body_size = limit,
            Err(_) => tracing::warn!(value = %v, "MAX_BODY_BYTES is not a byte count, keeping default"),
        }
    }
}

/// Normalize the proxy path to `/segment[/segment...]` with no trailing slash.
pub fn normalize_proxy_path(raw: &str) -> String {
    let raw = raw.trim();
    let prefixed = if raw.starts_with('/') {
        raw.to_string()
    } else {
        format!("/{}", raw)
    };
    let trimmed = prefixed.trim_end_matches('/');
    if trimmed.is_empty() {
        DEFAULT_PROXY_PATH.to_string()
    } else {
        trimmed.to_string()
    }
}

/// Split a comma-separated host list into lowercase hostnames.
pub fn parse_allowed_hosts(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(|h| h.trim().to_lowercase())
        .filter(|h| !h.is_empty())
        .collect()
}
