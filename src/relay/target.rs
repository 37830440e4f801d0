//! Upstream target URL construction.

use thiserror::Error;
use url::Url;

use super::Route;

/// Path segment of the upstream A2A API, relative to the base URL.
pub const UPSTREAM_A2A_SEGMENT: &str = "api/chat/a2a";

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("invalid upstream base URL: {0}")]
pub struct TargetUrlError(String);

/// Resolve `<segment>/<agent_id>[.json]` against `base`.
///
/// The base is given a trailing slash first so an existing sub-path
/// (`https://host/kibana`) is kept rather than replaced by the join.
pub fn build_target_url(base: &str, agent_id: &str, route: Route) -> Result<Url, TargetUrlError> {
    let base = format!("{}/", base.trim_end_matches('/'));
    let base = Url::parse(&base).map_err(|e| TargetUrlError(e.to_string()))?;

    let suffix = match route {
        Route::AgentCard => ".json",
        Route::Action => "",
    };
    let relative = format!("{}/{}{}", UPSTREAM_A2A_SEGMENT, agent_id, suffix);

    base.join(&relative).map_err(|e| TargetUrlError(e.to_string()))
}
