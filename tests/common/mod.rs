//! Shared utilities for integration tests.

use std::net::SocketAddr;

use a2a_proxy::config::{ApiKey, ProxyConfig};

/// Configuration pointing the proxy at `upstream` with all required settings.
#[allow(dead_code)]
pub fn proxy_config(upstream: &str) -> ProxyConfig {
    let mut config = ProxyConfig::default();
    config.agent.agent_id = Some("agent-1".into());
    config.agent.kbn_url = Some(upstream.to_string());
    config.agent.api_key = Some(ApiKey::new("test-api-key"));
    config.public.base_url = "https://proxy.example.com".into();
    config.public.path = "/elastic/agent".into();
    config.timeouts.request_secs = 5.0;
    config
}

/// An address with nothing listening on it.
#[allow(dead_code)]
pub fn unused_addr() -> SocketAddr {
    let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);
    addr
}

/// `{"name":"agent","url":"https://kbn.internal/api/chat/a2a/agent-1"}`, gzip-compressed.
#[allow(dead_code)]
pub const GZIP_CARD: &[u8] = &[
    31, 139, 8, 0, 0, 0, 0, 0, 2, 3, 171, 86, 202, 75, 204, 77, 85, 178, 82, 74, 76, 79, 205, 43,
    81, 210, 81, 42, 45, 202, 1, 242, 50, 74, 74, 10, 138, 173, 244, 245, 179, 147, 242, 244, 50,
    243, 74, 82, 139, 242, 18, 115, 244, 19, 11, 50, 245, 147, 51, 18, 75, 244, 19, 141, 18, 245,
    193, 234, 117, 13, 149, 106, 1, 247, 197, 134, 178, 66, 0, 0, 0,
];
