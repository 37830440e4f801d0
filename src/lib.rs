//! A2A agent proxy library.
//!
//! Relays a single agent endpoint to an upstream Kibana A2A API, keeping the
//! upstream address and credential on the server side.

pub mod config;
pub mod health;
pub mod http;
pub mod lifecycle;
pub mod observability;
pub mod relay;
pub mod resilience;
pub mod security;

pub use config::schema::ProxyConfig;
pub use http::HttpServer;
pub use lifecycle::Shutdown;
pub use relay::{Relay, Route, Transport};
