//! Configuration management subsystem.
//!
//! # Data Flow
//! ```text
//! config file (TOML, optional) + environment (.env, process env)
//!     → loader.rs (parse, overlay, normalize)
//!     → validation.rs (semantic checks)
//!     → ProxyConfig (immutable)
//!     → shared via Arc with the relay
//! ```
//!
//! # Design Decisions
//! - Config is immutable once loaded; changes require a restart
//! - All fields have defaults to allow minimal configs
//! - Validation separates syntactic (serde) from semantic checks

pub mod loader;
pub mod schema;
pub mod validation;

pub use schema::AgentConfig;
pub use schema::ApiKey;
pub use schema::ProxyConfig;
pub use schema::PublicConfig;
