//! Security subsystem.
//!
//! # Data Flow
//! ```text
//! Before forwarding:
//!     → allowlist.rs (upstream scheme, host, allowlist)
//!     → headers.rs (drop hop-by-hop, Host, Authorization)
//! After the upstream answers:
//!     → headers.rs (expose content-type, cache-control, etag only)
//! ```
//!
//! # Design Decisions
//! - Fail closed: reject on any upstream validation failure
//! - No trust in client-supplied credentials

pub mod allowlist;
pub mod headers;
