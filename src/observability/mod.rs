//! Observability subsystem.
//!
//! # Data Flow
//! ```text
//! Server and relay produce:
//!     → logging.rs (structured log events, request spans)
//!     → metrics.rs (counters, histograms)
//!
//! Consumers:
//!     → stdout (fmt layer)
//!     → Metrics endpoint (Prometheus scrape)
//! ```
//!
//! # Design Decisions
//! - Request ID flows through every request span
//! - The upstream credential is never a log field

pub mod logging;
pub mod metrics;
