//! # Reactor Fabric Router
//!
//! Central forwarding process of the fabric. Reactors connect under their
//! numeric identity and send envelopes; the router hands each payload to the
//! reactor whose identity equals the destination frame.
//!
//! ```text
//!   reactor 10 ──[dest=7, attempts, payload]──► Router ──[payload]──► reactor 7
//!       ▲                                         │
//!       └──["FAIL_TO_DELIVER", dest, attempts, payload]── (destination unreachable)
//! ```
//!
//! The router never retries and never inspects payloads. Destination and
//! attempt frames are echoed back verbatim on failure.

pub mod engine;
pub mod error;
pub mod metrics;

pub use engine::Router;
pub use error::{Result, RouterError};
pub use metrics::{RouterMetrics, RouterMetricsSnapshot};
