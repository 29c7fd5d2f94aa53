//! # Reactor Fabric Codec
//!
//! ## Purpose
//!
//! The "rules" layer between the transport and the router/reactor engines:
//! - Identity encoding shared by transport addressing and destination frames
//! - Envelope encoding for `send`/`resend`
//! - Failure-notice encoding and inbound unit classification
//! - Raw (undecoded) splitting of units as the router sees them
//!
//! ## Architecture Role
//!
//! ```text
//! network → [codec] → router / reactor
//!    ↑         ↓            ↓
//! Multipart  Envelope    Forwarding
//! units      FailureNotice  Dispatch
//! ```
//!
//! ## Wire Format
//!
//! ```text
//! envelope:        [destination: u64 BE][attempts: u32 BE][payload]
//! failure notice:  ["FAIL_TO_DELIVER"][destination][attempts][payload]
//! delivered:       [payload]
//! ```
//!
//! ## What This Crate Does NOT Contain
//! - Socket management or connection handling (belongs in network/)
//! - Retry decisions (belong to reactor handlers)

pub mod constants;
pub mod envelope;
pub mod error;
pub mod identity;
pub mod notice;

pub use constants::*;
pub use envelope::{Envelope, RoutedUnit};
pub use error::{CodecError, Result};
pub use identity::{decode_attempts, encode_attempts, ReactorId};
pub use notice::{FailureNotice, Inbound};
