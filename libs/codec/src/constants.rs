//! # Protocol Constants
//!
//! Values that define the wire protocol. They must stay stable across every
//! router and reactor talking to each other.

/// Reserved first frame of a failure notice
pub const FAIL_TO_DELIVER: &str = "FAIL_TO_DELIVER";

/// Width of an encoded identity frame
pub const IDENTITY_WIDTH: usize = 8;

/// Width of an encoded attempt-count frame
pub const ATTEMPTS_WIDTH: usize = 4;

/// Frames in an envelope sent by a reactor
pub const ENVELOPE_FRAMES: usize = 3;

/// Frames in a failure notice sent by the router
pub const NOTICE_FRAMES: usize = 4;

/// Bytes a failure notice adds to the envelope it echoes: the marker frame and its length prefix
pub const NOTICE_OVERHEAD: usize = 4 + FAIL_TO_DELIVER.len();
