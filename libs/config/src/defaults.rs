//! Default configuration values
//!
//! Shared by the serde defaults and by callers that build configs in code.

/// Router defaults
pub mod router {
    /// Sleep between empty polls (milliseconds)
    pub const IDLE_BACKOFF_MS: u64 = 1;

    /// Log at warn level when the router cannot bind
    pub const LOG_BIND_FAILURE: bool = true;
}

/// Reactor defaults
pub mod reactor {
    /// Sleep between empty polls (milliseconds)
    pub const IDLE_BACKOFF_MS: u64 = 1;

    /// Upper bound on waiting for the receive loop during stop (milliseconds)
    pub const STOP_TIMEOUT_MS: u64 = 1_000;

    /// Resends after the first failed attempt
    pub const MAX_RETRIES: u32 = 3;
}

/// Environment variable prefix, e.g. `FABRIC__ROUTER__ADDRESS`
pub const ENV_PREFIX: &str = "FABRIC";
