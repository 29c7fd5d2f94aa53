//! # Reactor Fabric Configuration
//!
//! Configuration for routers, reactors and the transport beneath them.
//!
//! Values are layered: built-in defaults, then an optional TOML file, then
//! environment variables such as `FABRIC__ROUTER__ADDRESS`.
//!
//! ## Usage
//!
//! ```rust,no_run
//! use fabric_config::FabricConfig;
//!
//! let config = FabricConfig::load(None, fabric_config::ENV_PREFIX)?;
//! println!("router at {}", config.router.address);
//! # Ok::<(), anyhow::Error>(())
//! ```

pub mod defaults;
pub mod fabric_config;

// Re-export commonly used types
pub use defaults::ENV_PREFIX;
pub use fabric_config::{FabricConfig, ReactorConfig, RouterConfig, TransportSettings};
