//! Fabric Configuration Module
//!
//! Loads router, reactor and transport settings from TOML files with
//! environment variable overrides.

use crate::defaults;
use anyhow::{ensure, Context, Result};
use config_crate::{Config, Environment, File};
use network::{Endpoint, TransportOptions};
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;
use tracing::{debug, info};

/// Main configuration structure
#[derive(Debug, Default, Deserialize, Serialize, Clone, PartialEq)]
#[serde(default)]
pub struct FabricConfig {
    pub router: RouterConfig,
    pub reactor: ReactorConfig,
    pub transport: TransportSettings,
}

/// Router settings
#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
#[serde(default)]
pub struct RouterConfig {
    /// `tcp://host:port` or `ipc://path`
    pub address: String,
    pub idle_backoff_ms: u64,
    pub log_bind_failure: bool,
}

/// Reactor settings
#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
#[serde(default)]
pub struct ReactorConfig {
    /// Router address to connect to
    pub address: String,
    pub idle_backoff_ms: u64,
    pub stop_timeout_ms: u64,
    pub max_retries: u32,
}

/// Transport limits shared by both sides
#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
#[serde(default)]
pub struct TransportSettings {
    pub max_unit_size: usize,
    pub connect_timeout_ms: u64,
    /// Units buffered per connection before sends to it fail
    pub send_queue: usize,
}

impl Default for RouterConfig {
    fn default() -> Self {
        Self {
            address: network::DEFAULT_ADDRESS.to_string(),
            idle_backoff_ms: defaults::router::IDLE_BACKOFF_MS,
            log_bind_failure: defaults::router::LOG_BIND_FAILURE,
        }
    }
}

impl Default for ReactorConfig {
    fn default() -> Self {
        Self {
            address: network::DEFAULT_ADDRESS.to_string(),
            idle_backoff_ms: defaults::reactor::IDLE_BACKOFF_MS,
            stop_timeout_ms: defaults::reactor::STOP_TIMEOUT_MS,
            max_retries: defaults::reactor::MAX_RETRIES,
        }
    }
}

impl Default for TransportSettings {
    fn default() -> Self {
        Self {
            max_unit_size: network::DEFAULT_MAX_UNIT_SIZE,
            connect_timeout_ms: network::DEFAULT_CONNECT_TIMEOUT_MS,
            send_queue: network::DEFAULT_SEND_QUEUE,
        }
    }
}

impl RouterConfig {
    pub fn with_address(address: impl Into<String>) -> Self {
        Self {
            address: address.into(),
            ..Self::default()
        }
    }

    pub fn idle_backoff(&self) -> Duration {
        Duration::from_millis(self.idle_backoff_ms)
    }
}

impl ReactorConfig {
    pub fn with_address(address: impl Into<String>) -> Self {
        Self {
            address: address.into(),
            ..Self::default()
        }
    }

    pub fn idle_backoff(&self) -> Duration {
        Duration::from_millis(self.idle_backoff_ms)
    }

    pub fn stop_timeout(&self) -> Duration {
        Duration::from_millis(self.stop_timeout_ms)
    }
}

impl TransportSettings {
    pub fn connect_timeout(&self) -> Duration {
        Duration::from_millis(self.connect_timeout_ms)
    }

    pub fn options(&self) -> TransportOptions {
        TransportOptions::new(self.max_unit_size, self.connect_timeout())
            .with_send_queue(self.send_queue)
    }
}

impl FabricConfig {
    /// Parse a single TOML file; missing keys take their defaults
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file {}", path.display()))?;
        let config: Self = toml::from_str(&content)
            .with_context(|| format!("Failed to parse config file {}", path.display()))?;
        config.validate()?;
        Ok(config)
    }

    /// Load defaults, then `path` if given, then `{env_prefix}__SECTION__KEY` variables
    pub fn load(path: Option<&Path>, env_prefix: &str) -> Result<Self> {
        let mut builder = Config::builder();

        if let Some(path) = path {
            info!("Loading fabric config: {:?}", path);
            builder = builder.add_source(File::from(path).required(true));
        }

        builder = builder.add_source(
            Environment::with_prefix(env_prefix)
                .prefix_separator("__")
                .separator("__")
                .try_parsing(true),
        );

        let config: Self = builder
            .build()
            .context("Failed to build configuration")?
            .try_deserialize()
            .context("Failed to deserialize configuration")?;

        config.validate()?;
        debug!(?config, "Fabric configuration loaded");
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        Endpoint::parse(&self.router.address)
            .with_context(|| format!("Invalid router address {:?}", self.router.address))?;
        Endpoint::parse(&self.reactor.address)
            .with_context(|| format!("Invalid reactor address {:?}", self.reactor.address))?;

        ensure!(self.router.idle_backoff_ms > 0, "router.idle_backoff_ms must be positive");
        ensure!(self.reactor.idle_backoff_ms > 0, "reactor.idle_backoff_ms must be positive");
        ensure!(self.reactor.stop_timeout_ms > 0, "reactor.stop_timeout_ms must be positive");
        ensure!(self.transport.max_unit_size > 0, "transport.max_unit_size must be positive");
        ensure!(self.transport.send_queue > 0, "transport.send_queue must be positive");
        ensure!(
            self.transport.connect_timeout_ms > 0,
            "transport.connect_timeout_ms must be positive"
        );
        Ok(())
    }
}
