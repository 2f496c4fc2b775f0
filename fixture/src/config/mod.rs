//! Configuration module for simulator fixtures
//!
//! Supports configuration via:
//! - YAML/TOML config files
//! - Environment variables (with SIMFIX__ prefix)
//! - `.env` files

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::error::FixtureError;

/// Main fixture configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FixtureConfig {
    /// Log level (trace, debug, info, warn, error)
    #[serde(default = "default_log_level")]
    pub log_level: String,

    /// Docker/Podman socket path (local defaults when unset)
    #[serde(default)]
    pub docker_socket: Option<String>,

    /// Run cleanup during teardown
    #[serde(default = "default_true")]
    pub cleanup: bool,

    /// Simulator container settings
    #[serde(default)]
    pub simulator: SimInstanceConfig,

    /// Network settings
    #[serde(default)]
    pub network: NetworkConfig,

    /// Simulator start request settings
    #[serde(default)]
    pub start: StartConfig,
}

/// Image and container name of one simulator instance
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SimInstanceConfig {
    #[serde(default = "default_version")]
    pub version: String,

    #[serde(default)]
    pub registry: String,

    #[serde(default)]
    pub image_name: String,

    /// Container name
    #[serde(default)]
    pub name: String,
}

/// Network creation settings
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct NetworkConfig {
    /// IP address management pool; engine defaults when unset
    #[serde(default)]
    pub ipam_pool: Option<IpamPool>,
}

/// IPAM pool for a created network
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct IpamPool {
    #[serde(default)]
    pub subnet: Option<String>,

    #[serde(default)]
    pub gateway: Option<String>,
}

/// Simulator start request settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StartConfig {
    /// Send the start request after the container is up
    #[serde(default)]
    pub enabled: bool,

    /// Path to the JSON payload posted to the simulator
    #[serde(default)]
    pub payload_location: Option<PathBuf>,

    #[serde(default = "default_sim_ip")]
    pub sim_ip: String,

    #[serde(default = "default_sim_port")]
    pub sim_port: u16,

    #[serde(default = "default_request_id")]
    pub request_id: String,

    #[serde(default = "default_invocation_id")]
    pub invocation_id: String,
}

// Default value functions
fn default_log_level() -> String {
    "info".to_string()
}

fn default_true() -> bool {
    true
}

fn default_version() -> String {
    "latest".to_string()
}

fn default_sim_ip() -> String {
    "localhost".to_string()
}

fn default_sim_port() -> u16 {
    8087
}

fn default_request_id() -> String {
    "123".to_string()
}

fn default_invocation_id() -> String {
    "456".to_string()
}

impl Default for SimInstanceConfig {
    fn default() -> Self {
        Self {
            version: default_version(),
            registry: String::new(),
            image_name: String::new(),
            name: String::new(),
        }
    }
}

impl Default for StartConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            payload_location: None,
            sim_ip: default_sim_ip(),
            sim_port: default_sim_port(),
            request_id: default_request_id(),
            invocation_id: default_invocation_id(),
        }
    }
}

impl Default for FixtureConfig {
    fn default() -> Self {
        Self {
            log_level: default_log_level(),
            docker_socket: None,
            cleanup: true,
            simulator: SimInstanceConfig::default(),
            network: NetworkConfig::default(),
            start: StartConfig::default(),
        }
    }
}

impl SimInstanceConfig {
    /// Full image reference, `registry/image_name:version`
    pub fn image_ref(&self) -> crate::error::Result<String> {
        let reference = format!("{}/{}:{}", self.registry, self.image_name, self.version);

        if self.registry.is_empty() || self.image_name.is_empty() {
            return Err(FixtureError::config(format!(
                "registry and image_name are required, got image reference '{}'",
                reference
            )));
        }

        Ok(reference)
    }

    /// Container name; an error when none is configured
    pub fn container_name(&self) -> crate::error::Result<&str> {
        if self.name.is_empty() {
            return Err(FixtureError::config("Container name has to be provided"));
        }
        Ok(&self.name)
    }
}

impl FixtureConfig {
    /// Load configuration from a file and environment variables
    pub fn load(path: &Path) -> Result<Self> {
        Self::build(Some(path))
            .with_context(|| format!("Failed to load configuration from {}", path.display()))
    }

    /// Load configuration from defaults and environment variables only
    pub fn from_env() -> Result<Self> {
        Self::build(None)
    }

    fn build(path: Option<&Path>) -> Result<Self> {
        // Try to load .env file if present
        let _ = dotenvy::dotenv();

        let mut builder = config::Config::builder()
            .add_source(config::Config::try_from(&FixtureConfig::default())?);
        if let Some(path) = path {
            builder = builder.add_source(config::File::from(path).required(true));
        }

        // Override with environment variables (SIMFIX__ prefix). Values stay
        // strings until deserialized so image tags like "1.10" survive.
        let config = builder
            .add_source(
                config::Environment::with_prefix("SIMFIX")
                    .prefix_separator("__")
                    .separator("__"),
            )
            .build()
            .context("Failed to build configuration")?;

        let fixture_config: FixtureConfig = config
            .try_deserialize()
            .context("Failed to deserialize configuration")?;

        fixture_config.validate()?;

        Ok(fixture_config)
    }

    /// Validate configuration values
    fn validate(&self) -> Result<()> {
        if self.start.enabled {
            if self.start.sim_port == 0 {
                anyhow::bail!("Simulator port cannot be 0");
            }
            if self.start.payload_location.is_none() {
                anyhow::bail!("start.payload_location is required when start is enabled");
            }
        }

        Ok(())
    }
}
