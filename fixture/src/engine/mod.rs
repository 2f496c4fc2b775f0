//! Container engine seam
//!
//! Steps and helpers talk to the engine only through [`ContainerEngine`], so
//! they can be driven against Docker/Podman through bollard or against a mock
//! in tests.

mod docker;
#[cfg(test)]
pub(crate) mod testing;

use async_trait::async_trait;

use crate::config::IpamPool;
use crate::error::Result;

pub use docker::DockerEngine;

/// Network driver used for fixture networks
pub const BRIDGE_DRIVER: &str = "bridge";

/// A container found by name
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContainerHandle {
    pub id: String,
    pub name: String,
}

/// Parameters for a network to create
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NetworkSpec {
    pub name: String,
    pub driver: String,
    pub ipam: Option<IpamPool>,
}

/// Parameters for a service to create
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServiceSpec {
    pub name: String,
    pub image: String,
    /// Engine IDs of the networks the service attaches to
    pub networks: Vec<String>,
}

/// Imperative calls into a container engine
///
/// Lookups (`find_container`, `remove_image`, ...) report a missing resource
/// as [`FixtureError::NotFound`](crate::error::FixtureError::NotFound).
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ContainerEngine: Send + Sync {
    /// Pull an image by full reference
    async fn pull_image(&self, image_ref: &str) -> Result<()>;

    /// Create and start a detached container, returning its ID
    async fn run_container(&self, image_ref: &str, name: &str) -> Result<String>;

    async fn find_container(&self, name: &str) -> Result<ContainerHandle>;

    async fn stop_container(&self, id: &str) -> Result<()>;

    async fn remove_container(&self, id: &str) -> Result<()>;

    async fn remove_image(&self, image_ref: &str) -> Result<()>;

    async fn network_exists(&self, name: &str) -> Result<bool>;

    /// Create a network, returning its engine ID
    async fn create_network(&self, spec: &NetworkSpec) -> Result<String>;

    async fn remove_network(&self, id: &str) -> Result<()>;

    async fn service_exists(&self, name: &str) -> Result<bool>;

    /// Create a service, returning its engine ID
    async fn create_service(&self, spec: &ServiceSpec) -> Result<String>;

    async fn remove_service(&self, id: &str) -> Result<()>;
}
