//! Network and service helpers
//!
//! One-shot constructors with no step lifecycle: each call goes straight to
//! the container engine.

mod ids;
mod service;

use tracing::info;

use crate::config::IpamPool;
use crate::engine::{ContainerEngine, NetworkSpec, BRIDGE_DRIVER};
use crate::error::Result;

pub use ids::IdSource;
pub use service::Service;

/// A bridge network created on the engine
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Network {
    /// Engine ID
    pub id: String,
    pub name: String,
}

impl Network {
    /// Create a bridge network named `network-<id>`
    ///
    /// When an IPAM pool is given the network gets that subnet and gateway.
    pub async fn create(
        engine: &dyn ContainerEngine,
        ids: &IdSource,
        ipam: Option<&IpamPool>,
    ) -> Result<Self> {
        let name = ids
            .next_free_name("network", move |candidate| async move {
                engine.network_exists(&candidate).await
            })
            .await?;

        let spec = NetworkSpec {
            name: name.clone(),
            driver: BRIDGE_DRIVER.to_string(),
            ipam: ipam.cloned(),
        };
        let id = engine.create_network(&spec).await?;

        info!(
            network_id = %id,
            name = %name,
            subnet = ?ipam.and_then(|p| p.subnet.as_deref()),
            "Fixture network created"
        );

        Ok(Self { id, name })
    }

    /// Delete the network from the engine
    pub async fn remove(&self, engine: &dyn ContainerEngine) -> Result<()> {
        engine.remove_network(&self.id).await
    }
}
