//! Step that pulls one image and runs one named container

use std::sync::Arc;

use async_trait::async_trait;
use tracing::{debug, info};

use crate::config::SimInstanceConfig;
use crate::engine::ContainerEngine;
use crate::error::Result;

use super::Step;

/// Manage a single simulator container and its image
pub struct ContainerInstanceStep {
    engine: Arc<dyn ContainerEngine>,
    config: SimInstanceConfig,
    executed: bool,
}

impl ContainerInstanceStep {
    pub fn new(engine: Arc<dyn ContainerEngine>, config: SimInstanceConfig) -> Self {
        Self {
            engine,
            config,
            executed: false,
        }
    }

    /// Full image reference, `registry/image_name:version`
    pub fn image_ref(&self) -> Result<String> {
        self.config.image_ref()
    }

    /// Container name
    pub fn name(&self) -> Result<&str> {
        self.config.container_name()
    }
}

#[async_trait]
impl Step for ContainerInstanceStep {
    fn description(&self) -> &str {
        "Run PNF simulator containers."
    }

    fn component(&self) -> &str {
        "Environment"
    }

    fn executed(&self) -> bool {
        self.executed
    }

    async fn execute(&mut self) -> Result<()> {
        let image_ref = self.image_ref()?;
        let name = self.name()?.to_string();

        self.engine.pull_image(&image_ref).await?;
        let container_id = self.engine.run_container(&image_ref, &name).await?;

        self.executed = true;
        info!(image = %image_ref, name = %name, container_id = %container_id, "Simulator container running");
        Ok(())
    }

    async fn cleanup(&mut self) -> Result<()> {
        if !self.executed {
            debug!(name = %self.config.name, "Container step never executed, nothing to clean up");
            return Ok(());
        }

        let image_ref = self.image_ref()?;
        let name = self.name()?.to_string();

        let container = self.engine.find_container(&name).await?;
        self.engine.stop_container(&container.id).await?;
        self.engine.remove_container(&container.id).await?;
        self.engine.remove_image(&image_ref).await?;

        self.executed = false;
        info!(image = %image_ref, name = %name, "Simulator container and image removed");
        Ok(())
    }
}
