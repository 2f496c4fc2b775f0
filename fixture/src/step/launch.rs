//! Parent step that launches the simulator

use std::sync::Arc;

use async_trait::async_trait;

use crate::config::FixtureConfig;
use crate::engine::ContainerEngine;
use crate::error::Result;
use crate::simulator::SimulatorClient;

use super::{ContainerInstanceStep, Step, StepList};

/// Run PNF simulator containers, optionally sending the start request
pub struct LaunchSimulatorStep {
    steps: StepList,
    start: Option<SimulatorClient>,
}

impl LaunchSimulatorStep {
    pub fn new(engine: Arc<dyn ContainerEngine>, config: &FixtureConfig) -> Self {
        let mut steps = StepList::new();
        steps.add_step(Box::new(ContainerInstanceStep::new(
            engine,
            config.simulator.clone(),
        )));

        let start = config
            .start
            .enabled
            .then(|| SimulatorClient::new(config.start.clone()));

        Self { steps, start }
    }

    pub fn steps(&self) -> &StepList {
        &self.steps
    }
}

#[async_trait]
impl Step for LaunchSimulatorStep {
    fn description(&self) -> &str {
        "Run PNF simulator containers."
    }

    fn component(&self) -> &str {
        "Environment"
    }

    fn executed(&self) -> bool {
        self.steps.executed()
    }

    async fn execute(&mut self) -> Result<()> {
        self.steps.execute().await?;

        if let Some(client) = &self.start {
            client.start().await?;
        }

        Ok(())
    }

    async fn cleanup(&mut self) -> Result<()> {
        self.steps.cleanup().await
    }
}
