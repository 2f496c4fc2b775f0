//! Simulator start request
//!
//! Posts a JSON payload to the simulator's local listener once its container
//! is up. Inactive unless `start.enabled` is set.

use std::path::Path;

use serde_json::Value;
use tracing::info;

use crate::config::StartConfig;
use crate::error::{FixtureError, Result};

/// Path of the simulator start endpoint
const SIMULATOR_PATH: &str = "simulator";

/// HTTP client for the simulator's REST listener
#[derive(Debug, Clone)]
pub struct SimulatorClient {
    http: reqwest::Client,
    config: StartConfig,
}

impl SimulatorClient {
    pub fn new(config: StartConfig) -> Self {
        Self {
            http: reqwest::Client::new(),
            config,
        }
    }

    /// `http://<sim_ip>:<sim_port>/simulator`
    pub fn endpoint(&self) -> String {
        format!(
            "http://{}:{}/{}",
            self.config.sim_ip, self.config.sim_port, SIMULATOR_PATH
        )
    }

    /// Read the configured payload file and post it
    pub async fn start(&self) -> Result<()> {
        let path = self
            .config
            .payload_location
            .as_deref()
            .ok_or_else(|| FixtureError::config("start.payload_location is not set"))?;

        let payload = read_payload(path).await?;
        self.post(&payload).await
    }

    /// Post a payload; non-2xx answers are errors
    pub async fn post(&self, payload: &Value) -> Result<()> {
        let endpoint = self.endpoint();

        let response = self
            .http
            .post(&endpoint)
            .header("X-ONAP-RequestID", self.config.request_id.as_str())
            .header("X-InvocationID", self.config.invocation_id.as_str())
            .json(payload)
            .send()
            .await?;

        let status = response.status();
        response.error_for_status()?;

        info!(endpoint = %endpoint, status = %status, "Simulator start request accepted");
        Ok(())
    }
}

async fn read_payload(path: &Path) -> Result<Value> {
    let raw = tokio::fs::read_to_string(path).await?;
    Ok(serde_json::from_str(&raw)?)
}
