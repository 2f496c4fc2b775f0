//! Fixture runner
//!
//! Drives a root step through setup and teardown and records one report per
//! phase, for test result summaries.

use std::sync::Arc;
use std::time::Instant;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::{error, info};

use crate::config::FixtureConfig;
use crate::engine::ContainerEngine;
use crate::error::Result;
use crate::metrics;
use crate::step::{LaunchSimulatorStep, Step};

/// Fixture phase
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Phase {
    Setup,
    Teardown,
}

impl Phase {
    pub fn as_str(&self) -> &'static str {
        match self {
            Phase::Setup => "setup",
            Phase::Teardown => "teardown",
        }
    }
}

/// Outcome of a phase
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StepStatus {
    Passed,
    Failed,
    Skipped,
}

/// Result of running one phase of the root step
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StepReport {
    pub description: String,
    pub component: String,
    pub phase: Phase,
    pub status: StepStatus,
    pub started_at: DateTime<Utc>,
    pub duration_ms: u64,
    pub error: Option<String>,
}

/// A root step plus its setup/teardown bookkeeping
pub struct Fixture {
    root: Box<dyn Step>,
    cleanup_enabled: bool,
    reports: Vec<StepReport>,
}

impl Fixture {
    pub fn new(root: Box<dyn Step>) -> Self {
        Self {
            root,
            cleanup_enabled: true,
            reports: Vec::new(),
        }
    }

    /// Fixture launching the configured simulator
    pub fn simulator(engine: Arc<dyn ContainerEngine>, config: &FixtureConfig) -> Self {
        Self::new(Box::new(LaunchSimulatorStep::new(engine, config))).with_cleanup(config.cleanup)
    }

    /// Skip teardown entirely when disabled
    pub fn with_cleanup(mut self, enabled: bool) -> Self {
        self.cleanup_enabled = enabled;
        self
    }

    pub fn executed(&self) -> bool {
        self.root.executed()
    }

    pub fn reports(&self) -> &[StepReport] {
        &self.reports
    }

    /// Execute the root step
    pub async fn setup(&mut self) -> Result<()> {
        let started_at = Utc::now();
        let timer = Instant::now();

        let result = self.root.execute().await;
        self.record(Phase::Setup, started_at, timer, &result);
        result
    }

    /// Clean up the root step, unless cleanup is disabled
    pub async fn teardown(&mut self) -> Result<()> {
        let started_at = Utc::now();

        if !self.cleanup_enabled {
            info!(
                description = self.root.description(),
                "Cleanup disabled, leaving resources in place"
            );
            let report = self.report(Phase::Teardown, StepStatus::Skipped, started_at, 0, None);
            self.reports.push(report);
            return Ok(());
        }

        let timer = Instant::now();
        let result = self.root.cleanup().await;
        self.record(Phase::Teardown, started_at, timer, &result);
        result
    }

    fn record(
        &mut self,
        phase: Phase,
        started_at: DateTime<Utc>,
        timer: Instant,
        result: &Result<()>,
    ) {
        let elapsed = timer.elapsed();
        metrics::record_step_run(phase.as_str(), result.is_ok(), elapsed.as_secs_f64());

        let (status, error) = match result {
            Ok(()) => {
                info!(
                    phase = phase.as_str(),
                    description = self.root.description(),
                    duration_ms = elapsed.as_millis() as u64,
                    "Fixture phase passed"
                );
                (StepStatus::Passed, None)
            }
            Err(err) => {
                error!(
                    phase = phase.as_str(),
                    description = self.root.description(),
                    error = %err,
                    "Fixture phase failed"
                );
                (StepStatus::Failed, Some(err.to_string()))
            }
        };

        let report = self.report(phase, status, started_at, elapsed.as_millis() as u64, error);
        self.reports.push(report);
    }

    fn report(
        &self,
        phase: Phase,
        status: StepStatus,
        started_at: DateTime<Utc>,
        duration_ms: u64,
        error: Option<String>,
    ) -> StepReport {
        StepReport {
            description: self.root.description().to_string(),
            component: self.root.component().to_string(),
            phase,
            status,
            started_at,
            duration_ms,
            error,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::SimInstanceConfig;
    use crate::engine::testing::RecordingEngine;
    use crate::step::tests::JournalStep;
    use std::sync::Mutex;

    fn sample_config() -> FixtureConfig {
        FixtureConfig {
            simulator: SimInstanceConfig {
                registry: "docker.io/lib".to_string(),
                image_name: "sim".to_string(),
                version: "1.2".to_string(),
                name: "pnf-sim-1".to_string(),
            },
            ..FixtureConfig::default()
        }
    }

    #[tokio::test]
    async fn test_setup_and_teardown_reports() {
        let engine = RecordingEngine::new();
        let mut fixture = Fixture::simulator(Arc::new(engine.clone()), &sample_config());

        fixture.setup().await.unwrap();
        assert!(fixture.executed());
        fixture.teardown().await.unwrap();
        assert!(!fixture.executed());

        let reports = fixture.reports();
        assert_eq!(reports.len(), 2);
        assert_eq!(reports[0].phase, Phase::Setup);
        assert_eq!(reports[0].status, StepStatus::Passed);
        assert_eq!(reports[0].description, "Run PNF simulator containers.");
        assert_eq!(reports[0].component, "Environment");
        assert_eq!(reports[1].phase, Phase::Teardown);
        assert_eq!(reports[1].status, StepStatus::Passed);
        assert!(!engine.has_image("docker.io/lib/sim:1.2"));
    }

    #[tokio::test]
    async fn test_failed_setup_is_reported_and_propagated() {
        let engine = RecordingEngine::new();
        engine.fail_on("run");
        let mut fixture = Fixture::simulator(Arc::new(engine.clone()), &sample_config());

        let err = fixture.setup().await.unwrap_err();
        assert_eq!(err.kind_label(), "engine");
        assert!(!fixture.executed());

        let report = &fixture.reports()[0];
        assert_eq!(report.status, StepStatus::Failed);
        assert!(report.error.as_deref().unwrap().contains("run failed"));

        // Nothing ran, so teardown touches nothing
        let before = engine.operations().len();
        fixture.teardown().await.unwrap();
        assert_eq!(engine.operations().len(), before);
    }

    #[tokio::test]
    async fn test_cleanup_disabled_skips_teardown() {
        let journal = Arc::new(Mutex::new(Vec::new()));
        let mut fixture =
            Fixture::new(Box::new(JournalStep::new("root", &journal))).with_cleanup(false);

        fixture.setup().await.unwrap();
        fixture.teardown().await.unwrap();

        assert_eq!(journal.lock().unwrap().clone(), vec!["execute:root"]);
        assert_eq!(fixture.reports()[1].status, StepStatus::Skipped);
        assert!(fixture.executed());
    }

    #[test]
    fn test_report_serialization() {
        let report = StepReport {
            description: "Run PNF simulator containers.".to_string(),
            component: "Environment".to_string(),
            phase: Phase::Teardown,
            status: StepStatus::Skipped,
            started_at: Utc::now(),
            duration_ms: 0,
            error: None,
        };

        let value = serde_json::to_value(&report).unwrap();
        assert_eq!(value["phase"], "teardown");
        assert_eq!(value["status"], "skipped");
    }
}
