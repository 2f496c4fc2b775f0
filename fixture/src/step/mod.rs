//! Setup/cleanup steps
//!
//! A [`Step`] pairs a side-effecting `execute` with a reverse `cleanup` and
//! remembers whether `execute` succeeded. Cleanup of a step that never ran is
//! a no-op. Steps compose through [`StepList`], which runs children in order
//! and cleans them up in reverse.

mod container;
mod launch;

use async_trait::async_trait;
use tracing::{debug, info_span, warn, Instrument};

use crate::error::Result;

pub use container::ContainerInstanceStep;
pub use launch::LaunchSimulatorStep;

/// A setup/cleanup unit
#[async_trait]
pub trait Step: Send {
    /// Human-readable description for logs and reports
    fn description(&self) -> &str;

    /// Component the step belongs to
    fn component(&self) -> &str;

    /// Whether `execute` has run and succeeded since the last cleanup
    fn executed(&self) -> bool;

    /// Perform the step's action. On failure the step stays unexecuted.
    async fn execute(&mut self) -> Result<()>;

    /// Undo the step's action. Must return `Ok` without side effects when
    /// the step is not executed.
    async fn cleanup(&mut self) -> Result<()>;
}

/// Ordered child steps owned by a parent step
#[derive(Default)]
pub struct StepList {
    steps: Vec<Box<dyn Step>>,
}

impl StepList {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a child step
    pub fn add_step(&mut self, step: Box<dyn Step>) {
        self.steps.push(step);
    }

    pub fn len(&self) -> usize {
        self.steps.len()
    }

    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Box<dyn Step>> {
        self.steps.iter()
    }

    /// True when any child is executed
    pub fn executed(&self) -> bool {
        self.steps.iter().any(|step| step.executed())
    }

    /// Execute children in append order, stopping at the first failure
    pub async fn execute(&mut self) -> Result<()> {
        for step in self.steps.iter_mut() {
            let span = info_span!(
                "step_execute",
                description = step.description(),
                component = step.component()
            );
            step.execute().instrument(span).await?;
        }

        Ok(())
    }

    /// Clean up executed children in reverse order
    ///
    /// Every executed child gets its cleanup even if an earlier one failed;
    /// the first error is returned afterwards.
    pub async fn cleanup(&mut self) -> Result<()> {
        let mut first_error = None;

        for step in self.steps.iter_mut().rev() {
            if !step.executed() {
                debug!(description = step.description(), "Step not executed, skipping cleanup");
                continue;
            }

            let span = info_span!(
                "step_cleanup",
                description = step.description(),
                component = step.component()
            );
            if let Err(err) = step.cleanup().instrument(span).await {
                warn!(description = step.description(), error = %err, "Step cleanup failed");
                first_error.get_or_insert(err);
            }
        }

        match first_error {
            Some(err) => Err(err),
            None => Ok(()),
        }
    }
}
