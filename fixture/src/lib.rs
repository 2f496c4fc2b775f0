//! Simulator test fixtures
//!
//! This library launches and tears down simulator containers for integration
//! tests. Work is split into steps with paired setup/cleanup actions that call
//! a container engine to pull images, run containers, and create networks and
//! services.

pub mod config;
pub mod engine;
pub mod error;
pub mod logging;
pub mod metrics;
pub mod network;
pub mod runner;
pub mod simulator;
pub mod step;

pub use error::{FixtureError, ResourceKind, Result};
