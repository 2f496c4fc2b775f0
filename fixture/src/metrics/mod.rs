//! Fixture metrics
//!
//! Emits through the `metrics` facade. Nothing is exported unless the
//! embedding test binary installs a recorder.

use metrics::{counter, histogram};

/// Record a finished setup or teardown run
pub fn record_step_run(phase: &str, success: bool, duration_secs: f64) {
    let status = if success { "passed" } else { "failed" };
    counter!("simfix_step_runs_total", "phase" => phase.to_string(), "status" => status).increment(1);
    histogram!("simfix_step_duration_seconds", "phase" => phase.to_string()).record(duration_secs);
}

/// Record a call into the container engine
pub fn record_engine_call(op: &'static str) {
    counter!("simfix_engine_calls_total", "op" => op).increment(1);
}

/// Record an engine call that failed
pub fn record_engine_error(op: &'static str, kind: &'static str) {
    counter!("simfix_engine_errors_total", "op" => op, "kind" => kind).increment(1);
}
