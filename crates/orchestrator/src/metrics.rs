//! Prometheus metrics for the transaction pipeline.

use lazy_static::lazy_static;
use prometheus::{
    register_histogram, register_int_counter_vec, register_int_gauge, Encoder, Histogram,
    IntCounterVec, IntGauge, TextEncoder,
};

lazy_static! {
    /// Pipeline runs by final stage and outcome
    pub static ref PIPELINE_RESULT: IntCounterVec = register_int_counter_vec!(
        "ledger_pipeline_result_total",
        "Transaction pipeline results by stage and outcome",
        &["stage", "outcome"]
    )
    .expect("Failed to register ledger_pipeline_result_total metric");

    /// Pipeline duration histogram (seconds)
    pub static ref PIPELINE_DURATION: Histogram = register_histogram!(
        "ledger_pipeline_duration_seconds",
        "Transaction pipeline duration in seconds"
    )
    .expect("Failed to register ledger_pipeline_duration_seconds metric");

    /// Per-node confirmation outcomes
    pub static ref CONFIRMATION_RESULT: IntCounterVec = register_int_counter_vec!(
        "ledger_confirmation_result_total",
        "Commit confirmation outcomes per node",
        &["node", "outcome"]
    )
    .expect("Failed to register ledger_confirmation_result_total metric");

    /// Endorsement verdicts per node
    pub static ref ENDORSEMENT_RESULT: IntCounterVec = register_int_counter_vec!(
        "ledger_endorsement_result_total",
        "Endorsement responses per node",
        &["node", "result"]
    )
    .expect("Failed to register ledger_endorsement_result_total metric");

    /// Pipelines currently running
    pub static ref ACTIVE_PIPELINES: IntGauge = register_int_gauge!(
        "ledger_active_pipelines",
        "Number of transaction pipelines in flight"
    )
    .expect("Failed to register ledger_active_pipelines metric");
}

/// Record the end of a pipeline run. `stage` is "done" on success.
pub fn record_pipeline_result(stage: &str, success: bool, seconds: f64) {
    let outcome = if success { "success" } else { "failure" };
    PIPELINE_RESULT.with_label_values(&[stage, outcome]).inc();
    PIPELINE_DURATION.observe(seconds);
}

pub fn record_confirmation(node: &str, outcome: &str) {
    CONFIRMATION_RESULT.with_label_values(&[node, outcome]).inc();
}

pub fn record_endorsement(node: &str, success: bool) {
    let result = if success { "good" } else { "bad" };
    ENDORSEMENT_RESULT.with_label_values(&[node, result]).inc();
}

/// Keeps [`ACTIVE_PIPELINES`] accurate on every return path.
pub struct ActivePipelineGuard;

impl ActivePipelineGuard {
    pub fn enter() -> Self {
        ACTIVE_PIPELINES.inc();
        Self
    }
}

impl Drop for ActivePipelineGuard {
    fn drop(&mut self) {
        ACTIVE_PIPELINES.dec();
    }
}

/// Render the default registry in the Prometheus text format.
pub fn gather_text() -> Result<String, prometheus::Error> {
    let encoder = TextEncoder::new();
    let mut buffer = Vec::new();
    encoder.encode(&prometheus::gather(), &mut buffer)?;
    String::from_utf8(buffer).map_err(|e| prometheus::Error::Msg(e.to_string()))
}
