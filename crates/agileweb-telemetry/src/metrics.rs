//! Decision metrics
//!
//! Thin helpers over the `metrics` facade; the binary installs the
//! Prometheus recorder.

use agileweb_core::AccessAction;
use std::time::Duration;

pub const DECISIONS_TOTAL: &str = "agileweb_decisions_total";
pub const REQUESTS_REJECTED_TOTAL: &str = "agileweb_requests_rejected_total";
pub const DECISION_LATENCY_US: &str = "agileweb_decision_latency_us";
pub const ATTEMPTS_RECORDED_TOTAL: &str = "agileweb_attempts_recorded_total";

/// Register descriptions for every metric
pub fn describe() {
    metrics::describe_counter!(DECISIONS_TOTAL, "Total number of access decisions by action");
    metrics::describe_counter!(
        REQUESTS_REJECTED_TOTAL,
        "Total number of evaluation requests rejected by validation"
    );
    metrics::describe_histogram!(
        DECISION_LATENCY_US,
        metrics::Unit::Microseconds,
        "Decision engine latency in microseconds"
    );
    metrics::describe_counter!(
        ATTEMPTS_RECORDED_TOTAL,
        "Total number of blocked or gated attempts written to the audit log"
    );
}

/// Count a decision and its latency
pub fn record_decision(action: AccessAction, latency: Duration) {
    metrics::counter!(DECISIONS_TOTAL, "action" => action.as_str()).increment(1);
    metrics::histogram!(DECISION_LATENCY_US).record(latency.as_micros() as f64);
}

/// Count a request rejected before reaching the engine
pub fn record_rejection(reason: &'static str) {
    metrics::counter!(REQUESTS_REJECTED_TOTAL, "reason" => reason).increment(1);
}

pub fn record_attempt() {
    metrics::counter!(ATTEMPTS_RECORDED_TOTAL).increment(1);
}
